//! The segmentation engine — wires the pipeline stages together and owns
//! the run lifecycle.
//!
//! PIPELINE ORDER (fixed, never reordered):
//!   1. Metric aggregation   (window transactions → CustomerMetrics)
//!   2. Quantile scoring     (population quintiles → RFMC scores)
//!   3. Classification       (ordered rule table → segment)
//!   4. Aggregation + report (segment rollups → AnalysisRun)
//!
//! RULES:
//!   - Parameters are validated before any store read.
//!   - At most one computation in flight per (brand, date, period) key;
//!     triggers for different keys proceed independently.
//!   - A run is published atomically. A failed computation leaves the
//!     previously cached run intact — nothing is retried or zeroed.

use crate::{
    config::AnalysisParams,
    error::{EngineError, EngineResult},
    metrics::{aggregate_metrics, CustomerMetrics},
    report::{build_report, AnalysisRun},
    scoring::{score_population, RfmcProfile},
    segments::{classify, Segment},
    store::SegmentStore,
    types::BrandId,
};
use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

// ── Public types ─────────────────────────────────────────────────────────────

/// The logical key of a run: one cached result, and at most one
/// computation in flight, per key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AnalysisKey {
    pub brand_id: BrandId,
    pub analysis_date: NaiveDate,
    pub period_days: u32,
}

/// Drill-down record: a customer's profile plus the base metrics behind it.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentMember {
    pub profile: RfmcProfile,
    pub metrics: CustomerMetrics,
}

// ── Engine ───────────────────────────────────────────────────────────────────

pub struct SegmentationEngine {
    store: SegmentStore,
    run_locks: Mutex<HashMap<AnalysisKey, Arc<Mutex<()>>>>,
}

impl SegmentationEngine {
    pub fn new(store: SegmentStore) -> Self {
        Self {
            store,
            run_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Compute (or recompute) the analysis run for this brand and key.
    ///
    /// Deterministic and idempotent: identical input transactions produce
    /// an identical run on every invocation.
    pub fn calculate(
        &self,
        brand_id: &str,
        params: &AnalysisParams,
    ) -> EngineResult<AnalysisRun> {
        params.validate()?;

        let key = AnalysisKey {
            brand_id: brand_id.to_string(),
            analysis_date: params.analysis_date,
            period_days: params.period_days,
        };
        let lock = self.run_lock(&key);
        let _in_flight = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let (from, to) = window_bounds(params.analysis_date, params.period_days);
        let transactions = self.store.transactions_for_window(brand_id, from, to)?;
        let total_transactions = transactions.len() as u64;
        log::debug!(
            "brand '{brand_id}': {total_transactions} transactions in window {from}..{to}"
        );

        let metrics = aggregate_metrics(&transactions, params.analysis_date);
        let scored = score_population(&metrics);

        let warnings: Vec<String> = scored
            .degenerate_metrics
            .iter()
            .map(|m| format!("degenerate population for {m}"))
            .collect();
        for warning in &warnings {
            log::warn!("brand '{brand_id}': {warning}");
        }

        let profiles: Vec<RfmcProfile> = metrics
            .iter()
            .zip(&scored.scores)
            .map(|(m, s)| RfmcProfile {
                customer_id: m.customer_id.clone(),
                recency_score:   s.recency,
                frequency_score: s.frequency,
                monetary_score:  s.monetary,
                category_score:  s.category,
                rfmc_code:  s.code(),
                rfmc_score: s.weighted(&params.weights),
                segment:    classify(s),
            })
            .collect();

        let run = build_report(
            brand_id,
            params,
            total_transactions,
            &profiles,
            &metrics,
            warnings,
        );

        self.store.replace_analysis_run(&run, &profiles, &metrics)?;
        log::info!(
            "published analysis run for brand '{brand_id}' date {} ({} customers, {} segments)",
            params.analysis_date,
            run.summary.total_customers,
            run.segments.len(),
        );
        Ok(run)
    }

    /// The most recently computed run for this brand — for the given date,
    /// or the latest run overall when the date is omitted.
    pub fn fetch_analysis(
        &self,
        brand_id: &str,
        analysis_date: Option<NaiveDate>,
    ) -> EngineResult<AnalysisRun> {
        let run = match analysis_date {
            Some(date) => self.store.analysis_run_for_date(brand_id, date)?,
            None => self.store.latest_analysis_run(brand_id)?,
        };
        run.ok_or_else(|| EngineError::RunNotFound {
            brand_id: brand_id.to_string(),
        })
    }

    /// Segment members from the brand's most recent run, ordered by
    /// combined score descending then customer id, paginated. `segment`
    /// omitted means all segments.
    pub fn segment_members(
        &self,
        brand_id: &str,
        segment: Option<Segment>,
        limit: Option<u64>,
        offset: u64,
    ) -> EngineResult<Vec<SegmentMember>> {
        let run_id = self
            .store
            .latest_run_id(brand_id)?
            .ok_or_else(|| EngineError::RunNotFound {
                brand_id: brand_id.to_string(),
            })?;
        self.store.segment_members(&run_id, segment, limit, offset)
    }

    fn run_lock(&self, key: &AnalysisKey) -> Arc<Mutex<()>> {
        let mut locks = self
            .run_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        locks.entry(key.clone()).or_default().clone()
    }
}

// ── Window ───────────────────────────────────────────────────────────────────

/// UTC instants bounding the analysis window as `[from, to)`: calendar
/// days in `(analysis_date - period_days, analysis_date]`.
pub fn window_bounds(
    analysis_date: NaiveDate,
    period_days: u32,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let to = analysis_date + Days::new(1);
    let from = to - Days::new(period_days as u64);
    (midnight_utc(from), midnight_utc(to))
}

fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}
