//! Segment aggregation and report assembly.
//!
//! Rolls per-customer profiles up into segment-level statistics, attaches
//! the static recommended-action playbook, and assembles the `AnalysisRun`
//! — the single atomic output of a run and the unit that gets cached.
//!
//! Precision is fixed for display stability and test reproducibility:
//! monetary fields and averages round to 2 decimals, percentages to 1.

use crate::config::{AnalysisParams, ScoreWeights};
use crate::metrics::CustomerMetrics;
use crate::scoring::{round2, RfmcProfile};
use crate::segments::Segment;
use crate::types::BrandId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ── Public types ─────────────────────────────────────────────────────────────

/// Segment-level rollup. Only segments with at least one member appear
/// in a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentSummary {
    pub segment: Segment,
    pub customer_count: u64,
    pub total_revenue: f64,
    pub avg_revenue_per_customer: f64,
    pub percentage_of_total: f64,
    pub recommended_actions: Vec<String>,
}

/// One entry of the summary's per-segment distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentShare {
    pub segment: Segment,
    pub customer_count: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub total_customers: u64,
    pub total_transactions: u64,
    pub total_revenue: f64,
    pub distribution: Vec<SegmentShare>,
}

/// The full, immutable result of one analysis run. Keyed by
/// (brand_id, analysis_date, period_days); replaced wholesale on
/// recomputation, never partially mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRun {
    pub brand_id: BrandId,
    pub analysis_date: NaiveDate,
    pub period_days: u32,
    pub weights: ScoreWeights,
    pub summary: AnalysisSummary,
    pub segments: Vec<SegmentSummary>,
    pub top_customers: Vec<RfmcProfile>,
    /// Data-sparsity conditions recorded on the run instead of aborting it
    /// (e.g. degenerate quantile populations).
    pub warnings: Vec<String>,
}

// ── Report builder ───────────────────────────────────────────────────────────

/// Assemble the full analysis object from classified profiles.
///
/// `profiles` and `metrics` are index-aligned, the order the pipeline
/// produced them in. An empty population yields a valid empty run.
pub fn build_report(
    brand_id: &str,
    params: &AnalysisParams,
    total_transactions: u64,
    profiles: &[RfmcProfile],
    metrics: &[CustomerMetrics],
    warnings: Vec<String>,
) -> AnalysisRun {
    let total_customers = profiles.len() as u64;

    // Group by segment. BTreeMap over the Ord enum keeps the reporting
    // order equal to the taxonomy order.
    let mut by_segment: BTreeMap<Segment, (u64, f64)> = BTreeMap::new();
    for (profile, m) in profiles.iter().zip(metrics) {
        let entry = by_segment.entry(profile.segment).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += m.monetary_value;
    }

    let total_revenue: f64 = metrics.iter().map(|m| m.monetary_value).sum();

    let segments: Vec<SegmentSummary> = by_segment
        .iter()
        .map(|(&segment, &(count, revenue))| SegmentSummary {
            segment,
            customer_count: count,
            total_revenue: round2(revenue),
            avg_revenue_per_customer: round2(revenue / count as f64),
            percentage_of_total: percentage(count, total_customers),
            recommended_actions: segment
                .recommended_actions()
                .iter()
                .map(|a| a.to_string())
                .collect(),
        })
        .collect();

    let distribution = by_segment
        .iter()
        .map(|(&segment, &(count, _))| SegmentShare {
            segment,
            customer_count: count,
            percentage: percentage(count, total_customers),
        })
        .collect();

    AnalysisRun {
        brand_id: brand_id.to_string(),
        analysis_date: params.analysis_date,
        period_days: params.period_days,
        weights: params.weights,
        summary: AnalysisSummary {
            total_customers,
            total_transactions,
            total_revenue: round2(total_revenue),
            distribution,
        },
        segments,
        top_customers: top_customers(profiles, params.top_customer_limit),
        warnings,
    }
}

/// Profiles sorted by combined score descending, customer id as the
/// deterministic tie-break, cut to the caller's limit.
fn top_customers(profiles: &[RfmcProfile], limit: Option<usize>) -> Vec<RfmcProfile> {
    let mut ranked: Vec<RfmcProfile> = profiles.to_vec();
    ranked.sort_by(|a, b| {
        b.rfmc_score
            .partial_cmp(&a.rfmc_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.customer_id.cmp(&b.customer_id))
    });
    if let Some(limit) = limit {
        ranked.truncate(limit);
    }
    ranked
}

/// Share of the analyzed population, rounded to 1 decimal.
fn percentage(count: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let pct = count as f64 / total as f64 * 100.0;
    (pct * 10.0).round() / 10.0
}
