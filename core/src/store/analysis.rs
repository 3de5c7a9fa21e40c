use super::SegmentStore;
use crate::engine::SegmentMember;
use crate::error::EngineResult;
use crate::metrics::CustomerMetrics;
use crate::report::AnalysisRun;
use crate::scoring::RfmcProfile;
use crate::segments::Segment;
use chrono::{NaiveDate, Utc};
use rusqlite::{params, OptionalExtension};

impl SegmentStore {
    // ── Analysis runs ─────────────────────────────────────────────

    /// Publish a run: delete any prior run for the same
    /// (brand, date, period) key and insert the new run row plus its
    /// per-customer profile rows, all in one transaction. Readers see
    /// the old run until the commit.
    pub fn replace_analysis_run(
        &self,
        run: &AnalysisRun,
        profiles: &[RfmcProfile],
        metrics: &[CustomerMetrics],
    ) -> EngineResult<()> {
        let report = serde_json::to_string(run)?;
        let run_id = uuid::Uuid::new_v4().to_string();
        let date = run.analysis_date.to_string();

        let tx = self.conn.unchecked_transaction()?;
        // Profile rows cascade via the run_id foreign key.
        tx.execute(
            "DELETE FROM analysis_run
             WHERE brand_id = ?1 AND analysis_date = ?2 AND period_days = ?3",
            params![&run.brand_id, &date, run.period_days],
        )?;
        tx.execute(
            "INSERT INTO analysis_run
                 (run_id, brand_id, analysis_date, period_days, created_at, report)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                &run_id,
                &run.brand_id,
                &date,
                run.period_days,
                Utc::now().timestamp(),
                &report,
            ],
        )?;
        for (p, m) in profiles.iter().zip(metrics) {
            tx.execute(
                "INSERT INTO customer_profile (
                     run_id, customer_id, recency_days, frequency_count,
                     monetary_value, category_engagement, recency_score,
                     frequency_score, monetary_score, category_score,
                     rfmc_code, rfmc_score, segment
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                params![
                    &run_id,
                    &p.customer_id,
                    m.recency_days,
                    m.frequency_count,
                    m.monetary_value,
                    m.category_engagement,
                    p.recency_score,
                    p.frequency_score,
                    p.monetary_score,
                    p.category_score,
                    &p.rfmc_code,
                    p.rfmc_score,
                    p.segment.name(),
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// The most recently computed run for this brand and date, across any
    /// period length.
    pub fn analysis_run_for_date(
        &self,
        brand_id: &str,
        date: NaiveDate,
    ) -> EngineResult<Option<AnalysisRun>> {
        let report: Option<String> = self
            .conn
            .query_row(
                "SELECT report FROM analysis_run
                 WHERE brand_id = ?1 AND analysis_date = ?2
                 ORDER BY created_at DESC LIMIT 1",
                params![brand_id, date.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        report
            .map(|json| serde_json::from_str(&json).map_err(Into::into))
            .transpose()
    }

    /// The brand's most recent run overall.
    pub fn latest_analysis_run(&self, brand_id: &str) -> EngineResult<Option<AnalysisRun>> {
        let report: Option<String> = self
            .conn
            .query_row(
                "SELECT report FROM analysis_run WHERE brand_id = ?1
                 ORDER BY analysis_date DESC, created_at DESC LIMIT 1",
                params![brand_id],
                |row| row.get(0),
            )
            .optional()?;
        report
            .map(|json| serde_json::from_str(&json).map_err(Into::into))
            .transpose()
    }

    pub fn latest_run_id(&self, brand_id: &str) -> EngineResult<Option<String>> {
        self.conn
            .query_row(
                "SELECT run_id FROM analysis_run WHERE brand_id = ?1
                 ORDER BY analysis_date DESC, created_at DESC LIMIT 1",
                params![brand_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(Into::into)
    }

    /// Profiles plus their base metrics for one run, ordered by combined
    /// score descending then customer id, paginated. `segment` None means
    /// all segments.
    pub fn segment_members(
        &self,
        run_id: &str,
        segment: Option<Segment>,
        limit: Option<u64>,
        offset: u64,
    ) -> EngineResult<Vec<SegmentMember>> {
        let mut stmt = self.conn.prepare(
            "SELECT customer_id, recency_days, frequency_count, monetary_value,
                    category_engagement, recency_score, frequency_score,
                    monetary_score, category_score, rfmc_code, rfmc_score, segment
             FROM customer_profile
             WHERE run_id = ?1 AND (?2 IS NULL OR segment = ?2)
             ORDER BY rfmc_score DESC, customer_id
             LIMIT ?3 OFFSET ?4",
        )?;
        // SQLite treats LIMIT -1 as unlimited.
        let limit = limit.map(|l| l as i64).unwrap_or(-1);
        let rows = stmt.query_map(
            params![run_id, segment.map(|s| s.name()), limit, offset as i64],
            |row| {
                let customer_id: String = row.get(0)?;
                let segment_name: String = row.get(11)?;
                let segment = Segment::from_name(&segment_name).ok_or_else(|| {
                    rusqlite::Error::FromSqlConversionFailure(
                        11,
                        rusqlite::types::Type::Text,
                        format!("unknown segment '{segment_name}'").into(),
                    )
                })?;
                Ok(SegmentMember {
                    metrics: CustomerMetrics {
                        customer_id: customer_id.clone(),
                        recency_days: row.get(1)?,
                        frequency_count: row.get(2)?,
                        monetary_value: row.get(3)?,
                        category_engagement: row.get(4)?,
                    },
                    profile: RfmcProfile {
                        customer_id,
                        recency_score: row.get(5)?,
                        frequency_score: row.get(6)?,
                        monetary_score: row.get(7)?,
                        category_score: row.get(8)?,
                        rfmc_code: row.get(9)?,
                        rfmc_score: row.get(10)?,
                        segment,
                    },
                })
            },
        )?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
