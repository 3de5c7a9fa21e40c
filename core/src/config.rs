//! Run parameters and score weighting.
//!
//! Everything the engine needs for a run is passed in explicitly — there is
//! no ambient default brand or default date read from the environment.
//! Validation fails fast, before any store read, naming the violated
//! constraint.

use crate::error::{EngineError, EngineResult};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Default lookback window in days.
pub const DEFAULT_PERIOD_DAYS: u32 = 365;

/// Tolerance when checking that the four weights sum to 1.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Relative weight of each dimension in the combined `rfmc_score`.
/// Equal weights by default; a brand can emphasize e.g. monetary value
/// over recency without touching the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub recency:   f64,
    pub frequency: f64,
    pub monetary:  f64,
    pub category:  f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            recency:   0.25,
            frequency: 0.25,
            monetary:  0.25,
            category:  0.25,
        }
    }
}

impl ScoreWeights {
    /// Each weight must lie in [0, 1] and the four must sum to 1
    /// within `WEIGHT_SUM_TOLERANCE`.
    pub fn validate(&self) -> EngineResult<()> {
        let named = [
            ("recency", self.recency),
            ("frequency", self.frequency),
            ("monetary", self.monetary),
            ("category", self.category),
        ];
        for (name, w) in named {
            if !w.is_finite() || !(0.0..=1.0).contains(&w) {
                return Err(EngineError::InvalidParameters {
                    constraint: format!("weight '{name}' must be in [0, 1], got {w}"),
                });
            }
        }
        let sum: f64 = named.iter().map(|(_, w)| w).sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(EngineError::InvalidParameters {
                constraint: format!("weights must sum to 1, got {sum}"),
            });
        }
        Ok(())
    }
}

/// Parameters for one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisParams {
    pub analysis_date: NaiveDate,
    pub period_days:   u32,
    pub weights:       ScoreWeights,
    /// Cap on the report's top-customers list. None = unlimited.
    pub top_customer_limit: Option<usize>,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            analysis_date: Utc::now().date_naive(),
            period_days: DEFAULT_PERIOD_DAYS,
            weights: ScoreWeights::default(),
            top_customer_limit: None,
        }
    }
}

impl AnalysisParams {
    /// Defaults with an explicit analysis date. Used pervasively in tests,
    /// where "today" would make runs non-reproducible.
    pub fn for_date(analysis_date: NaiveDate) -> Self {
        Self {
            analysis_date,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.period_days == 0 {
            return Err(EngineError::InvalidParameters {
                constraint: "analysis_period_days must be positive".to_string(),
            });
        }
        self.weights.validate()
    }
}
