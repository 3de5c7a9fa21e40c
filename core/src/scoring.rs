//! Quantile scoring — population quintiles for the four base metrics.
//!
//! Each metric is scored independently across the whole population: a
//! customer's class is `floor(5 * rank / n) + 1`, where `rank` counts
//! strictly smaller values. Equal raw values share a rank and therefore a
//! score; ties are broken only by population rank, never by customer
//! identity, so scoring is reproducible across runs over identical input.
//! Recency counts strictly larger values instead, inverting the scale so
//! the most recent purchase lands in class 5.
//!
//! Populations with fewer than 5 distinct values for a metric cannot fill
//! all five bands. Scores stay in [1, 5] and the metric is reported as a
//! run warning — a documented approximation, not a failure.

use crate::config::ScoreWeights;
use crate::metrics::CustomerMetrics;
use crate::segments::Segment;
use crate::types::CustomerId;
use serde::{Deserialize, Serialize};

// ── Public types ─────────────────────────────────────────────────────────────

/// The four ordinal scores, each in 1..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RfmcScores {
    pub recency:   u8,
    pub frequency: u8,
    pub monetary:  u8,
    pub category:  u8,
}

impl RfmcScores {
    /// The four scores concatenated as single digits, R-F-M-C order.
    /// Always exactly 4 characters, each in '1'..'5'.
    pub fn code(&self) -> String {
        format!(
            "{}{}{}{}",
            self.recency, self.frequency, self.monetary, self.category
        )
    }

    /// Weighted combination of the four ordinals, range [1, 5],
    /// rounded to 2 decimals for display and test stability.
    pub fn weighted(&self, weights: &ScoreWeights) -> f64 {
        round2(
            weights.recency * self.recency as f64
                + weights.frequency * self.frequency as f64
                + weights.monetary * self.monetary as f64
                + weights.category * self.category as f64,
        )
    }
}

/// One customer's full profile for a run: scores, derived code and
/// combined score, and the assigned segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RfmcProfile {
    pub customer_id: CustomerId,
    pub recency_score:   u8,
    pub frequency_score: u8,
    pub monetary_score:  u8,
    pub category_score:  u8,
    pub rfmc_code:  String,
    pub rfmc_score: f64,
    pub segment:    Segment,
}

impl RfmcProfile {
    pub fn scores(&self) -> RfmcScores {
        RfmcScores {
            recency:   self.recency_score,
            frequency: self.frequency_score,
            monetary:  self.monetary_score,
            category:  self.category_score,
        }
    }
}

/// Scorer output: one score vector per input metric record (index-aligned),
/// plus the metrics whose populations collapsed below 5 distinct values.
#[derive(Debug, Clone)]
pub struct ScoredPopulation {
    pub scores: Vec<RfmcScores>,
    pub degenerate_metrics: Vec<&'static str>,
}

// ── Scoring ──────────────────────────────────────────────────────────────────

/// Score the whole population. Output is index-aligned with `metrics`.
pub fn score_population(metrics: &[CustomerMetrics]) -> ScoredPopulation {
    let recency: Vec<f64> = metrics.iter().map(|m| m.recency_days as f64).collect();
    let frequency: Vec<f64> = metrics.iter().map(|m| m.frequency_count as f64).collect();
    let monetary: Vec<f64> = metrics.iter().map(|m| m.monetary_value).collect();
    let category: Vec<f64> = metrics.iter().map(|m| m.category_engagement).collect();

    let r = quintile_classes(&recency, true);
    let f = quintile_classes(&frequency, false);
    let m = quintile_classes(&monetary, false);
    let c = quintile_classes(&category, false);

    let mut degenerate_metrics = Vec::new();
    for (name, values) in [
        ("recency", &recency),
        ("frequency", &frequency),
        ("monetary", &monetary),
        ("category", &category),
    ] {
        if !values.is_empty() && distinct_count(values) < 5 {
            degenerate_metrics.push(name);
        }
    }

    let scores = (0..metrics.len())
        .map(|i| RfmcScores {
            recency:   r[i],
            frequency: f[i],
            monetary:  m[i],
            category:  c[i],
        })
        .collect();

    ScoredPopulation {
        scores,
        degenerate_metrics,
    }
}

/// Quintile class per value, in [1, 5].
///
/// `rank` is the count of strictly smaller values (strictly larger when
/// `inverted`), so tied values land in the same class and a larger raw
/// value can never score below a smaller one.
fn quintile_classes(values: &[f64], inverted: bool) -> Vec<u8> {
    let n = values.len();
    if n == 0 {
        return Vec::new();
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    values
        .iter()
        .map(|&v| {
            let rank = if inverted {
                n - sorted.partition_point(|&x| x <= v)
            } else {
                sorted.partition_point(|&x| x < v)
            };
            // rank <= n-1, so the class is always <= 5.
            (5 * rank / n) as u8 + 1
        })
        .collect()
}

fn distinct_count(values: &[f64]) -> usize {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    sorted.dedup();
    sorted.len()
}

/// Round to 2 decimals — the documented precision for `rfmc_score` and
/// monetary report fields.
pub(crate) fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
