//! Metric aggregation — reduces raw transactions to per-customer base metrics.
//!
//! One record per customer with at least one transaction in the window:
//!   1. recency_days        — days since the most recent purchase
//!   2. frequency_count     — number of transactions in the window
//!   3. monetary_value      — total spend in the window
//!   4. category_engagement — effective category count (inverse Simpson)
//!
//! A customer with zero transactions in the window produces no record: they
//! are not analyzable this run, which is distinct from the Lost segment
//! (that requires at least one transaction to score at all).
//!
//! Pure read + reduce. An empty transaction set is a valid "no data"
//! result, not an error.

use crate::types::{BrandId, CategoryId, CustomerId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ── Public types ─────────────────────────────────────────────────────────────

/// An immutable transaction fact, owned by the store. The engine only
/// reads these, scoped by brand and window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub txn_id:      String,
    pub brand_id:    BrandId,
    pub customer_id: CustomerId,
    pub timestamp:   DateTime<Utc>,
    /// Non-negative, in the brand's base currency. No conversion anywhere.
    pub amount:      f64,
    pub category:    CategoryId,
}

/// The four base metrics for one customer, one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerMetrics {
    pub customer_id:         CustomerId,
    pub recency_days:        u32,
    pub frequency_count:     u32,
    pub monetary_value:      f64,
    pub category_engagement: f64,
}

// ── Aggregation ──────────────────────────────────────────────────────────────

/// Reduce a window of transactions into per-customer base metrics.
///
/// Output is sorted by customer id so every downstream stage sees a stable
/// order regardless of transaction arrival order.
pub fn aggregate_metrics(
    transactions: &[Transaction],
    analysis_date: NaiveDate,
) -> Vec<CustomerMetrics> {
    let mut by_customer: BTreeMap<&str, Vec<&Transaction>> = BTreeMap::new();
    for txn in transactions {
        by_customer
            .entry(txn.customer_id.as_str())
            .or_default()
            .push(txn);
    }

    by_customer
        .into_iter()
        .map(|(customer_id, txns)| {
            let last_purchase = txns.iter().map(|t| t.timestamp.date_naive()).max();
            let recency_days = last_purchase
                .map(|d| (analysis_date - d).num_days().max(0) as u32)
                .unwrap_or(0);

            CustomerMetrics {
                customer_id: customer_id.to_string(),
                recency_days,
                frequency_count: txns.len() as u32,
                monetary_value: txns.iter().map(|t| t.amount).sum(),
                category_engagement: category_engagement(&txns),
            }
        })
        .collect()
}

/// Inverse Simpson diversity of spend across categories: `1 / Σ share_i²`,
/// the "effective number of categories". One category → 1.0; k perfectly
/// balanced categories → k; skew pulls the value toward 1. Monotonic in
/// "more categories, more balanced spend", which is all the scorer needs.
fn category_engagement(txns: &[&Transaction]) -> f64 {
    let mut spend: BTreeMap<&str, f64> = BTreeMap::new();
    for t in txns {
        *spend.entry(t.category.as_str()).or_insert(0.0) += t.amount;
    }

    let total: f64 = spend.values().sum();
    if total <= 0.0 {
        // All zero-amount transactions: spend shares are undefined,
        // fall back to the raw distinct-category count.
        return spend.len() as f64;
    }

    let sum_sq: f64 = spend
        .values()
        .map(|s| {
            let share = s / total;
            share * share
        })
        .sum();
    1.0 / sum_sq
}
