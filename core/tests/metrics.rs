use chrono::{Days, NaiveDate, NaiveTime};
use rfmc_core::metrics::{aggregate_metrics, Transaction};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn analysis_date() -> NaiveDate {
    date(2025, 6, 30)
}

/// A transaction `days_back` days before the analysis date.
fn txn(customer: &str, days_back: u64, amount: f64, category: &str) -> Transaction {
    let day = analysis_date() - Days::new(days_back);
    Transaction {
        txn_id: format!("{customer}-{days_back}-{category}-{amount}"),
        brand_id: "brand-a".to_string(),
        customer_id: customer.to_string(),
        timestamp: day.and_time(NaiveTime::MIN).and_utc(),
        amount,
        category: category.to_string(),
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// One metrics record per customer with transactions; base metrics are
/// computed from that customer's transactions only.
#[test]
fn aggregates_per_customer() {
    let txns = vec![
        txn("alice", 3, 50.0, "apparel"),
        txn("alice", 40, 20.0, "apparel"),
        txn("bob", 10, 300.0, "electronics"),
    ];

    let metrics = aggregate_metrics(&txns, analysis_date());
    assert_eq!(metrics.len(), 2);

    let alice = &metrics[0];
    assert_eq!(alice.customer_id, "alice");
    assert_eq!(alice.recency_days, 3);
    assert_eq!(alice.frequency_count, 2);
    assert!((alice.monetary_value - 70.0).abs() < 1e-9);

    let bob = &metrics[1];
    assert_eq!(bob.customer_id, "bob");
    assert_eq!(bob.recency_days, 10);
    assert_eq!(bob.frequency_count, 1);
    assert!((bob.monetary_value - 300.0).abs() < 1e-9);
}

/// Zero transactions is a valid "no data" input, not an error.
#[test]
fn empty_input_yields_empty_output() {
    let metrics = aggregate_metrics(&[], analysis_date());
    assert!(metrics.is_empty());
}

/// Output order is stable (sorted by customer id) regardless of the
/// order transactions arrive in.
#[test]
fn output_sorted_by_customer_id() {
    let txns = vec![
        txn("zed", 1, 10.0, "home"),
        txn("amy", 2, 10.0, "home"),
        txn("mia", 3, 10.0, "home"),
    ];

    let ids: Vec<String> = aggregate_metrics(&txns, analysis_date())
        .into_iter()
        .map(|m| m.customer_id)
        .collect();
    assert_eq!(ids, vec!["amy", "mia", "zed"]);
}

/// Recency is measured from the most recent transaction in the window.
#[test]
fn recency_uses_most_recent_purchase() {
    let txns = vec![
        txn("alice", 200, 10.0, "home"),
        txn("alice", 7, 10.0, "home"),
        txn("alice", 90, 10.0, "home"),
    ];

    let metrics = aggregate_metrics(&txns, analysis_date());
    assert_eq!(metrics[0].recency_days, 7);
}

/// A single category scores an engagement of exactly 1 (one effective
/// category); two perfectly balanced categories score 2.
#[test]
fn engagement_is_effective_category_count() {
    let single = aggregate_metrics(&[txn("a", 1, 100.0, "apparel")], analysis_date());
    assert!((single[0].category_engagement - 1.0).abs() < 1e-9);

    let balanced = aggregate_metrics(
        &[
            txn("b", 1, 100.0, "apparel"),
            txn("b", 2, 100.0, "electronics"),
        ],
        analysis_date(),
    );
    assert!((balanced[0].category_engagement - 2.0).abs() < 1e-9);
}

/// More balanced spend across the same categories means higher
/// engagement; skew pulls the value toward 1.
#[test]
fn engagement_rewards_balance() {
    let skewed = aggregate_metrics(
        &[
            txn("a", 1, 900.0, "apparel"),
            txn("a", 2, 100.0, "electronics"),
        ],
        analysis_date(),
    );
    let balanced = aggregate_metrics(
        &[
            txn("b", 1, 500.0, "apparel"),
            txn("b", 2, 500.0, "electronics"),
        ],
        analysis_date(),
    );

    let skewed = skewed[0].category_engagement;
    let balanced = balanced[0].category_engagement;
    assert!(skewed > 1.0 && skewed < balanced, "skewed={skewed} balanced={balanced}");
}

/// All-zero spend has no defined spend shares; engagement falls back to
/// the distinct-category count.
#[test]
fn engagement_zero_spend_falls_back_to_category_count() {
    let metrics = aggregate_metrics(
        &[
            txn("a", 1, 0.0, "apparel"),
            txn("a", 2, 0.0, "electronics"),
            txn("a", 3, 0.0, "home"),
        ],
        analysis_date(),
    );
    assert!((metrics[0].category_engagement - 3.0).abs() < 1e-9);
    assert!((metrics[0].monetary_value).abs() < 1e-9);
}
