use chrono::{Days, NaiveDate, NaiveTime};
use rfmc_core::config::AnalysisParams;
use rfmc_core::engine::SegmentationEngine;
use rfmc_core::metrics::Transaction;
use rfmc_core::store::SegmentStore;

// ── Helpers ──────────────────────────────────────────────────────────────────

fn analysis_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 30).expect("valid date")
}

fn txn(customer: &str, days_back: u64, amount: f64) -> Transaction {
    let day = analysis_date() - Days::new(days_back);
    Transaction {
        txn_id: format!("{customer}-{days_back}-{amount}"),
        brand_id: "brand-a".to_string(),
        customer_id: customer.to_string(),
        timestamp: day.and_time(NaiveTime::MIN).and_utc(),
        amount,
        category: "apparel".to_string(),
    }
}

fn tmp_db(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("rfmc-test-{name}-{}.db", std::process::id()))
}

fn cleanup(path: &std::path::Path) {
    for suffix in ["", "-wal", "-shm"] {
        let mut p = path.as_os_str().to_owned();
        p.push(suffix);
        let _ = std::fs::remove_file(std::path::PathBuf::from(p));
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// Migrations are idempotent: applying them twice is a no-op.
#[test]
fn migrate_twice_is_fine() {
    let store = SegmentStore::in_memory().expect("store");
    store.migrate().expect("first migrate");
    store.migrate().expect("second migrate");
}

/// A run published through one connection is visible, whole, through
/// another connection to the same file.
#[test]
fn published_run_is_visible_across_connections() {
    let path = tmp_db("round-trip");
    cleanup(&path);

    let path_str = path.to_string_lossy().into_owned();
    let store = SegmentStore::open(&path_str).expect("open");
    store.migrate().expect("migrate");
    for days_back in [2, 30, 100] {
        store
            .insert_transaction(&txn("alice", days_back, 40.0))
            .expect("insert");
    }
    store
        .insert_transaction(&txn("bob", 250, 900.0))
        .expect("insert");

    let reader = store.reopen().expect("reader connection");
    assert!(reader
        .latest_analysis_run("brand-a")
        .expect("query")
        .is_none());

    let engine = SegmentationEngine::new(store);
    let run = engine
        .calculate("brand-a", &AnalysisParams::for_date(analysis_date()))
        .expect("calculate");

    let cached = reader
        .latest_analysis_run("brand-a")
        .expect("query")
        .expect("run present after publish");
    assert_eq!(cached, run);

    cleanup(&path);
}
