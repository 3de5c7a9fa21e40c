//! rfmc-runner: headless runner for the RFMC segmentation engine.
//!
//! Usage:
//!   rfmc-runner --db rfmc.db --brand acme --seed-data --customers 250 --seed 42
//!   rfmc-runner --db rfmc.db --brand acme --date 2026-08-29 --period 365
//!   rfmc-runner --db rfmc.db --brand acme --fetch
//!
//! Synthetic transactions are a demo/fixture concern only: they are
//! generated here, deterministically from --seed, and written to the store
//! like any other transactions. The engine itself never fabricates data.

use anyhow::{Context, Result};
use chrono::{Days, NaiveDate, NaiveTime, Utc};
use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;
use rfmc_core::{
    config::AnalysisParams,
    engine::SegmentationEngine,
    metrics::Transaction,
    report::AnalysisRun,
    store::SegmentStore,
};
use std::env;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let db = arg_str(&args, "--db", ":memory:");
    let brand = arg_str(&args, "--brand", "demo-brand");
    let period: u32 = parse_arg(&args, "--period", 365);
    let seed: u64 = parse_arg(&args, "--seed", 42);
    let customers: usize = parse_arg(&args, "--customers", 250);
    let top: usize = parse_arg(&args, "--top", 10);
    let seed_data = args.iter().any(|a| a == "--seed-data");
    let fetch_only = args.iter().any(|a| a == "--fetch");

    let analysis_date = match args.windows(2).find(|w| w[0] == "--date") {
        Some(w) => NaiveDate::parse_from_str(&w[1], "%Y-%m-%d")
            .with_context(|| format!("malformed --date '{}'", w[1]))?,
        None => Utc::now().date_naive(),
    };

    let store = SegmentStore::open(&db)?;
    store.migrate()?;

    if seed_data {
        let inserted = seed_transactions(&store, &brand, analysis_date, customers, seed)?;
        println!("seeded {inserted} transactions for brand '{brand}'");
    }

    let engine = SegmentationEngine::new(store);

    let run = if fetch_only {
        engine.fetch_analysis(&brand, None)?
    } else {
        let params = AnalysisParams {
            analysis_date,
            period_days: period,
            top_customer_limit: Some(top),
            ..AnalysisParams::default()
        };
        engine.calculate(&brand, &params)?
    };

    print_report(&run);
    Ok(())
}

// ── Output ───────────────────────────────────────────────────────────────────

fn print_report(run: &AnalysisRun) {
    println!();
    println!(
        "RFMC analysis — brand '{}', date {}, {}-day window",
        run.brand_id, run.analysis_date, run.period_days
    );
    println!(
        "  customers: {}   transactions: {}   revenue: {:.2}",
        run.summary.total_customers, run.summary.total_transactions, run.summary.total_revenue
    );
    for warning in &run.warnings {
        println!("  warning: {warning}");
    }

    println!();
    println!("  {:<22} {:>9} {:>7} {:>14} {:>12}", "segment", "customers", "share", "revenue", "avg/customer");
    for s in &run.segments {
        println!(
            "  {:<22} {:>9} {:>6.1}% {:>14.2} {:>12.2}",
            s.segment.name(),
            s.customer_count,
            s.percentage_of_total,
            s.total_revenue,
            s.avg_revenue_per_customer,
        );
    }

    if !run.top_customers.is_empty() {
        println!();
        println!("  top customers:");
        for p in &run.top_customers {
            println!(
                "    {:<14} code {}  score {:>4.2}  {}",
                p.customer_id,
                p.rfmc_code,
                p.rfmc_score,
                p.segment.name()
            );
        }
    }
}

// ── Demo data ────────────────────────────────────────────────────────────────

const CATEGORIES: [&str; 6] = [
    "apparel",
    "electronics",
    "home",
    "beauty",
    "grocery",
    "services",
];

/// Deterministic synthetic history: a mix of heavy repeat buyers, mid
/// spenders and one-off purchasers, spread over ~1.5x the default window
/// so some customers fall outside it.
fn seed_transactions(
    store: &SegmentStore,
    brand: &str,
    analysis_date: NaiveDate,
    customers: usize,
    seed: u64,
) -> Result<u64> {
    let mut rng = Pcg64Mcg::seed_from_u64(seed);
    let mut inserted = 0u64;

    for i in 0..customers {
        let customer_id = format!("cust-{i:04}");

        // Activity archetype drives count and spend level.
        let roll = next_f64(&mut rng);
        let (txn_count, spend_floor) = if roll < 0.15 {
            (12 + below(&mut rng, 24), 80.0) // heavy
        } else if roll < 0.55 {
            (3 + below(&mut rng, 8), 30.0) // mid
        } else {
            (1 + below(&mut rng, 2), 10.0) // light / one-off
        };

        for n in 0..txn_count {
            let days_back = below(&mut rng, 540);
            let date = analysis_date - Days::new(days_back);
            let amount = pareto(&mut rng, spend_floor, 1.5).min(5_000.0);
            let category = CATEGORIES[below(&mut rng, CATEGORIES.len() as u64) as usize];

            store.insert_transaction(&Transaction {
                txn_id: format!("{customer_id}-txn-{n:03}"),
                brand_id: brand.to_string(),
                customer_id: customer_id.clone(),
                timestamp: date.and_time(NaiveTime::MIN).and_utc(),
                amount: (amount * 100.0).round() / 100.0,
                category: category.to_string(),
            })?;
            inserted += 1;
        }
    }

    Ok(inserted)
}

fn next_f64(rng: &mut Pcg64Mcg) -> f64 {
    (rng.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
}

fn below(rng: &mut Pcg64Mcg, n: u64) -> u64 {
    rng.next_u64() % n.max(1)
}

/// Simplified Pareto draw: heavy-tailed spend amounts.
fn pareto(rng: &mut Pcg64Mcg, x_min: f64, alpha: f64) -> f64 {
    let u = next_f64(rng).max(1e-10);
    x_min * u.powf(-1.0 / alpha)
}

// ── Args ─────────────────────────────────────────────────────────────────────

fn arg_str(args: &[String], flag: &str, default: &str) -> String {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].clone())
        .unwrap_or_else(|| default.to_string())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
