//! RFMC customer segmentation engine.
//!
//! Given a brand's transaction history over an analysis window, the engine
//! scores every customer on four behavioural dimensions (Recency, Frequency,
//! Monetary, Category), classifies each customer into one of eleven
//! marketing segments, and rolls the results up into segment-level business
//! metrics.
//!
//! PIPELINE ORDER (fixed, documented in engine.rs):
//!   transactions → metric aggregation → quantile scoring →
//!   classification → segment aggregation → report

pub mod config;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod report;
pub mod scoring;
pub mod segments;
pub mod store;
pub mod types;
