//! `shoptally-recon`: two-way finance reconciliation engine.
//!
//! Pure engine crate: receives pre-loaded tables, returns updated tables
//! and match statistics. No CLI or IO dependencies. Matching is a
//! one-time claim per (order, admin file) pair; re-running the same pair
//! fails instead of silently re-applying.

pub mod engine;
pub mod error;
pub mod model;

pub use engine::{finance_check, make_report, match_ratio};
pub use error::ReconError;
pub use model::{CheckOptions, CheckOutcome};
