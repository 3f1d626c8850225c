#![doc(test(attr(deny(warnings))))]

//! Budget Pulse tracks monthly category budgets: it aggregates expense
//! transactions per category and month, and raises deduplicated alerts when
//! a category crosses 75% or 100% of its budget.

pub mod cli;
pub mod config;
pub mod core;
pub mod dashboard;
pub mod domain;
pub mod errors;
pub mod notify;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Budget Pulse tracing initialized.");
    });
}
