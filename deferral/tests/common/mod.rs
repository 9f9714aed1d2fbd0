#![allow(dead_code)]

use deferral::{Deferred, Outcome, Value};
use tracing_subscriber::EnvFilter;

/// Installs a test-friendly subscriber once; `RUST_LOG=deferral=trace` shows
/// the engine's lifecycle records.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Reads a numeric value, panicking on anything else.
pub fn num(value: &Value) -> f64 {
    value
        .as_number()
        .unwrap_or_else(|| panic!("expected a number, got {value:?}"))
}

pub fn fulfilled(deferred: &Deferred) -> Value {
    match deferred.outcome() {
        Some(Outcome::Fulfilled(value)) => value,
        other => panic!("expected fulfilled, got {other:?}"),
    }
}

pub fn rejected(deferred: &Deferred) -> Value {
    match deferred.outcome() {
        Some(Outcome::Rejected(reason)) => reason,
        other => panic!("expected rejected, got {other:?}"),
    }
}
