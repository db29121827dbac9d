//! Tracing utilities for query and transaction observability.
//!
//! Enable the `tracing` feature to emit spans and events via the `tracing` crate.
//! These macros no-op when the feature is disabled, avoiding `#[cfg]` boilerplate
//! at every call site. The feature is checked in the *calling* crate, so crates
//! using them forward their own `tracing` feature.

/// Emit a debug-level tracing event with the SQL text and parameter count.
///
/// ```ignore
/// quarry_trace_query!(sql.sql(), sql.params().len());
/// ```
#[macro_export]
macro_rules! quarry_trace_query {
    ($sql:expr, $param_count:expr) => {
        #[cfg(feature = "tracing")]
        tracing::debug!(sql = %$sql, params = $param_count, "quarry.query");
    };
}

/// Emit an info-level tracing event for transaction lifecycle (begin, commit, rollback).
///
/// ```ignore
/// quarry_trace_tx!("begin", "sqlite.rusqlite");
/// ```
#[macro_export]
macro_rules! quarry_trace_tx {
    ($event:literal, $driver:expr) => {
        #[cfg(feature = "tracing")]
        tracing::info!(event = $event, driver = %$driver, "quarry.transaction");
    };
}
