//! Prometheus metrics backend for the beacon presence core.
//!
//! This crate provides a [`PrometheusMetrics`] implementation of
//! [`beacon_core::MetricsBackend`] that exposes core measurements in
//! Prometheus format.
//!
//! ## Metrics
//! - `beacon_tasks_executed_total{kind, outcome}` - Counter
//! - `beacon_task_duration_seconds{kind}` - Histogram
//! - `beacon_transitions_total{from, to}` - Counter
//! - `beacon_transitions_denied_total{from}` - Counter
//! - `beacon_presentation_actions_total{action}` - Counter
//!
//! Custom states are folded into one `custom` label value to keep the
//! label set bounded.
//!
//! ## HTTP Server
//! This crate does NOT provide an HTTP server for a `/metrics` endpoint.
//! Call [`PrometheusMetrics::gather`] from your application's existing
//! HTTP framework and encode with `prometheus::TextEncoder`.

mod backend;
pub use backend::PrometheusMetrics;

pub use prometheus::{Encoder, Registry, TextEncoder};
