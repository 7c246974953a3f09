//! Metrics and Monitoring Adapters
//!
//! Provides Prometheus metrics export via axum 0.7 for the order
//! input engine: quote pipeline events, percentage sizing and
//! submission outcomes.

pub mod prometheus;

pub use prometheus::MetricsRegistry;
