//! Prometheus Metrics Registry - Order Input Observability
//!
//! Registers and exposes Prometheus metrics for the order form:
//! quote pipeline activity, slider sizing, submission outcomes and
//! refusals, and submission latency.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::get;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};
use tokio::sync::broadcast;
use tracing::{info, instrument, warn};

use crate::usecases::order_input::EngineEvent;
use crate::usecases::submission::{SubmissionOutcome, SubmissionRefusal};

/// Centralized Prometheus metrics for the order input engine.
///
/// All metrics follow the naming convention `order_input_*`.
pub struct MetricsRegistry {
    /// Prometheus registry.
    registry: Registry,
    /// Engine events by kind.
    pub engine_events: IntCounterVec,
    /// Submission attempts by outcome.
    pub submissions: IntCounterVec,
    /// Submit requests refused before reaching the wallet.
    pub submission_refusals: IntCounterVec,
    /// Wallet round-trip time (milliseconds).
    pub submission_latency_ms: HistogramVec,
    /// Quote fetches issued but not yet answered.
    pub quotes_in_flight: IntGauge,
    /// Session commands by name.
    pub commands: IntCounterVec,
}

impl MetricsRegistry {
    /// Create and register all Prometheus metrics.
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let engine_events = IntCounterVec::new(
            Opts::new("order_input_engine_events_total", "Engine events by kind"),
            &["event"],
        )?;

        let submissions = IntCounterVec::new(
            Opts::new("order_input_submissions_total", "Submission attempts by outcome"),
            &["outcome"],
        )?;

        let submission_refusals = IntCounterVec::new(
            Opts::new(
                "order_input_submission_refusals_total",
                "Submit requests refused by precondition",
            ),
            &["reason"],
        )?;

        let submission_latency_ms = HistogramVec::new(
            HistogramOpts::new(
                "order_input_submission_latency_ms",
                "Submission round-trip in milliseconds",
            )
            .buckets(vec![10.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 5000.0, 30000.0]),
            &["order_type"],
        )?;

        let quotes_in_flight = IntGauge::new(
            "order_input_quotes_in_flight",
            "Quote fetches awaiting a response",
        )?;

        let commands = IntCounterVec::new(
            Opts::new("order_input_commands_total", "Session commands by name"),
            &["command"],
        )?;

        // Register all metrics
        registry.register(Box::new(engine_events.clone()))?;
        registry.register(Box::new(submissions.clone()))?;
        registry.register(Box::new(submission_refusals.clone()))?;
        registry.register(Box::new(submission_latency_ms.clone()))?;
        registry.register(Box::new(quotes_in_flight.clone()))?;
        registry.register(Box::new(commands.clone()))?;

        Ok(Self {
            registry,
            engine_events,
            submissions,
            submission_refusals,
            submission_latency_ms,
            quotes_in_flight,
            commands,
        })
    }

    pub fn record_event(&self, event: &EngineEvent, in_flight: usize) {
        self.engine_events.with_label_values(&[event.label()]).inc();
        self.quotes_in_flight
            .set(i64::try_from(in_flight).unwrap_or(i64::MAX));
    }

    pub fn record_submission(&self, order_type: &str, outcome: &SubmissionOutcome, elapsed: Duration) {
        self.submissions.with_label_values(&[outcome.label()]).inc();
        self.submission_latency_ms
            .with_label_values(&[order_type])
            .observe(elapsed.as_secs_f64() * 1000.0);
    }

    pub fn record_refusal(&self, refusal: &SubmissionRefusal) {
        self.submission_refusals
            .with_label_values(&[refusal.label()])
            .inc();
    }

    pub fn record_command(&self, command: &str) {
        self.commands.with_label_values(&[command]).inc();
    }

    /// Encode all metrics in the Prometheus text format.
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
            warn!(error = %e, "Failed to encode metrics");
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }

    /// Serve Prometheus metrics on the configured bind address.
    #[instrument(skip(self, shutdown_rx))]
    pub async fn serve(
        self: Arc<Self>,
        bind_address: String,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> anyhow::Result<()> {
        let metrics_self = Arc::clone(&self);

        let app = Router::new().route(
            "/metrics",
            get(move || {
                let metrics = Arc::clone(&metrics_self);
                async move { metrics.render() }
            }),
        );

        let listener = tokio::net::TcpListener::bind(&bind_address).await?;
        info!(address = %bind_address, "Prometheus metrics server started");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
            })
            .await?;

        Ok(())
    }
}
