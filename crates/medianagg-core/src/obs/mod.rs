//! Observability: runtime telemetry (metrics) and sink abstractions.
//!
//! This module does not inspect aggregation state directly.
//! Aggregation and sort code only emit events.

pub(crate) mod metrics;
pub(crate) mod sink;

// re-exports
pub use metrics::{EventOps, EventReport, EventState, KindCounters};
pub use sink::{MetricsEvent, MetricsSink, metrics_report, metrics_reset_all, with_metrics_sink};
