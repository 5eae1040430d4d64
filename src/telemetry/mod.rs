//! Telemetry module for DMM-CORE.
//!
//! Provides structured logging, evaluation spans, and metrics collection.

mod logging;
mod metrics;
mod spans;
mod store;

pub use logging::{init_logging, LogConfig, LogError, LogFormat};
pub use self::metrics::{
    record_fan_out, record_node_started, record_nodes_monitoring, record_report_evaluated,
};
pub use spans::{EvaluationSpan, SpanExt};
pub use store::{HistogramSummary, MetricsSnapshot, MetricsStore};
