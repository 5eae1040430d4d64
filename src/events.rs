//! Monitoring events and the sinks that receive them.
//!
//! Nodes and the network never print. Every observable action is a
//! [`MonitorEvent`] handed to an injected [`EventSink`], so production code
//! can route events to `tracing` while tests record and assert on them.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::network::NodeId;
use crate::policy::Violation;

/// Observable events emitted by the monitoring core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MonitorEvent {
    /// A node entered the monitoring state for a model.
    NodeStarted { node_id: NodeId, model_name: String },
    /// A node rejected a report and is about to notify the network.
    InvalidPerformance {
        node_id: NodeId,
        model_name: String,
        accuracy: f64,
        loss: f64,
        violations: Vec<Violation>,
    },
    /// A member failed to handle an invalid-performance notice.
    DeliveryFailed {
        node_id: NodeId,
        model_name: String,
        reason: String,
    },
}

/// Severity levels for monitor events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

impl EventSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        }
    }
}

impl MonitorEvent {
    /// Short machine-readable event type.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NodeStarted { .. } => "node_started",
            Self::InvalidPerformance { .. } => "invalid_performance",
            Self::DeliveryFailed { .. } => "delivery_failed",
        }
    }

    pub fn severity(&self) -> EventSeverity {
        match self {
            Self::NodeStarted { .. } => EventSeverity::Info,
            Self::InvalidPerformance { .. } => EventSeverity::Warning,
            Self::DeliveryFailed { .. } => EventSeverity::Warning,
        }
    }

    /// Node that produced (or failed to receive) this event.
    pub fn node_id(&self) -> &str {
        match self {
            Self::NodeStarted { node_id, .. }
            | Self::InvalidPerformance { node_id, .. }
            | Self::DeliveryFailed { node_id, .. } => node_id,
        }
    }

    pub fn model_name(&self) -> &str {
        match self {
            Self::NodeStarted { model_name, .. }
            | Self::InvalidPerformance { model_name, .. }
            | Self::DeliveryFailed { model_name, .. } => model_name,
        }
    }

    /// Human-readable line for this event.
    pub fn message(&self) -> String {
        match self {
            Self::NodeStarted {
                node_id,
                model_name,
            } => format!("Node {} started monitoring model {}", node_id, model_name),
            Self::InvalidPerformance { .. } => {
                "Model performance is invalid. Notifying network...".to_string()
            }
            Self::DeliveryFailed {
                node_id, reason, ..
            } => format!("Failed to notify node {}: {}", node_id, reason),
        }
    }
}

/// Receiver of monitor events.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &MonitorEvent);
}

/// Emit a `tracing` event at the level matching an [`EventSeverity`].
macro_rules! log_at {
    ($severity:expr, $($arg:tt)+) => {
        match $severity {
            EventSeverity::Debug => tracing::debug!($($arg)+),
            EventSeverity::Info => tracing::info!($($arg)+),
            EventSeverity::Warning => tracing::warn!($($arg)+),
            EventSeverity::Error => tracing::error!($($arg)+),
        }
    };
}

/// Forwards events to `tracing` at their [`MonitorEvent::severity`] with
/// structured fields.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: &MonitorEvent) {
        let severity = event.severity();
        let kind = event.kind();
        let message = event.message();
        match event {
            MonitorEvent::NodeStarted {
                node_id,
                model_name,
            } => {
                log_at!(
                    severity,
                    event = kind,
                    node_id = %node_id,
                    model = %model_name,
                    "{}",
                    message
                );
            }
            MonitorEvent::InvalidPerformance {
                node_id,
                model_name,
                accuracy,
                loss,
                violations,
            } => {
                let violations = violations
                    .iter()
                    .map(|v| v.as_str())
                    .collect::<Vec<_>>()
                    .join(",");
                log_at!(
                    severity,
                    event = kind,
                    node_id = %node_id,
                    model = %model_name,
                    accuracy = *accuracy,
                    loss = *loss,
                    violations = %violations,
                    "{}",
                    message
                );
            }
            MonitorEvent::DeliveryFailed {
                node_id,
                model_name,
                reason,
            } => {
                log_at!(
                    severity,
                    event = kind,
                    node_id = %node_id,
                    model = %model_name,
                    reason = %reason,
                    "{}",
                    message
                );
            }
        }
    }
}

/// Keeps every emitted event in memory, in emission order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<MonitorEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of all events recorded so far.
    pub fn events(&self) -> Vec<MonitorEvent> {
        self.events.lock().clone()
    }

    /// Recorded events of one kind (see [`MonitorEvent::kind`]).
    pub fn events_of(&self, kind: &str) -> Vec<MonitorEvent> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.kind() == kind)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: &MonitorEvent) {
        self.events.lock().push(event.clone());
    }
}

/// Forwards each event to several sinks, in order.
#[derive(Default, Clone)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn EventSink>>,
}

impl FanoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl EventSink for FanoutSink {
    fn emit(&self, event: &MonitorEvent) {
        for sink in &self.sinks {
            sink.emit(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started(id: &str) -> MonitorEvent {
        MonitorEvent::NodeStarted {
            node_id: id.to_string(),
            model_name: "myModel".to_string(),
        }
    }

    #[test]
    fn test_start_message_shape() {
        assert_eq!(
            started("node1").message(),
            "Node node1 started monitoring model myModel"
        );
    }

    #[test]
    fn test_invalid_message_shape() {
        let event = MonitorEvent::InvalidPerformance {
            node_id: "node2".to_string(),
            model_name: "myModel".to_string(),
            accuracy: 0.5,
            loss: 0.2,
            violations: vec![Violation::AccuracyTooLow, Violation::LossTooHigh],
        };
        assert_eq!(
            event.message(),
            "Model performance is invalid. Notifying network..."
        );
        assert_eq!(event.kind(), "invalid_performance");
        assert_eq!(event.severity(), EventSeverity::Warning);
        assert_eq!(event.node_id(), "node2");
        assert_eq!(event.model_name(), "myModel");
    }

    #[test]
    fn test_severity_ordering() {
        assert!(EventSeverity::Error > EventSeverity::Warning);
        assert!(EventSeverity::Warning > EventSeverity::Info);
        assert!(EventSeverity::Info > EventSeverity::Debug);
        assert_eq!(EventSeverity::Warning.as_str(), "WARNING");
    }

    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_delivery_failed_logged_at_warning() {
        let event = MonitorEvent::DeliveryFailed {
            node_id: "n1".to_string(),
            model_name: "myModel".to_string(),
            reason: "node n1 unreachable".to_string(),
        };
        assert_eq!(event.severity(), EventSeverity::Warning);

        let captured = CapturedLog::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::TRACE)
            .finish();
        tracing::subscriber::with_default(subscriber, || TracingSink.emit(&event));

        let text = String::from_utf8(captured.0.lock().clone()).unwrap();
        assert!(text.contains("WARN"));
        assert!(!text.contains("ERROR"));
        assert!(text.contains("Failed to notify node n1"));
    }

    #[test]
    fn test_recording_sink_keeps_order() {
        let sink = RecordingSink::new();
        assert!(sink.is_empty());
        sink.emit(&started("a"));
        sink.emit(&started("b"));
        let ids: Vec<_> = sink.events().iter().map(|e| e.node_id().to_string()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(sink.events_of("node_started").len(), 2);
        assert!(sink.events_of("delivery_failed").is_empty());
        sink.clear();
        assert_eq!(sink.len(), 0);
    }

    #[test]
    fn test_fanout_sink_reaches_all() {
        let first = Arc::new(RecordingSink::new());
        let second = Arc::new(RecordingSink::new());
        let fanout = FanoutSink::new()
            .with(first.clone())
            .with(second.clone())
            .with(Arc::new(TracingSink));
        assert_eq!(fanout.len(), 3);

        fanout.emit(&started("node1"));
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
    }

    #[test]
    fn test_event_serializes_with_type_tag() {
        let json = serde_json::to_value(started("node1")).unwrap();
        assert_eq!(json["type"], "node_started");
        assert_eq!(json["node_id"], "node1");
    }
}
