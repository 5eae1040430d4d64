//! Tests for network membership, start ordering and fail-isolated fan-out.

use std::sync::Arc;

use parking_lot::Mutex;

use dmm_core::network::metric_names;
use dmm_core::{
    DeliveryError, InvalidPerformanceNotice, Model, MonitorEvent, Network, NetworkError, Node,
    NotificationHandler, NotifyScope, PerformanceReport, RecordingSink, ValidityPolicy,
};

/// Records every notice it receives and fails for the configured node ids.
#[derive(Default)]
struct ScriptedHandler {
    received: Mutex<Vec<(String, InvalidPerformanceNotice)>>,
    failing: Vec<String>,
}

impl ScriptedHandler {
    fn failing(ids: &[&str]) -> Self {
        Self {
            received: Mutex::new(Vec::new()),
            failing: ids.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn recipients(&self) -> Vec<String> {
        self.received.lock().iter().map(|(id, _)| id.clone()).collect()
    }
}

impl NotificationHandler for ScriptedHandler {
    fn on_invalid_performance(
        &self,
        recipient: &Node,
        notice: &InvalidPerformanceNotice,
    ) -> Result<(), DeliveryError> {
        self.received
            .lock()
            .push((recipient.id().to_string(), notice.clone()));
        if self.failing.iter().any(|id| id == recipient.id()) {
            return Err(DeliveryError::Unreachable(recipient.id().to_string()));
        }
        Ok(())
    }
}

fn model() -> Model {
    Model::new("myModel", 1)
}

fn network_with(
    ids: &[&str],
    handler: Arc<ScriptedHandler>,
    sink: Arc<RecordingSink>,
) -> Network {
    Network::builder()
        .nodes(ids.iter().map(|id| Node::new(*id, model())))
        .handler(handler)
        .sink(sink)
        .build()
        .unwrap()
}

#[test]
fn test_start_order_matches_insertion_order() {
    let sink = Arc::new(RecordingSink::new());
    let mut network = network_with(
        &["n3", "n1", "n2"],
        Arc::new(ScriptedHandler::default()),
        sink.clone(),
    );

    network.start_monitoring(&model());

    let order: Vec<String> = sink.events().iter().map(|e| e.node_id().to_string()).collect();
    assert_eq!(order, vec!["n3", "n1", "n2"]);
}

#[test]
fn test_start_passes_same_model_to_every_node() {
    let sink = Arc::new(RecordingSink::new());
    let mut network = network_with(
        &["n1", "n2"],
        Arc::new(ScriptedHandler::default()),
        sink.clone(),
    );

    network.start_monitoring(&Model::new("otherModel", 2));

    assert!(sink
        .events()
        .iter()
        .all(|e| e.model_name() == "otherModel"));
}

#[test]
fn test_notify_reaches_every_member_in_order() {
    let handler = Arc::new(ScriptedHandler::default());
    let sink = Arc::new(RecordingSink::new());
    let network = network_with(&["n1", "n2", "n3"], handler.clone(), sink.clone());

    let report = network.notify_invalid_performance("myModel");

    assert_eq!(handler.recipients(), vec!["n1", "n2", "n3"]);
    assert_eq!(report.delivered, vec!["n1", "n2", "n3"]);
    assert!(handler
        .received
        .lock()
        .iter()
        .all(|(_, notice)| notice.model_name == "myModel" && notice.origin.is_none()));
    // Successful delivery emits nothing
    assert!(sink.is_empty());
}

#[test]
fn test_failing_member_does_not_block_remaining() {
    let handler = Arc::new(ScriptedHandler::failing(&["n2"]));
    let sink = Arc::new(RecordingSink::new());
    let network = network_with(&["n1", "n2", "n3"], handler.clone(), sink.clone());

    let report = network.notify_invalid_performance("myModel");

    assert_eq!(handler.recipients(), vec!["n1", "n2", "n3"]);
    assert_eq!(report.delivered, vec!["n1", "n3"]);
    assert_eq!(
        report.failed,
        vec![("n2".to_string(), DeliveryError::Unreachable("n2".to_string()))]
    );
    assert!(!report.is_complete());
    assert_eq!(report.attempted(), 3);

    let failures = sink.events_of("delivery_failed");
    assert_eq!(failures.len(), 1);
    assert!(matches!(
        &failures[0],
        MonitorEvent::DeliveryFailed { node_id, .. } if node_id == "n2"
    ));
    assert_eq!(
        network.metrics().counter(metric_names::NOTIFICATIONS_FAILED),
        1
    );
    assert_eq!(
        network.metrics().counter(metric_names::NOTIFICATIONS_DELIVERED),
        2
    );
}

#[test]
fn test_every_member_failing_still_attempts_all() {
    let handler = Arc::new(ScriptedHandler::failing(&["n1", "n2", "n3"]));
    let sink = Arc::new(RecordingSink::new());
    let network = network_with(&["n1", "n2", "n3"], handler.clone(), sink.clone());

    let report = network.notify_invalid_performance("myModel");

    assert!(report.delivered.is_empty());
    assert_eq!(report.failed.len(), 3);
    assert_eq!(sink.events_of("delivery_failed").len(), 3);
}

#[test]
fn test_invalid_report_triggers_exactly_one_fan_out() {
    let handler = Arc::new(ScriptedHandler::default());
    let sink = Arc::new(RecordingSink::new());
    let network = network_with(&["n1", "n2", "n3"], handler.clone(), sink.clone());

    network
        .validate_performance("n2", &PerformanceReport::new(0.95, 0.1))
        .unwrap();

    // One fan-out = one notice per member, all from the same origin
    let received = handler.received.lock();
    assert_eq!(received.len(), 3);
    assert!(received
        .iter()
        .all(|(_, n)| n.origin.as_deref() == Some("n2") && n.model_name == "myModel"));
}

#[test]
fn test_invalid_event_precedes_notification() {
    let handler = Arc::new(ScriptedHandler::failing(&["n1"]));
    let sink = Arc::new(RecordingSink::new());
    let network = network_with(&["n1", "n2", "n3"], handler.clone(), sink.clone());

    network
        .validate_performance("n2", &PerformanceReport::new(0.5, 0.2))
        .unwrap();

    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert!(matches!(
        &events[0],
        MonitorEvent::InvalidPerformance { node_id, .. } if node_id == "n2"
    ));
    assert!(matches!(
        &events[1],
        MonitorEvent::DeliveryFailed { node_id, .. } if node_id == "n1"
    ));
}

#[test]
fn test_valid_report_triggers_no_notification() {
    let handler = Arc::new(ScriptedHandler::default());
    let sink = Arc::new(RecordingSink::new());
    let network = network_with(&["n1", "n2"], handler.clone(), sink.clone());

    for (accuracy, loss) in [(0.91, 0.09), (0.99, 0.0), (1.0, 0.05)] {
        let outcome = network
            .validate_performance("n1", &PerformanceReport::new(accuracy, loss))
            .unwrap();
        assert!(outcome.is_accepted());
    }
    assert!(handler.recipients().is_empty());
    assert!(sink.is_empty());
}

#[test]
fn test_exclude_origin_scope_on_validation() {
    let handler = Arc::new(ScriptedHandler::default());
    let network = Network::builder()
        .nodes(["n1", "n2", "n3"].map(|id| Node::new(id, model())))
        .scope(NotifyScope::ExcludeOrigin)
        .handler(handler.clone())
        .sink(Arc::new(RecordingSink::new()))
        .build()
        .unwrap();

    let outcome = network
        .validate_performance("n1", &PerformanceReport::new(0.2, 0.8))
        .unwrap();

    assert_eq!(handler.recipients(), vec!["n2", "n3"]);
    assert_eq!(outcome.fan_out().unwrap().skipped, vec!["n1"]);
}

#[test]
fn test_custom_policy_is_used_by_nodes() {
    let handler = Arc::new(ScriptedHandler::default());
    let network = Network::builder()
        .node(Node::new("n1", model()))
        .policy(ValidityPolicy::new(0.5, 0.5))
        .handler(handler.clone())
        .sink(Arc::new(RecordingSink::new()))
        .build()
        .unwrap();

    let report = PerformanceReport::new(0.6, 0.4);
    assert!(network.validate_performance("n1", &report).unwrap().is_accepted());
    assert!(handler.recipients().is_empty());
}

#[test]
fn test_duplicate_ids_rejected_at_assembly() {
    let result = Network::builder()
        .node(Node::new("n1", model()))
        .node(Node::new("n1", model()))
        .build();
    assert!(matches!(result, Err(NetworkError::DuplicateNode(id)) if id == "n1"));
}

#[test]
fn test_evaluation_metrics_recorded() {
    let network = network_with(
        &["n1"],
        Arc::new(ScriptedHandler::default()),
        Arc::new(RecordingSink::new()),
    );

    network
        .validate_performance("n1", &PerformanceReport::new(0.95, 0.05))
        .unwrap();
    network
        .validate_performance("n1", &PerformanceReport::new(0.5, 0.2))
        .unwrap();

    let metrics = network.metrics();
    assert_eq!(metrics.counter(metric_names::REPORTS_EVALUATED), 2);
    assert_eq!(metrics.counter(metric_names::REPORTS_INVALID), 1);
    let accuracy = metrics.histogram(metric_names::REPORT_ACCURACY).unwrap();
    assert_eq!(accuracy.count, 2);
    assert_eq!(accuracy.min, 0.5);
    assert_eq!(accuracy.max, 0.95);
}
