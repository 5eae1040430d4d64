//! Network membership and fan-out.
//!
//! The [`Network`] owns its nodes in insertion order and indexes them by id.
//! Insertion order is both the monitoring-start order and the notification
//! fan-out order. Fan-out is a sequential loop; a member whose handler fails
//! is recorded and the loop moves on to the next member.

mod error;
mod node;
mod notify;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub use error::NetworkError;
pub use node::{Node, NodeState, ValidationOutcome};
pub use notify::{
    DeliveryError, FanOutReport, InvalidPerformanceNotice, NoopHandler, NotificationHandler,
    NotifyScope,
};

use crate::events::{EventSink, MonitorEvent, TracingSink};
use crate::model::{Model, PerformanceReport};
use crate::policy::ValidityPolicy;
use crate::telemetry::{self, MetricsStore};

/// Unique node identifier within a network.
pub type NodeId = String;

/// Metric names recorded in the network's [`MetricsStore`].
pub mod metric_names {
    pub const REPORTS_EVALUATED: &str = "reports_evaluated";
    pub const REPORTS_INVALID: &str = "reports_invalid";
    pub const NODES_STARTED: &str = "nodes_started";
    pub const NOTIFICATIONS_DELIVERED: &str = "notifications_delivered";
    pub const NOTIFICATIONS_FAILED: &str = "notifications_failed";
    pub const NODES_MONITORING: &str = "nodes_monitoring";
    pub const REPORT_ACCURACY: &str = "report_accuracy";
    pub const REPORT_LOSS: &str = "report_loss";
}

/// Membership set of nodes plus the collaborators they share.
pub struct Network {
    members: Vec<Node>,
    index: HashMap<NodeId, usize>,
    policy: ValidityPolicy,
    scope: NotifyScope,
    sink: Arc<dyn EventSink>,
    handler: Arc<dyn NotificationHandler>,
    metrics: Arc<MetricsStore>,
}

impl Network {
    /// Network with default policy, scope and collaborators.
    pub fn new(nodes: Vec<Node>) -> Result<Self, NetworkError> {
        NetworkBuilder::new().nodes(nodes).build()
    }

    pub fn builder() -> NetworkBuilder {
        NetworkBuilder::new()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, node_id: &str) -> bool {
        self.index.contains_key(node_id)
    }

    pub fn node(&self, node_id: &str) -> Option<&Node> {
        self.index.get(node_id).map(|&i| &self.members[i])
    }

    /// Members in insertion order.
    pub fn nodes(&self) -> &[Node] {
        &self.members
    }

    pub fn node_ids(&self) -> Vec<&str> {
        self.members.iter().map(|n| n.id()).collect()
    }

    pub fn monitoring_count(&self) -> usize {
        self.members.iter().filter(|n| n.is_monitoring()).count()
    }

    pub fn policy(&self) -> &ValidityPolicy {
        &self.policy
    }

    pub fn scope(&self) -> NotifyScope {
        self.scope
    }

    pub fn sink(&self) -> &dyn EventSink {
        self.sink.as_ref()
    }

    pub fn metrics(&self) -> &MetricsStore {
        &self.metrics
    }

    /// Start every member on `model`, in insertion order.
    pub fn start_monitoring(&mut self, model: &Model) {
        for node in self.members.iter_mut() {
            node.start_monitoring(model, self.sink.as_ref());
            self.metrics.increment_counter(metric_names::NODES_STARTED, 1);
            telemetry::record_node_started();
        }
        let monitoring = self.monitoring_count();
        self.metrics
            .set_gauge(metric_names::NODES_MONITORING, monitoring as f64);
        telemetry::record_nodes_monitoring(monitoring);
    }

    /// Evaluate `report` on the node registered as `node_id`.
    pub fn validate_performance(
        &self,
        node_id: &str,
        report: &PerformanceReport,
    ) -> Result<ValidationOutcome, NetworkError> {
        let node = self
            .node(node_id)
            .ok_or_else(|| NetworkError::UnknownNode(node_id.to_string()))?;
        Ok(node.validate_performance(report, self))
    }

    /// Tell every member that `model_name` was flagged invalid.
    pub fn notify_invalid_performance(&self, model_name: &str) -> FanOutReport {
        self.fan_out(None, model_name)
    }

    /// Same as [`notify_invalid_performance`](Self::notify_invalid_performance),
    /// raised by `origin`. The origin is skipped under
    /// [`NotifyScope::ExcludeOrigin`].
    pub fn notify_invalid_performance_from(&self, origin: &str, model_name: &str) -> FanOutReport {
        self.fan_out(Some(origin), model_name)
    }

    fn fan_out(&self, origin: Option<&str>, model_name: &str) -> FanOutReport {
        let notice = InvalidPerformanceNotice::new(model_name, origin.map(str::to_string));
        let mut report = FanOutReport::new(model_name);

        for node in &self.members {
            if self.scope == NotifyScope::ExcludeOrigin && origin == Some(node.id()) {
                report.skipped.push(node.id().to_string());
                continue;
            }

            match self.handler.on_invalid_performance(node, &notice) {
                Ok(()) => report.delivered.push(node.id().to_string()),
                Err(e) => {
                    self.sink.emit(&MonitorEvent::DeliveryFailed {
                        node_id: node.id().to_string(),
                        model_name: model_name.to_string(),
                        reason: e.to_string(),
                    });
                    report.failed.push((node.id().to_string(), e));
                }
            }
        }

        self.metrics.increment_counter(
            metric_names::NOTIFICATIONS_DELIVERED,
            report.delivered.len() as u64,
        );
        self.metrics
            .increment_counter(metric_names::NOTIFICATIONS_FAILED, report.failed.len() as u64);
        telemetry::record_fan_out(report.delivered.len(), report.failed.len());

        report
    }

    pub(crate) fn record_evaluation(&self, report: &PerformanceReport, valid: bool) {
        self.metrics
            .increment_counter(metric_names::REPORTS_EVALUATED, 1);
        if !valid {
            self.metrics.increment_counter(metric_names::REPORTS_INVALID, 1);
        }
        self.metrics
            .record_histogram(metric_names::REPORT_ACCURACY, report.accuracy);
        self.metrics
            .record_histogram(metric_names::REPORT_LOSS, report.loss);
        telemetry::record_report_evaluated(report.accuracy, report.loss, valid);
    }
}

impl fmt::Debug for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Network")
            .field("members", &self.members)
            .field("policy", &self.policy)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

/// Assembles a [`Network`], rejecting empty and duplicate node ids.
pub struct NetworkBuilder {
    nodes: Vec<Node>,
    policy: ValidityPolicy,
    scope: NotifyScope,
    sink: Arc<dyn EventSink>,
    handler: Arc<dyn NotificationHandler>,
    metrics: Arc<MetricsStore>,
}

impl NetworkBuilder {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            policy: ValidityPolicy::default(),
            scope: NotifyScope::default(),
            sink: Arc::new(TracingSink),
            handler: Arc::new(NoopHandler),
            metrics: Arc::new(MetricsStore::new()),
        }
    }

    pub fn node(mut self, node: Node) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn nodes(mut self, nodes: impl IntoIterator<Item = Node>) -> Self {
        self.nodes.extend(nodes);
        self
    }

    pub fn policy(mut self, policy: ValidityPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn scope(mut self, scope: NotifyScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn handler(mut self, handler: Arc<dyn NotificationHandler>) -> Self {
        self.handler = handler;
        self
    }

    pub fn metrics(mut self, metrics: Arc<MetricsStore>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn build(self) -> Result<Network, NetworkError> {
        let mut index = HashMap::with_capacity(self.nodes.len());
        for (i, node) in self.nodes.iter().enumerate() {
            if node.id().is_empty() {
                return Err(NetworkError::EmptyNodeId);
            }
            if index.insert(node.id().to_string(), i).is_some() {
                return Err(NetworkError::DuplicateNode(node.id().to_string()));
            }
        }

        tracing::debug!(
            members = self.nodes.len(),
            scope = self.scope.as_str(),
            min_accuracy = self.policy.min_accuracy,
            max_loss = self.policy.max_loss,
            "Network assembled"
        );

        Ok(Network {
            members: self.nodes,
            index,
            policy: self.policy,
            scope: self.scope,
            sink: self.sink,
            handler: self.handler,
            metrics: self.metrics,
        })
    }
}

impl Default for NetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}
