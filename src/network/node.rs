//! A single monitoring participant.
//!
//! A node holds no reference to the network that contains it. Operations
//! with network-wide effects take the [`Network`] as an argument.

use serde::{Deserialize, Serialize};

use super::notify::FanOutReport;
use super::{Network, NodeId};
use crate::events::{EventSink, MonitorEvent};
use crate::model::{Model, PerformanceReport};
use crate::policy::Violation;
use crate::telemetry::{EvaluationSpan, SpanExt};

/// Node lifecycle. There is no transition back to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeState {
    Idle,
    Monitoring,
}

/// Result of evaluating one report on a node.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome {
    /// Report met the policy; nothing was emitted.
    Accepted,
    /// Report failed the policy and the network was notified.
    Rejected {
        violations: Vec<Violation>,
        fan_out: FanOutReport,
    },
}

impl ValidationOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }

    pub fn fan_out(&self) -> Option<&FanOutReport> {
        match self {
            Self::Accepted => None,
            Self::Rejected { fan_out, .. } => Some(fan_out),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,
    model: Model,
    state: NodeState,
}

impl Node {
    pub fn new(id: impl Into<NodeId>, model: Model) -> Self {
        Self {
            id: id.into(),
            model,
            state: NodeState::Idle,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn state(&self) -> NodeState {
        self.state
    }

    pub fn is_monitoring(&self) -> bool {
        self.state == NodeState::Monitoring
    }

    /// Enter the monitoring state for `model` and emit a start event.
    ///
    /// Repeat calls are not deduplicated: each one emits its own event.
    pub fn start_monitoring(&mut self, model: &Model, sink: &dyn EventSink) {
        if !self.model.same_model(model) {
            tracing::warn!(
                node_id = %self.id,
                own_model = %self.model.name,
                requested_model = %model.name,
                "Node asked to monitor a model it was not assigned"
            );
        }
        self.state = NodeState::Monitoring;
        sink.emit(&MonitorEvent::NodeStarted {
            node_id: self.id.clone(),
            model_name: model.name.clone(),
        });
    }

    /// Evaluate `report` against the network's policy.
    ///
    /// An invalid report emits an invalid-performance event and then
    /// notifies the network exactly once, naming this node's model.
    pub fn validate_performance(
        &self,
        report: &PerformanceReport,
        network: &Network,
    ) -> ValidationOutcome {
        let span = EvaluationSpan::new(&self.id, &self.model.name, report);
        let _enter = span.enter();

        if self.state == NodeState::Idle {
            tracing::debug!(node_id = %self.id, "Evaluating report on idle node");
        }

        let policy = network.policy();
        let valid = policy.is_valid(report);
        network.record_evaluation(report, valid);
        span.record_verdict(valid);

        if valid {
            return ValidationOutcome::Accepted;
        }

        let violations = policy.violations(report);
        network.sink().emit(&MonitorEvent::InvalidPerformance {
            node_id: self.id.clone(),
            model_name: self.model.name.clone(),
            accuracy: report.accuracy,
            loss: report.loss,
            violations: violations.clone(),
        });

        let fan_out = network.notify_invalid_performance_from(&self.id, &self.model.name);
        ValidationOutcome::Rejected {
            violations,
            fan_out,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::RecordingSink;

    #[test]
    fn test_new_node_is_idle() {
        let node = Node::new("node1", Model::new("myModel", 1));
        assert_eq!(node.id(), "node1");
        assert_eq!(node.model().name, "myModel");
        assert_eq!(node.state(), NodeState::Idle);
        assert!(!node.is_monitoring());
    }

    #[test]
    fn test_start_transitions_and_emits() {
        let sink = RecordingSink::new();
        let model = Model::new("myModel", 1);
        let mut node = Node::new("node1", model.clone());

        node.start_monitoring(&model, &sink);
        assert!(node.is_monitoring());
        assert_eq!(
            sink.events(),
            vec![MonitorEvent::NodeStarted {
                node_id: "node1".to_string(),
                model_name: "myModel".to_string(),
            }]
        );
    }

    #[test]
    fn test_repeat_start_emits_twice() {
        let sink = RecordingSink::new();
        let model = Model::new("myModel", 1);
        let mut node = Node::new("node1", model.clone());

        node.start_monitoring(&model, &sink);
        node.start_monitoring(&model, &sink);
        assert_eq!(sink.len(), 2);
        assert_eq!(node.state(), NodeState::Monitoring);
    }

    #[test]
    fn test_outcome_accessors() {
        assert!(ValidationOutcome::Accepted.is_accepted());
        assert!(ValidationOutcome::Accepted.fan_out().is_none());

        let rejected = ValidationOutcome::Rejected {
            violations: vec![Violation::LossTooHigh],
            fan_out: FanOutReport::new("myModel"),
        };
        assert!(!rejected.is_accepted());
        assert_eq!(rejected.fan_out().map(|f| f.model_name.as_str()), Some("myModel"));
    }
}
