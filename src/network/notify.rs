//! Invalid-performance notices and receiver-side handling.
//!
//! The network guarantees that every member in scope is offered the notice,
//! in membership order. What a member does on receipt is up to the injected
//! [`NotificationHandler`]; the default handler does nothing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::node::Node;
use super::NodeId;

/// Notice delivered to each member when a model's performance is flagged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvalidPerformanceNotice {
    pub model_name: String,
    /// Reporting node, if the notice came from a node evaluation.
    pub origin: Option<NodeId>,
    pub issued_at: DateTime<Utc>,
}

impl InvalidPerformanceNotice {
    pub fn new(model_name: impl Into<String>, origin: Option<NodeId>) -> Self {
        Self {
            model_name: model_name.into(),
            origin,
            issued_at: Utc::now(),
        }
    }
}

/// Failure of a single member to take a notice.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("Node unreachable: {0}")]
    Unreachable(NodeId),

    #[error("Node {node} rejected notice: {reason}")]
    Rejected { node: NodeId, reason: String },
}

impl DeliveryError {
    /// Returns true if a later retry could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unreachable(_))
    }
}

/// Receiver-side reaction to an invalid-performance notice.
pub trait NotificationHandler: Send + Sync {
    fn on_invalid_performance(
        &self,
        recipient: &Node,
        notice: &InvalidPerformanceNotice,
    ) -> Result<(), DeliveryError>;
}

/// Accepts every notice without acting on it.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHandler;

impl NotificationHandler for NoopHandler {
    fn on_invalid_performance(
        &self,
        _recipient: &Node,
        _notice: &InvalidPerformanceNotice,
    ) -> Result<(), DeliveryError> {
        Ok(())
    }
}

/// Which members receive a notice raised by a node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotifyScope {
    /// Every member, the reporting node included.
    #[default]
    #[serde(rename = "all")]
    AllMembers,
    /// Every member except the reporting node.
    #[serde(rename = "exclude-origin")]
    ExcludeOrigin,
}

impl NotifyScope {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" | "all-members" => Some(Self::AllMembers),
            "exclude-origin" => Some(Self::ExcludeOrigin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AllMembers => "all",
            Self::ExcludeOrigin => "exclude-origin",
        }
    }
}

/// Outcome of one fan-out, in membership order.
#[derive(Debug, Clone, PartialEq)]
pub struct FanOutReport {
    pub model_name: String,
    pub delivered: Vec<NodeId>,
    /// Members left out by the notify scope.
    pub skipped: Vec<NodeId>,
    pub failed: Vec<(NodeId, DeliveryError)>,
}

impl FanOutReport {
    pub fn new(model_name: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            delivered: Vec::new(),
            skipped: Vec::new(),
            failed: Vec::new(),
        }
    }

    /// True if no in-scope member failed.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Members the handler was invoked for.
    pub fn attempted(&self) -> usize {
        self.delivered.len() + self.failed.len()
    }
}
