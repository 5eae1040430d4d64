//! Membership error types.

use thiserror::Error;

use super::NodeId;

/// Errors raised while assembling or addressing a network.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("Duplicate node id in network: {0}")]
    DuplicateNode(NodeId),

    #[error("Unknown node: {0}")]
    UnknownNode(NodeId),

    #[error("Node id must not be empty")]
    EmptyNodeId,
}
