//! DMM-CORE: Decentralized Model Monitor
//!
//! A peer-based monitor tracking the performance of a named machine-learning
//! model across a set of cooperating nodes. Each node evaluates performance
//! reports against a validity policy and, when a report is invalid, notifies
//! every member of its network.
//!
//! # Design
//!
//! - **Single ownership**: a [`Network`] owns its [`Node`]s; nodes never hold
//!   a reference back to their network and receive it as an argument instead.
//! - **Injected effects**: events go to an [`EventSink`], receiver-side
//!   reactions to a [`NotificationHandler`]. Nothing prints directly.
//! - **Synchronous fan-out**: start and notify run member by member in
//!   insertion order on the caller's thread. A failing member never stops
//!   delivery to the rest.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use dmm_core::{
//!     DecentralizedModelMonitor, Model, Network, Node, PerformanceReport, RecordingSink,
//! };
//!
//! let model = Model::new("myModel", 1);
//! let sink = Arc::new(RecordingSink::new());
//! let network = Network::builder()
//!     .nodes(["node1", "node2", "node3"].map(|id| Node::new(id, model.clone())))
//!     .sink(sink.clone())
//!     .build()
//!     .unwrap();
//!
//! let mut monitor = DecentralizedModelMonitor::new("myModel", model, network);
//! monitor.start_monitoring();
//! assert_eq!(sink.len(), 3);
//!
//! let outcome = monitor
//!     .network()
//!     .validate_performance("node2", &PerformanceReport::new(0.5, 0.2))
//!     .unwrap();
//! assert!(!outcome.is_accepted());
//! ```

pub mod cli;
pub mod config;
pub mod events;
pub mod health;
pub mod model;
pub mod network;
pub mod policy;
pub mod telemetry;

mod monitor;

pub use events::{EventSink, FanoutSink, MonitorEvent, RecordingSink, TracingSink};
pub use model::{Model, PerformanceReport, ReportError};
pub use monitor::DecentralizedModelMonitor;
pub use network::{
    DeliveryError, FanOutReport, InvalidPerformanceNotice, Network, NetworkBuilder, NetworkError,
    NoopHandler, Node, NodeId, NodeState, NotificationHandler, NotifyScope, ValidationOutcome,
};
pub use policy::{ValidityPolicy, Violation};
