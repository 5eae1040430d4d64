// Copyright 2026 DMM-CORE Contributors
// SPDX-License-Identifier: Apache-2.0

//! CLI module for DMM-CORE commands.
//!
//! Every command assembles an in-process network from configuration, so no
//! running server is required.
//!
//! ## Usage
//!
//! ```bash
//! dmm-core-cli run                                        # start all nodes
//! dmm-core-cli evaluate --node node2 --accuracy 0.5 --loss 0.2
//! dmm-core-cli watch < reports.jsonl                      # JSON-lines feed
//! dmm-core-cli status --json                              # health report
//! ```

pub mod config_cmd;
pub mod evaluate_cmd;
pub mod status;

use std::sync::Arc;

use crate::config::EnvConfig;
use crate::events::EventSink;
use crate::model::Model;
use crate::network::{Network, NetworkError, Node};
use crate::DecentralizedModelMonitor;

pub use evaluate_cmd::{run_evaluate, run_watch, WatchSummary};
pub use status::run_status;

/// Exit code for success / healthy / accepted.
pub const EXIT_OK: i32 = 0;
/// Exit code for failure / unhealthy / rejected.
pub const EXIT_FAILURE: i32 = 1;
/// Exit code for configuration errors.
pub const EXIT_CONFIG: i32 = 2;

/// Ids of the nodes the CLI assembles: `node1..=nodeN`.
pub fn node_ids(count: usize) -> Vec<String> {
    (1..=count).map(|i| format!("node{}", i)).collect()
}

/// Build a monitor whose nodes all share the configured model.
pub fn assemble_monitor(
    config: &EnvConfig,
    sink: Arc<dyn EventSink>,
) -> Result<DecentralizedModelMonitor, NetworkError> {
    let model = Model::new(config.model.name.clone(), config.model.version);
    let nodes = node_ids(config.network.node_count)
        .into_iter()
        .map(|id| Node::new(id, model.clone()));

    let network = Network::builder()
        .nodes(nodes)
        .policy(config.policy)
        .scope(config.network.notify_scope)
        .sink(sink)
        .build()?;

    Ok(DecentralizedModelMonitor::new(
        config.model.name.clone(),
        model,
        network,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::RecordingSink;

    #[test]
    fn test_node_ids() {
        assert_eq!(node_ids(3), vec!["node1", "node2", "node3"]);
        assert!(node_ids(0).is_empty());
    }

    #[test]
    fn test_assemble_from_default_config() {
        let sink = Arc::new(RecordingSink::new());
        let mut monitor = assemble_monitor(&EnvConfig::default(), sink.clone()).unwrap();
        assert_eq!(monitor.model_name(), "myModel");
        assert_eq!(monitor.network().len(), 3);

        monitor.start_monitoring();
        assert_eq!(sink.len(), 3);
        assert_eq!(monitor.network().monitoring_count(), 3);
    }
}
