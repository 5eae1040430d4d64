//! Top-level orchestrator binding one model to one network.

use crate::model::Model;
use crate::network::Network;

/// Binds a model and a network under a human-readable label and starts the
/// monitoring lifecycle.
#[derive(Debug)]
pub struct DecentralizedModelMonitor {
    model_name: String,
    model: Model,
    network: Network,
}

impl DecentralizedModelMonitor {
    pub fn new(model_name: impl Into<String>, model: Model, network: Network) -> Self {
        Self {
            model_name: model_name.into(),
            model,
            network,
        }
    }

    /// Start every member of the network on this monitor's model.
    pub fn start_monitoring(&mut self) {
        tracing::debug!(
            label = %self.model_name,
            model = %self.model.name,
            version = self.model.version,
            members = self.network.len(),
            "Starting model monitor"
        );
        self.network.start_monitoring(&self.model);
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn network(&self) -> &Network {
        &self.network
    }
}
