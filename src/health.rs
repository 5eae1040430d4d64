//! Health check support for the monitoring network.
//!
//! Summarizes membership state and fan-out reliability into a single
//! report suitable for probes and the CLI `status` command.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::network::{metric_names, Network};

/// Overall health status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthState {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Detailed health report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub state: HealthState,
    pub members: usize,
    pub monitoring: usize,
    pub idle: usize,
    pub reports_evaluated: u64,
    pub reports_invalid: u64,
    pub delivery_failures: u64,
    pub uptime_secs: u64,
}

/// Health check configuration.
#[derive(Debug, Clone)]
pub struct HealthConfig {
    /// Treat any idle member as degraded.
    pub require_all_monitoring: bool,
    /// Delivery failures tolerated before reporting degraded.
    pub max_delivery_failures: u64,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            require_all_monitoring: true,
            max_delivery_failures: 0,
        }
    }
}

/// Aggregates health information from a network.
pub struct HealthChecker {
    config: HealthConfig,
    start_time: Instant,
}

impl HealthChecker {
    pub fn new(config: HealthConfig) -> Self {
        Self {
            config,
            start_time: Instant::now(),
        }
    }

    /// Ready once the network has members and, if required, all of them
    /// are monitoring.
    pub fn is_ready(&self, network: &Network) -> bool {
        if network.is_empty() {
            return false;
        }
        !self.config.require_all_monitoring || network.monitoring_count() == network.len()
    }

    /// Generate full health report.
    pub fn report(&self, network: &Network) -> HealthReport {
        let metrics = network.metrics();
        let members = network.len();
        let monitoring = network.monitoring_count();
        let delivery_failures = metrics.counter(metric_names::NOTIFICATIONS_FAILED);

        HealthReport {
            state: self.compute_state(members, monitoring, delivery_failures),
            members,
            monitoring,
            idle: members - monitoring,
            reports_evaluated: metrics.counter(metric_names::REPORTS_EVALUATED),
            reports_invalid: metrics.counter(metric_names::REPORTS_INVALID),
            delivery_failures,
            uptime_secs: self.start_time.elapsed().as_secs(),
        }
    }

    fn compute_state(&self, members: usize, monitoring: usize, failures: u64) -> HealthState {
        if members == 0 {
            return HealthState::Unhealthy;
        }
        if self.config.require_all_monitoring && monitoring < members {
            return HealthState::Degraded;
        }
        if failures > self.config.max_delivery_failures {
            return HealthState::Degraded;
        }
        HealthState::Healthy
    }
}

impl Default for HealthChecker {
    fn default() -> Self {
        Self::new(HealthConfig::default())
    }
}
