// Copyright 2026 DMM-CORE Contributors
// SPDX-License-Identifier: Apache-2.0

//! Status command: start the configured network and print its health.

use std::sync::Arc;

use super::{assemble_monitor, EXIT_CONFIG, EXIT_FAILURE, EXIT_OK};
use crate::config::EnvConfig;
use crate::events::TracingSink;
use crate::health::{HealthChecker, HealthReport, HealthState};

/// Print the health report of a freshly started network.
///
/// Returns 0 if healthy, 1 otherwise, 2 if the network cannot be assembled.
pub fn run_status(config: &EnvConfig, json_output: bool) -> i32 {
    let checker = HealthChecker::default();
    let mut monitor = match assemble_monitor(config, Arc::new(TracingSink)) {
        Ok(monitor) => monitor,
        Err(e) => {
            eprintln!("Failed to assemble network: {}", e);
            return EXIT_CONFIG;
        }
    };
    monitor.start_monitoring();

    let report = checker.report(monitor.network());
    if json_output {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Failed to encode status: {}", e);
                return EXIT_FAILURE;
            }
        }
    } else {
        print_report(monitor.model_name(), &report);
    }

    if report.state == HealthState::Healthy {
        EXIT_OK
    } else {
        EXIT_FAILURE
    }
}

fn print_report(model_name: &str, report: &HealthReport) {
    println!("Model:             {}", model_name);
    println!("State:             {:?}", report.state);
    println!("Members:           {}", report.members);
    println!("Monitoring:        {}", report.monitoring);
    println!("Idle:              {}", report.idle);
    println!("Reports evaluated: {}", report.reports_evaluated);
    println!("Reports invalid:   {}", report.reports_invalid);
    println!("Delivery failures: {}", report.delivery_failures);
}
