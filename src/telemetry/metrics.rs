//! `metrics` facade recorders.
//!
//! These are no-ops until the embedding process installs a recorder.

use ::metrics::{counter, gauge, histogram};

/// Record one policy evaluation.
pub fn record_report_evaluated(accuracy: f64, loss: f64, valid: bool) {
    counter!("dmm_reports_evaluated_total").increment(1);
    if !valid {
        counter!("dmm_reports_invalid_total").increment(1);
    }
    histogram!("dmm_report_accuracy").record(accuracy);
    histogram!("dmm_report_loss").record(loss);
}

/// Record the result of one invalid-performance fan-out.
pub fn record_fan_out(delivered: usize, failed: usize) {
    counter!("dmm_notifications_delivered_total").increment(delivered as u64);
    counter!("dmm_notifications_failed_total").increment(failed as u64);
}

pub fn record_node_started() {
    counter!("dmm_nodes_started_total").increment(1);
}

pub fn record_nodes_monitoring(count: usize) {
    gauge!("dmm_nodes_monitoring").set(count as f64);
}
