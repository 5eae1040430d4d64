//! Validity policy for performance reports.
//!
//! A report is acceptable iff `accuracy > min_accuracy` AND
//! `loss < max_loss`. Both comparisons are strict, so boundary values are
//! invalid. NaN compares false on both sides and is therefore invalid too.

use serde::{Deserialize, Serialize};

use crate::model::PerformanceReport;

/// Default accuracy threshold (exclusive lower bound).
pub const DEFAULT_MIN_ACCURACY: f64 = 0.9;

/// Default loss threshold (exclusive upper bound).
pub const DEFAULT_MAX_LOSS: f64 = 0.1;

/// Which condition of the policy a report failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Violation {
    AccuracyTooLow,
    LossTooHigh,
}

impl Violation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AccuracyTooLow => "accuracy_too_low",
            Self::LossTooHigh => "loss_too_high",
        }
    }
}

/// Threshold policy deciding whether a report is acceptable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidityPolicy {
    pub min_accuracy: f64,
    pub max_loss: f64,
}

impl Default for ValidityPolicy {
    fn default() -> Self {
        Self {
            min_accuracy: DEFAULT_MIN_ACCURACY,
            max_loss: DEFAULT_MAX_LOSS,
        }
    }
}

impl ValidityPolicy {
    pub fn new(min_accuracy: f64, max_loss: f64) -> Self {
        Self {
            min_accuracy,
            max_loss,
        }
    }

    /// Pure, total check of a single report.
    pub fn is_valid(&self, report: &PerformanceReport) -> bool {
        report.accuracy > self.min_accuracy && report.loss < self.max_loss
    }

    /// Conditions the report failed, in policy order. Empty iff valid.
    pub fn violations(&self, report: &PerformanceReport) -> Vec<Violation> {
        let mut failed = Vec::with_capacity(2);
        if !(report.accuracy > self.min_accuracy) {
            failed.push(Violation::AccuracyTooLow);
        }
        if !(report.loss < self.max_loss) {
            failed.push(Violation::LossTooHigh);
        }
        failed
    }
}
