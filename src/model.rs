//! Model identity and performance observations.
//!
//! Both types are plain data. The core only reads a model by name and
//! version; training and inference happen elsewhere.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The model under observation.
///
/// Identity is by `name`; `version` is informational.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Model {
    pub name: String,
    pub version: u32,
}

impl Model {
    pub fn new(name: impl Into<String>, version: u32) -> Self {
        Self {
            name: name.into(),
            version,
        }
    }

    /// True if both values refer to the same model, ignoring version.
    pub fn same_model(&self, other: &Model) -> bool {
        self.name == other.name
    }
}

/// Errors raised when a report is built from untrusted input.
#[derive(Debug, Error, PartialEq)]
pub enum ReportError {
    #[error("Non-finite {field} value")]
    NonFinite { field: &'static str },

    #[error("Accuracy out of range [0, 1]: {0}")]
    AccuracyOutOfRange(f64),

    #[error("Loss must be non-negative: {0}")]
    NegativeLoss(f64),
}

/// One observation of model performance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub accuracy: f64,
    pub loss: f64,
}

impl PerformanceReport {
    /// Build a report without range checks.
    pub fn new(accuracy: f64, loss: f64) -> Self {
        Self { accuracy, loss }
    }

    /// Build a report, rejecting NaN/infinite values, accuracy outside
    /// `[0, 1]` and negative loss.
    pub fn checked(accuracy: f64, loss: f64) -> Result<Self, ReportError> {
        if !accuracy.is_finite() {
            return Err(ReportError::NonFinite { field: "accuracy" });
        }
        if !loss.is_finite() {
            return Err(ReportError::NonFinite { field: "loss" });
        }
        if !(0.0..=1.0).contains(&accuracy) {
            return Err(ReportError::AccuracyOutOfRange(accuracy));
        }
        if loss < 0.0 {
            return Err(ReportError::NegativeLoss(loss));
        }
        Ok(Self { accuracy, loss })
    }
}
