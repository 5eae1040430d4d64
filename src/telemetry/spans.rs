//! Span utilities for report evaluation tracing.

use tracing::{info_span, Span};

use crate::model::PerformanceReport;

/// Extension trait for recording evaluation results into a span.
pub trait SpanExt {
    /// Record the policy verdict into the span.
    fn record_verdict(&self, valid: bool);
}

impl SpanExt for Span {
    fn record_verdict(&self, valid: bool) {
        self.record("verdict", if valid { "valid" } else { "invalid" });
    }
}

/// Factory for creating standardized evaluation spans.
pub struct EvaluationSpan;

impl EvaluationSpan {
    /// Create a new evaluation span.
    ///
    /// Fields included:
    /// - `evaluation_id`: Fresh UUID correlating logs of one evaluation
    /// - `node_id`: Node performing the evaluation
    /// - `model`: Model name the report belongs to
    /// - `accuracy` / `loss`: The reported values
    /// - `verdict`: To be filled in by `SpanExt::record_verdict`
    pub fn new(node_id: &str, model: &str, report: &PerformanceReport) -> Span {
        info_span!(
            "evaluation",
            evaluation_id = %uuid::Uuid::new_v4(),
            node_id = %node_id,
            model = %model,
            accuracy = report.accuracy,
            loss = report.loss,
            verdict = tracing::field::Empty,
        )
    }
}
