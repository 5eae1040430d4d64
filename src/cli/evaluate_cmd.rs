// Copyright 2026 DMM-CORE Contributors
// SPDX-License-Identifier: Apache-2.0

//! Report evaluation commands: one-shot `evaluate` and streaming `watch`.

use std::io::{BufRead, Write};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{assemble_monitor, EXIT_CONFIG, EXIT_FAILURE, EXIT_OK};
use crate::config::EnvConfig;
use crate::events::TracingSink;
use crate::model::PerformanceReport;
use crate::network::{Network, ValidationOutcome};

/// Arguments of `evaluate`.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluateArgs {
    pub node: String,
    pub accuracy: f64,
    pub loss: f64,
}

/// Parse `--node ID --accuracy A --loss L`.
pub fn parse_evaluate_args(args: &[String]) -> Result<EvaluateArgs, String> {
    let mut node = None;
    let mut accuracy = None;
    let mut loss = None;

    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        let value = match flag {
            "--node" | "--accuracy" | "--loss" => args
                .get(i + 1)
                .ok_or_else(|| format!("Missing value for {}", flag))?,
            other => return Err(format!("Unknown argument: {}", other)),
        };
        match flag {
            "--node" => node = Some(value.clone()),
            "--accuracy" => {
                accuracy = Some(
                    value
                        .parse::<f64>()
                        .map_err(|_| format!("Invalid accuracy: {}", value))?,
                )
            }
            _ => {
                loss = Some(
                    value
                        .parse::<f64>()
                        .map_err(|_| format!("Invalid loss: {}", value))?,
                )
            }
        }
        i += 2;
    }

    match (node, accuracy, loss) {
        (Some(node), Some(accuracy), Some(loss)) => Ok(EvaluateArgs {
            node,
            accuracy,
            loss,
        }),
        _ => Err("Usage: dmm-core-cli evaluate --node <ID> --accuracy <A> --loss <L>".into()),
    }
}

/// Evaluate one report on a freshly started network.
///
/// Returns 0 if accepted, 1 if rejected or the input is bad, 2 if the
/// network cannot be assembled.
pub fn run_evaluate(config: &EnvConfig, args: &[String]) -> i32 {
    let args = match parse_evaluate_args(args) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}", e);
            return EXIT_FAILURE;
        }
    };

    let report = match PerformanceReport::checked(args.accuracy, args.loss) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Rejected input: {}", e);
            return EXIT_FAILURE;
        }
    };

    let mut monitor = match assemble_monitor(config, Arc::new(TracingSink)) {
        Ok(monitor) => monitor,
        Err(e) => {
            eprintln!("Failed to assemble network: {}", e);
            return EXIT_CONFIG;
        }
    };
    monitor.start_monitoring();

    match monitor.network().validate_performance(&args.node, &report) {
        Ok(ValidationOutcome::Accepted) => {
            println!("accepted");
            EXIT_OK
        }
        Ok(ValidationOutcome::Rejected {
            violations,
            fan_out,
        }) => {
            let violations = violations
                .iter()
                .map(|v| v.as_str())
                .collect::<Vec<_>>()
                .join(",");
            println!(
                "rejected: {} (notified {}, failed {})",
                violations,
                fan_out.delivered.len(),
                fan_out.failed.len()
            );
            EXIT_FAILURE
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            EXIT_FAILURE
        }
    }
}

/// One line of `watch` input.
#[derive(Debug, Clone, Deserialize)]
struct ReportLine {
    node: String,
    accuracy: f64,
    loss: f64,
}

/// Totals of one `watch` run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WatchSummary {
    pub lines: u64,
    pub accepted: u64,
    pub rejected: u64,
    pub malformed: u64,
}

/// Feed JSON-lines reports into `network` until EOF.
///
/// Each input line `{"node": "...", "accuracy": A, "loss": L}` yields one
/// JSON result line on `output`. Malformed lines are reported and skipped.
/// Blank lines and lines starting with `#` are ignored.
pub fn run_watch<R: BufRead, W: Write>(
    network: &Network,
    mut input: R,
    mut output: W,
) -> std::io::Result<WatchSummary> {
    let mut summary = WatchSummary::default();
    let mut buf = Vec::new();
    let mut line_no = 0usize;

    loop {
        buf.clear();
        if input.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        line_no += 1;

        let line = match std::str::from_utf8(&buf) {
            Ok(line) => line,
            Err(e) => {
                let error = format!("Invalid UTF-8: {}", e);
                tracing::warn!(line = line_no, error = %error, "Skipping malformed report");
                summary.lines += 1;
                summary.malformed += 1;
                writeln!(output, "{}", json!({ "line": line_no, "error": error }))?;
                continue;
            }
        };
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        summary.lines += 1;

        let parsed = serde_json::from_str::<ReportLine>(trimmed)
            .map_err(|e| e.to_string())
            .and_then(|r| {
                PerformanceReport::checked(r.accuracy, r.loss)
                    .map(|report| (r.node, report))
                    .map_err(|e| e.to_string())
            });

        let (node, report) = match parsed {
            Ok(pair) => pair,
            Err(error) => {
                tracing::warn!(line = line_no, error = %error, "Skipping malformed report");
                summary.malformed += 1;
                writeln!(output, "{}", json!({ "line": line_no, "error": error }))?;
                continue;
            }
        };

        let result = match network.validate_performance(&node, &report) {
            Ok(ValidationOutcome::Accepted) => {
                summary.accepted += 1;
                json!({ "line": line_no, "node": node, "verdict": "valid" })
            }
            Ok(ValidationOutcome::Rejected {
                violations,
                fan_out,
            }) => {
                summary.rejected += 1;
                json!({
                    "line": line_no,
                    "node": node,
                    "verdict": "invalid",
                    "violations": violations,
                    "notified": fan_out.delivered,
                    "failed": fan_out.failed.iter().map(|(id, _)| id).collect::<Vec<_>>(),
                })
            }
            Err(e) => {
                summary.malformed += 1;
                json!({ "line": line_no, "error": e.to_string() })
            }
        };
        writeln!(output, "{}", result)?;
    }

    Ok(summary)
}
