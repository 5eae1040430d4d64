//! DMM-CORE entry point.
//!
//! ## CLI Subcommands
//!
//! - `dmm-core-cli` or `dmm-core-cli run` - Start all configured nodes (default)
//! - `dmm-core-cli evaluate` - Evaluate one report on a node
//! - `dmm-core-cli watch` - Evaluate JSON-lines reports from stdin
//! - `dmm-core-cli status` - Health report (exit 0/1)
//! - `dmm-core-cli config` - Show, validate or print default configuration

use std::process::ExitCode;
use std::sync::Arc;

use dmm_core::cli::{self, config_cmd, EXIT_CONFIG, EXIT_FAILURE, EXIT_OK};
use dmm_core::config::{self as dmm_config, EnvConfig};
use dmm_core::health::{HealthChecker, HealthState};
use dmm_core::telemetry::init_logging;
use dmm_core::TracingSink;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("run");

    match command {
        "help" | "--help" | "-h" => {
            print_usage();
            return ExitCode::SUCCESS;
        }
        "version" | "--version" | "-V" => {
            println!("DMM-CORE {}", env!("CARGO_PKG_VERSION"));
            return ExitCode::SUCCESS;
        }
        _ => {}
    }

    // `config validate` reports load errors itself
    if command == "config" && args.get(2).map(|s| s.as_str()) == Some("validate") {
        return exit(config_cmd::run_validate());
    }

    let config = match dmm_config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return exit(EXIT_CONFIG);
        }
    };

    if let Err(e) = init_logging(&config.log) {
        eprintln!("Logging disabled: {}", e);
    }

    let code = match command {
        "run" | "" => run(&config),
        "evaluate" => cli::run_evaluate(&config, &args[2..]),
        "watch" => watch(&config),
        "status" => {
            let json_output = args.get(2).map(|s| s.as_str()) == Some("--json");
            cli::run_status(&config, json_output)
        }
        "config" => {
            let subcommand = args.get(2).map(|s| s.as_str()).unwrap_or("show");
            match subcommand {
                "show" => {
                    config_cmd::run_show(&config);
                    EXIT_OK
                }
                "defaults" => {
                    config_cmd::run_defaults();
                    EXIT_OK
                }
                _ => {
                    eprintln!("Unknown config subcommand: {}", subcommand);
                    EXIT_FAILURE
                }
            }
        }
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            EXIT_FAILURE
        }
    };

    exit(code)
}

fn exit(code: i32) -> ExitCode {
    ExitCode::from(code as u8)
}

/// Assemble the configured network, start every node and report health.
fn run(config: &EnvConfig) -> i32 {
    let mut monitor = match cli::assemble_monitor(config, Arc::new(TracingSink)) {
        Ok(monitor) => monitor,
        Err(e) => {
            eprintln!("Failed to assemble network: {}", e);
            return EXIT_CONFIG;
        }
    };
    monitor.start_monitoring();

    let report = HealthChecker::default().report(monitor.network());
    eprintln!(
        "Monitoring model {} on {}/{} nodes ({:?})",
        monitor.model_name(),
        report.monitoring,
        report.members,
        report.state
    );
    if report.state == HealthState::Healthy {
        EXIT_OK
    } else {
        EXIT_FAILURE
    }
}

/// Stream stdin reports into a started network, then print metrics.
fn watch(config: &EnvConfig) -> i32 {
    let mut monitor = match cli::assemble_monitor(config, Arc::new(TracingSink)) {
        Ok(monitor) => monitor,
        Err(e) => {
            eprintln!("Failed to assemble network: {}", e);
            return EXIT_CONFIG;
        }
    };
    monitor.start_monitoring();

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let summary = match cli::run_watch(monitor.network(), stdin.lock(), stdout.lock()) {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("I/O error: {}", e);
            return EXIT_FAILURE;
        }
    };

    let totals = serde_json::json!({
        "summary": summary,
        "metrics": monitor.network().metrics().snapshot(),
    });
    eprintln!("{}", totals);

    if summary.rejected == 0 && summary.malformed == 0 {
        EXIT_OK
    } else {
        EXIT_FAILURE
    }
}

fn print_usage() {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!(
        "DMM-CORE - Decentralized Model Monitor v{}

USAGE:
    dmm-core-cli [COMMAND] [OPTIONS]

COMMANDS:
    run          Start all configured nodes (default when no command given)
    evaluate     Evaluate one report: --node <ID> --accuracy <A> --loss <L>
    watch        Evaluate JSON-lines reports from stdin
    status       Show network health (--json for JSON output)
    config       Manage configuration (show, defaults, validate)
    version      Show version information
    help         Show this help message

EXAMPLES:
    dmm-core-cli evaluate --node node2 --accuracy 0.5 --loss 0.2
    echo '{{\"node\":\"node1\",\"accuracy\":0.95,\"loss\":0.05}}' | dmm-core-cli watch
    dmm-core-cli status --json
    DMM_NODE_COUNT=5 dmm-core-cli run

ENVIRONMENT:
    DMM_CONFIG         Path to a TOML configuration file
    DMM_MODEL_NAME     Model under observation (default: myModel)
    DMM_NODE_COUNT     Nodes to assemble (default: 3)
    DMM_MIN_ACCURACY   Accuracy threshold, exclusive (default: 0.9)
    DMM_MAX_LOSS       Loss threshold, exclusive (default: 0.1)
    DMM_NOTIFY_SCOPE   all | exclude-origin (default: all)
    DMM_LOG_FORMAT     json | pretty (default: json)
    DMM_LOG_LEVEL      Log filter (default: info)

EXIT CODES:
    0  Success / Healthy / Report accepted
    1  Failure / Unhealthy / Report rejected
    2  Configuration error
",
        version
    );
}
