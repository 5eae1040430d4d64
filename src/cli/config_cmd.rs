// Copyright 2026 DMM-CORE Contributors
// SPDX-License-Identifier: Apache-2.0

//! Config CLI subcommands: show, defaults, validate.

use crate::config::{self, EffectiveConfig, EnvConfig};

use super::{EXIT_CONFIG, EXIT_OK};

/// Print effective config as key-value pairs to stdout.
pub fn run_show(config: &EnvConfig) {
    print_config(&config.effective_config());
}

/// Print default config values (no file or env overrides) to stdout.
pub fn run_defaults() {
    print_config(&EnvConfig::default().effective_config());
}

/// Load and validate configuration.
///
/// Returns 0 if valid, 2 on any error.
pub fn run_validate() -> i32 {
    let config = match config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            return EXIT_CONFIG;
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("ERROR: {}", e);
        return EXIT_CONFIG;
    }

    if config.policy.min_accuracy >= 1.0 {
        eprintln!("WARNING: DMM_MIN_ACCURACY is 1.0; every report will be rejected");
    }
    if config.policy.max_loss == 0.0 {
        eprintln!("WARNING: DMM_MAX_LOSS is 0; every report will be rejected");
    }

    println!("Configuration is valid.");
    EXIT_OK
}

fn print_config(cfg: &EffectiveConfig) {
    println!("DMM_MODEL_NAME={}", cfg.model_name);
    println!("DMM_MODEL_VERSION={}", cfg.model_version);
    println!("DMM_NODE_COUNT={}", cfg.node_count);
    println!("DMM_MIN_ACCURACY={}", cfg.min_accuracy);
    println!("DMM_MAX_LOSS={}", cfg.max_loss);
    println!("DMM_NOTIFY_SCOPE={}", cfg.notify_scope);
    println!("DMM_LOG_FORMAT={}", cfg.log_format);
    println!("DMM_LOG_LEVEL={}", cfg.log_level);
    println!("DMM_LOG_FILE={}", cfg.log_file.as_deref().unwrap_or(""));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::{clear_env_vars, ENV_LOCK};
    use std::io::Write;

    #[test]
    fn test_validate_passes_with_defaults() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env_vars();
        assert_eq!(run_validate(), EXIT_OK, "default config should pass validation");
    }

    #[test]
    fn test_validate_fails_on_bad_file() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env_vars();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[policy]\nmax_loss = -1.0\n").unwrap();
        std::env::set_var("DMM_CONFIG", file.path());
        assert_eq!(run_validate(), EXIT_CONFIG);
        clear_env_vars();
    }

    #[test]
    fn test_validate_fails_on_missing_file() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env_vars();
        std::env::set_var("DMM_CONFIG", "/nonexistent/dmm.toml");
        assert_eq!(run_validate(), EXIT_CONFIG);
        clear_env_vars();
    }

    #[test]
    fn test_print_config_smoke() {
        // Smoke-test: just call without panicking.
        run_defaults();
        run_show(&EnvConfig::default());
    }
}
