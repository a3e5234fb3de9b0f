//! Effective configuration for CLI commands.
//!
//! Precedence, lowest first: built-in defaults, the TOML file, `PG*`
//! environment variables, command-line flags.

use std::path::Path;

use crate::adapter::inbound::cli::command::{RunArgs, TargetArgs};
use crate::error::Result;
use crate::infrastructure::config::Config;

/// Load the file (if any) and apply the process environment.
pub fn load(path: Option<&Path>) -> Result<Config> {
    let mut config = Config::load_or_default(path)?;
    config.apply_env(|key| std::env::var(key).ok())?;
    Ok(config)
}

/// Apply connection flags.
pub fn apply_target(config: &mut Config, target: &TargetArgs) {
    let database = &mut config.database;
    if let Some(host) = &target.host {
        database.host.clone_from(host);
    }
    if let Some(port) = target.port {
        database.port = port;
    }
    if let Some(name) = &target.database {
        database.name.clone_from(name);
    }
    if let Some(user) = &target.user {
        database.user.clone_from(user);
    }
    if let Some(password) = &target.password {
        database.password.clone_from(password);
    }
    if let Some(timeout) = target.statement_timeout_ms {
        database.statement_timeout_ms = timeout;
    }
}

/// Apply every `run` flag, connection flags included.
pub fn apply_run(config: &mut Config, args: &RunArgs) {
    apply_target(config, &args.target);

    let workload = &mut config.workload;
    if let Some(table) = &args.table {
        workload.table.clone_from(table);
    }
    if let Some(workers) = args.workers {
        workload.workers = workers;
    }
    if let Some(duration) = args.duration {
        workload.duration_secs = duration;
    }
    if let Some(ratio) = args.insert_ratio {
        workload.insert_ratio = ratio;
    }
    if let Some(min) = args.sleep_min_ms {
        workload.sleep_min_ms = min;
    }
    if let Some(max) = args.sleep_max_ms {
        workload.sleep_max_ms = max;
    }
    if args.seed.is_some() {
        workload.seed = args.seed;
    }

    if let Some(level) = &args.log_level {
        config.logging.level = normalize_level(level);
    }
    if args.json_logs {
        config.logging.format = "json".to_string();
    }
}

/// Accept `DEBUG`/`WARNING` style levels as well as tracing's own names.
pub fn normalize_level(level: &str) -> String {
    match level.trim().to_ascii_lowercase().as_str() {
        "warning" => "warn".to_string(),
        "critical" | "fatal" => "error".to_string(),
        other => other.to_string(),
    }
}
