use crate::adapter::inbound::cli::command::CheckConfigArgs;
use crate::adapter::inbound::cli::{config, output};
use crate::error::Result;

/// Validate the effective configuration without connecting.
pub fn execute(args: &CheckConfigArgs) -> Result<()> {
    let config = config::load(args.config.as_deref())?;
    config.validate()?;
    let config = config.redacted();

    if output::is_json() {
        output::json_value("config", serde_json::to_value(&config)?);
        return Ok(());
    }

    output::section("Configuration Check");
    match &args.config {
        Some(path) => output::field("Config", path.display()),
        None => output::field("Config", "(defaults and environment)"),
    }

    output::section("Database");
    output::field("Target", config.database.target());
    output::field("User", &config.database.user);
    output::field(
        "Password",
        if config.database.password.is_empty() {
            "(none)"
        } else {
            config.database.password.as_str()
        },
    );
    output::field(
        "Statement timeout",
        format!("{}ms", config.database.statement_timeout_ms),
    );
    output::field(
        "Connect timeout",
        format!("{}ms", config.database.connect_timeout_ms),
    );

    output::section("Workload");
    output::field("Table", &config.workload.table);
    output::field("Workers", config.workload.workers);
    output::field("Duration", format!("{}s", config.workload.duration_secs));
    output::field("Insert ratio", config.workload.insert_ratio);
    output::field(
        "Pause",
        format!(
            "{}..{}ms",
            config.workload.sleep_min_ms, config.workload.sleep_max_ms
        ),
    );
    output::field("Probe interval", format!("{}ms", config.probe.interval_ms));
    output::field(
        "Backoff",
        format!(
            "{}ms x{} up to {}ms",
            config.reconnection.initial_delay_ms,
            config.reconnection.backoff_multiplier,
            config.reconnection.max_delay_ms
        ),
    );

    output::success("Configuration is valid");
    Ok(())
}
