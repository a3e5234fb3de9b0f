//! Handler for the `run` command.

use std::sync::Arc;

use tracing::{info, warn};

use crate::adapter::inbound::cli::command::RunArgs;
use crate::adapter::inbound::cli::{config, output};
use crate::adapter::outbound::postgres::PgConnector;
use crate::application::Orchestrator;
use crate::domain::StopReason;
use crate::error::Result;
use crate::infrastructure::config::Config;

/// Execute the run command.
pub async fn execute(args: &RunArgs) -> Result<()> {
    let config = build_config(args, output::is_json())?;
    config.init_logging();

    print_startup_config(&config);

    let connector = Arc::new(PgConnector::new(config.database.connection_params()));
    let orchestrator = Orchestrator::new(config, connector);

    let stop = orchestrator.stop_signal();
    let watcher = tokio::spawn(async move {
        shutdown_signal().await;
        if stop.trigger(StopReason::Interrupted) {
            info!("Shutdown signal received, stopping run");
        }
    });

    let result = orchestrator.run().await;
    watcher.abort();

    let summary = result?;
    output::summary(&summary);
    Ok(())
}

fn build_config(args: &RunArgs, force_json_logs: bool) -> Result<Config> {
    let mut config = config::load(args.config.as_deref())?;
    config::apply_run(&mut config, args);
    if force_json_logs {
        config.logging.format = "json".to_string();
    }
    config.validate()?;
    Ok(config)
}

/// Resolve on Ctrl+C or, on unix, SIGTERM.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = terminate.recv() => {}
                }
                return;
            }
            Err(e) => warn!(error = %e, "Failed to install SIGTERM handler"),
        }
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}

fn print_startup_config(config: &Config) {
    let workload = &config.workload;
    output::header(env!("CARGO_PKG_VERSION"));
    output::field("Target", config.database.target());
    output::field("User", &config.database.user);
    output::field("Table", &workload.table);
    output::field("Workers", workload.workers);
    output::field("Duration", format!("{}s", workload.duration_secs));
    output::field("Insert ratio", workload.insert_ratio);
    if output::verbosity() > 0 {
        output::field(
            "Pause",
            format!("{}..{}ms", workload.sleep_min_ms, workload.sleep_max_ms),
        );
        output::field(
            "Statement timeout",
            format!("{}ms", config.database.statement_timeout_ms),
        );
        if let Some(seed) = workload.seed {
            output::field("Seed", seed);
        }
    }
    output::note(&format!(
        "The table {} is dropped at the end of the run",
        workload.table
    ));
}
