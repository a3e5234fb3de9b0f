//! Command-line interface definitions.
//!
//! Defines the CLI structure for the pgfailover harness using `clap`. Flag
//! names follow the libpq/psql conventions; the underscore spellings of the
//! workload flags are accepted as aliases.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Failover resilience harness for PostgreSQL behind a pooler or proxy
#[derive(Parser, Debug)]
#[command(name = "pgfailover")]
#[command(version)]
pub struct Cli {
    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase output verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the workload against the target until the duration elapses or Ctrl+C
    Run(Box<RunArgs>),

    /// Run diagnostic checks
    #[command(subcommand)]
    Check(CheckCommand),
}

/// Subcommands for `pgfailover check`.
#[derive(Subcommand, Debug)]
pub enum CheckCommand {
    /// Validate the effective configuration and print it (password masked).
    Config(CheckConfigArgs),
    /// Open one session, run the liveness query and report the server version.
    Connection(CheckConnectionArgs),
}

/// Connection target overrides shared by `run` and `check connection`.
///
/// Unset flags fall back to the config file, then `PG*` environment
/// variables, then built-in defaults.
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    /// Pooler/proxy host.
    #[arg(long)]
    pub host: Option<String>,

    /// Pooler/proxy port.
    #[arg(long)]
    pub port: Option<u16>,

    /// Database name.
    #[arg(long = "db")]
    pub database: Option<String>,

    /// Database user.
    #[arg(long)]
    pub user: Option<String>,

    /// Database password (prefer PGPASSWORD).
    #[arg(long)]
    pub password: Option<String>,

    /// Per-session statement timeout in milliseconds.
    #[arg(long, alias = "statement_timeout_ms")]
    pub statement_timeout_ms: Option<u64>,
}

/// Arguments for `pgfailover run`.
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub target: TargetArgs,

    /// Test table name. Dropped at the end of the run.
    #[arg(long)]
    pub table: Option<String>,

    /// Number of concurrent workers.
    #[arg(long)]
    pub workers: Option<usize>,

    /// Run duration in seconds.
    #[arg(long)]
    pub duration: Option<u64>,

    /// Probability of an INSERT per operation (0..1).
    #[arg(long, alias = "insert_ratio")]
    pub insert_ratio: Option<f64>,

    /// Minimum pause between operations in milliseconds.
    #[arg(long, alias = "sleep_min_ms")]
    pub sleep_min_ms: Option<u64>,

    /// Maximum pause between operations in milliseconds.
    #[arg(long, alias = "sleep_max_ms")]
    pub sleep_max_ms: Option<u64>,

    /// Seed for a reproducible operation mix.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, alias = "log_level")]
    pub log_level: Option<String>,

    /// Use JSON log format instead of pretty-printed logs.
    #[arg(long)]
    pub json_logs: bool,
}

/// Arguments for `pgfailover check config`.
#[derive(Args, Debug, Clone, Default)]
pub struct CheckConfigArgs {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Arguments for `pgfailover check connection`.
#[derive(Args, Debug, Clone, Default)]
pub struct CheckConnectionArgs {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub target: TargetArgs,
}
