//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// dbmigrate - apply ordered SQL and CQL migrations exactly once
#[derive(Parser, Debug)]
#[command(name = "dbmigrate")]
#[command(version)]
#[command(about = "dbmigrate - apply ordered SQL and CQL migrations exactly once", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the configuration file [default: dbmigrate.toml, read if present]
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Apply pending migrations in name order
    Up(UpArgs),

    /// Show applied and pending migrations
    Status(ConnectionArgs),

    /// Display version information
    Version,
}

/// Connection and directory options shared by `up` and `status`
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// Directory holding the migration files
    #[arg(short, long)]
    pub dir: Option<PathBuf>,

    /// Database connection URL
    #[arg(short, long, env = "DATABASE_URL", hide_env_values = true)]
    pub url: Option<String>,

    /// Separate URL for bookkeeping reads (scylladb only)
    #[arg(long)]
    pub reader_url: Option<String>,

    /// Database provider
    #[arg(short, long)]
    pub provider: Option<DatabaseProvider>,

    /// Bookkeeping table name
    #[arg(short, long)]
    pub table: Option<String>,
}

/// Arguments for the `up` command
#[derive(Args, Debug, Clone, Default)]
pub struct UpArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// List the migrations that would run without applying them
    #[arg(long)]
    pub dry_run: bool,

    /// Run each migration outside a transaction (postgresql only)
    #[arg(long)]
    pub no_transaction: bool,
}

/// Supported database providers
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DatabaseProvider {
    #[default]
    Postgresql,
    #[value(alias = "scylla", alias = "cassandra")]
    Scylladb,
}

impl std::fmt::Display for DatabaseProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatabaseProvider::Postgresql => write!(f, "postgresql"),
            DatabaseProvider::Scylladb => write!(f, "scylladb"),
        }
    }
}

impl std::str::FromStr for DatabaseProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Self as ValueEnum>::from_str(s, true)
            .map_err(|_| format!("unknown provider '{s}' (expected postgresql or scylladb)"))
    }
}
