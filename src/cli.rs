// CLI Layer
// ユーザー入力の受付とコマンドルーティング

pub mod command_context;
pub mod commands;

use crate::core::naming;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// 出力フォーマット
#[derive(Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output (default)
    #[default]
    Text,
    /// Structured JSON output
    Json,
}

/// Geeder - Database Seed Runner
///
/// Apply SQL seed files to PostgreSQL, MySQL and SQLite databases.
#[derive(Parser, Debug)]
#[command(name = "geeder")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Database seed runner")]
#[command(long_about = "Geeder - Database Seed Runner

Executes SQL seed files against a database inside a single transaction.

Geeder can:
  • Run every *.sql file in a directory, sorted by file name
  • Track applied seeds in a ledger table and skip them on later runs
  • Show which seeds have been applied and when

Supported databases: PostgreSQL, MySQL, SQLite")]
#[command(propagate_version = true)]
#[command(after_help = "GETTING STARTED:
  1. Put seed files in a directory:   seeds/001_users.sql, seeds/002_products.sql
  2. Run all seeds:                    geeder run --dir seeds --driver sqlite --dsn app.db
  3. Run only new seeds:               geeder run --dir seeds --dsn postgres://... --track
  4. Check applied seeds:              geeder status --dsn postgres://...

For detailed help on each command, use: geeder <command> --help")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Output format (text or json)
    #[arg(long, global = true, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// データベース接続オプション（run/status共通）
#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// Database driver (postgresql, mysql, sqlite)
    #[arg(long, value_name = "NAME", env = naming::ENV_DRIVER)]
    pub driver: Option<String>,

    /// Database connection string
    #[arg(long, value_name = "DSN", env = naming::ENV_DSN, hide_env_values = true)]
    pub dsn: Option<String>,

    /// Target environment in the config file
    #[arg(short, long, value_name = "ENV", default_value = naming::DEFAULT_ENV)]
    pub env: String,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run seed files against the database
    ///
    /// Executes every *.sql file in the seed directory, ordered by file name,
    /// inside one transaction. If any seed fails, nothing is applied.
    ///
    /// EXAMPLES:
    ///   # Run all seeds against a SQLite file
    ///   geeder run --dir seeds --driver sqlite --dsn app.db
    ///
    ///   # Skip seeds that were already applied
    ///   geeder run --dir seeds --dsn postgres://localhost/app --track
    ///
    ///   # Use the production environment from .geeder.yaml
    ///   geeder run --env production --timeout 30
    Run {
        /// Directory containing *.sql seed files
        #[arg(short, long, value_name = "DIR", env = naming::ENV_DIR)]
        dir: Option<PathBuf>,

        #[command(flatten)]
        connection: ConnectionArgs,

        /// Record applied seeds and skip them on later runs
        #[arg(long)]
        track: bool,

        /// Only read files directly under the seed directory
        #[arg(long)]
        no_recursive: bool,

        /// Timeout for the whole run (in seconds)
        #[arg(long, value_name = "SECONDS")]
        timeout: Option<u64>,
    },

    /// Show applied seeds
    ///
    /// Lists the seeds recorded in the ledger table, oldest first.
    ///
    /// EXAMPLES:
    ///   # Show status for development
    ///   geeder status
    ///
    ///   # Show status for a specific database
    ///   geeder status --dsn postgres://localhost/app
    Status {
        #[command(flatten)]
        connection: ConnectionArgs,
    },
}
