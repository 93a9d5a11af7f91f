use anyhow::{Context, Result};
use clap::Parser;
use colored::control as color_control;
use geeder::cli::commands::run::{RunCommand, RunCommandHandler};
use geeder::cli::commands::status::{StatusCommand, StatusCommandHandler};
use geeder::cli::{Cli, Commands};
use std::env;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    sqlx::any::install_default_drivers();

    // CLIをパースして実行
    let cli = Cli::parse();

    if cli.no_color {
        color_control::set_override(false);
    }
    init_tracing(cli.verbose, cli.no_color);

    // 非同期ランタイムを作成して実行
    let runtime = tokio::runtime::Runtime::new()
        .context("Failed to create Tokio runtime")
        .unwrap_or_else(|e| {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        });

    let result = runtime.block_on(run_command(cli));

    match result {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

/// ログ出力を初期化（標準エラー出力）
///
/// RUST_LOG が未設定の場合は warn、--verbose 指定時は info。
fn init_tracing(verbose: bool, no_color: bool) {
    let default_level = if verbose { "info" } else { "warn" };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_ansi(!no_color)
        .init();
}

/// コマンドを実行する
async fn run_command(cli: Cli) -> Result<String> {
    // プロジェクトのルートパスを取得
    let project_path = env::current_dir()?;
    let config_path = cli.config;

    match cli.command {
        Commands::Run {
            dir,
            connection,
            track,
            no_recursive,
            timeout,
        } => {
            let handler = RunCommandHandler::new();
            let command = RunCommand {
                project_path,
                config_path,
                dir,
                driver: connection.driver,
                dsn: connection.dsn,
                env: connection.env,
                track,
                no_recursive,
                timeout,
                format: cli.format,
            };
            handler.execute(&command).await
        }

        Commands::Status { connection } => {
            let handler = StatusCommandHandler::new();
            let command = StatusCommand {
                project_path,
                config_path,
                driver: connection.driver,
                dsn: connection.dsn,
                env: connection.env,
                format: cli.format,
            };
            handler.execute(&command).await
        }
    }
}
