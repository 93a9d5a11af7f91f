// runコマンドハンドラー
//
// シードディレクトリの `*.sql` ファイルをデータベースに適用します。
// - 非追跡モード（デフォルト）: すべてのシードを毎回実行
// - 追跡モード（--track）: 台帳に記録済みのシードをスキップ
// いずれも1トランザクションで実行し、失敗時はすべてロールバックします。

use crate::adapters::seed_source::DirectorySource;
use crate::cli::command_context::CommandContext;
use crate::cli::commands::{render_output, CommandOutput};
use crate::cli::OutputFormat;
use crate::services::seed_runner::SeedRunner;
use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::debug;

/// 実行モード
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    Untracked,
    Tracked,
}

/// runコマンドの出力構造体
#[derive(Debug, Clone, Serialize)]
pub struct RunOutput {
    /// 実行モード
    pub mode: RunMode,
    /// 適用されたシード名（実行順）
    pub applied: Vec<String>,
    /// スキップされたシード名（追跡モードのみ）
    pub skipped: Vec<String>,
    /// 実行時間（ミリ秒）
    pub duration_ms: u128,
    /// メッセージ
    #[serde(skip)]
    pub message: String,
}

impl CommandOutput for RunOutput {
    fn to_text(&self) -> String {
        self.message.clone()
    }
}

/// runコマンドの入力パラメータ
#[derive(Debug, Clone)]
pub struct RunCommand {
    /// プロジェクトのルートパス
    pub project_path: PathBuf,
    /// カスタム設定ファイルパス
    pub config_path: Option<PathBuf>,
    /// シードディレクトリ
    pub dir: Option<PathBuf>,
    /// ドライバー名
    pub driver: Option<String>,
    /// 接続文字列
    pub dsn: Option<String>,
    /// 環境名
    pub env: String,
    /// 台帳で適用済みシードを追跡するか
    pub track: bool,
    /// サブディレクトリを探索しない
    pub no_recursive: bool,
    /// タイムアウト（秒）
    pub timeout: Option<u64>,
    /// 出力フォーマット
    pub format: OutputFormat,
}

/// runコマンドハンドラー
#[derive(Debug, Default)]
pub struct RunCommandHandler {}

impl RunCommandHandler {
    /// 新しいRunCommandHandlerを作成
    pub fn new() -> Self {
        Self {}
    }

    /// runコマンドを実行
    pub async fn execute(&self, command: &RunCommand) -> Result<String> {
        let context = CommandContext::load_with_config(
            command.project_path.clone(),
            command.config_path.clone(),
        )?;

        // 接続前に設定を検証する
        let seeds_dir = context.resolve_seeds_dir(command.dir.as_deref())?;
        let settings = context.resolve_connection(
            command.driver.as_deref(),
            command.dsn.as_deref(),
            &command.env,
        )?;
        let ledger = context.ledger(settings.dialect)?;

        let source = DirectorySource::new(&seeds_dir)
            .recursive(context.recursive() && !command.no_recursive);
        debug!(dir = %seeds_dir.display(), track = command.track, "Running seeds");

        let pool = context.connect_pool(&settings).await?;
        let mut runner = SeedRunner::new(pool.clone(), settings.dialect).with_ledger(ledger);
        if let Some(timeout) = command.timeout {
            runner = runner.with_timeout(Duration::from_secs(timeout));
        }

        let start = Instant::now();
        let result = if command.track {
            runner
                .run(&source)
                .await
                .map(|report| (RunMode::Tracked, report.applied, report.skipped))
        } else {
            runner.run_untracked(&source).await.map(|seeds| {
                let applied = seeds.iter().map(|s| s.name().to_string()).collect();
                (RunMode::Untracked, applied, Vec::new())
            })
        };
        pool.close().await;

        let (mode, applied, skipped) = result.with_context(|| "Seed run failed")?;
        let duration_ms = start.elapsed().as_millis();

        let message = self.generate_summary(&applied, &skipped, duration_ms);
        let output = RunOutput {
            mode,
            applied,
            skipped,
            duration_ms,
            message,
        };

        render_output(&output, &command.format)
    }

    /// 実行結果のサマリーを生成
    fn generate_summary(&self, applied: &[String], skipped: &[String], duration_ms: u128) -> String {
        let mut summary = String::from("=== Seed Run Complete ===\n");

        if applied.is_empty() && skipped.is_empty() {
            summary.push_str("No seeds found.\n");
            return summary;
        }

        summary.push_str(&format!("{} seed(s) applied", applied.len()));
        if !skipped.is_empty() {
            summary.push_str(&format!(", {} skipped", skipped.len()));
        }
        summary.push_str(":\n\n");

        for name in applied {
            summary.push_str(&format!("{} {}\n", "✓".green(), name));
        }
        for name in skipped {
            summary.push_str(&format!("{} {} (skipped)\n", "-".dimmed(), name));
        }

        summary.push_str(&format!("\nTotal execution time: {}ms\n", duration_ms));
        summary
    }
}
