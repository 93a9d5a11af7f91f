// statusコマンドハンドラー
//
// 台帳テーブルに記録された適用済みシードを一覧表示します。

use crate::cli::command_context::CommandContext;
use crate::cli::commands::{render_output, CommandOutput};
use crate::cli::OutputFormat;
use crate::core::seed::LedgerEntry;
use crate::services::status_reporter::StatusReporter;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;

/// statusコマンドの出力構造体
#[derive(Debug, Clone, Serialize)]
pub struct StatusOutput {
    /// 台帳テーブル名
    pub ledger_table: String,
    /// 適用済みシード（実行日時の昇順）
    pub seeds: Vec<LedgerEntry>,
    /// 適用済みシード数
    pub total: usize,
    /// テキスト出力メッセージ
    #[serde(skip)]
    pub text_message: String,
}

impl CommandOutput for StatusOutput {
    fn to_text(&self) -> String {
        self.text_message.clone()
    }
}

/// statusコマンドの入力パラメータ
#[derive(Debug, Clone)]
pub struct StatusCommand {
    /// プロジェクトのルートパス
    pub project_path: PathBuf,
    /// カスタム設定ファイルパス
    pub config_path: Option<PathBuf>,
    /// ドライバー名
    pub driver: Option<String>,
    /// 接続文字列
    pub dsn: Option<String>,
    /// 環境名
    pub env: String,
    /// 出力フォーマット
    pub format: OutputFormat,
}

/// statusコマンドハンドラー
#[derive(Debug, Default)]
pub struct StatusCommandHandler {}

impl StatusCommandHandler {
    /// 新しいStatusCommandHandlerを作成
    pub fn new() -> Self {
        Self {}
    }

    /// statusコマンドを実行
    pub async fn execute(&self, command: &StatusCommand) -> Result<String> {
        let context = CommandContext::load_with_config(
            command.project_path.clone(),
            command.config_path.clone(),
        )?;

        let settings = context.resolve_connection(
            command.driver.as_deref(),
            command.dsn.as_deref(),
            &command.env,
        )?;
        let ledger = context.ledger(settings.dialect)?;
        let ledger_table = ledger.table().to_string();

        let pool = context.connect_pool(&settings).await?;
        let reporter = StatusReporter::new(pool.clone(), ledger);
        let result = reporter.status().await;
        pool.close().await;

        let seeds = result.with_context(|| "Failed to read seed status")?;
        let text_message = self.format_status(&seeds);

        let output = StatusOutput {
            ledger_table,
            total: seeds.len(),
            seeds,
            text_message,
        };

        render_output(&output, &command.format)
    }

    /// 適用済みシードの一覧をフォーマット
    pub fn format_status(&self, seeds: &[LedgerEntry]) -> String {
        let mut output = String::from("=== Seed Status ===\n\n");

        if seeds.is_empty() {
            output.push_str("No seeds have been applied.\n");
            return output;
        }

        output.push_str(&format!("{:<40} {:<30}\n", "Name", "Executed At"));
        output.push_str(&format!("{}\n", "-".repeat(70)));

        for entry in seeds {
            output.push_str(&format!(
                "{:<40} {:<30}\n",
                entry.name,
                entry.executed_at.format("%Y-%m-%d %H:%M:%S UTC")
            ));
        }

        output.push_str(&format!("\nTotal: {} applied\n", seeds.len()));
        output
    }
}
