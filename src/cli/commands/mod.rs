// コマンドハンドラー層
// 各CLIコマンドの実装と出力の共通処理

pub mod run;
pub mod status;

use crate::cli::OutputFormat;
use anyhow::{Context, Result};
use serde::Serialize;

/// コマンド出力の共通インターフェース
///
/// JSON出力はSerializeの結果、テキスト出力は `to_text` の結果を使う。
pub trait CommandOutput: Serialize {
    /// テキスト形式の出力
    fn to_text(&self) -> String;
}

/// 出力フォーマットに応じて出力を文字列化
pub fn render_output<T: CommandOutput>(output: &T, format: &OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(output.to_text()),
        OutputFormat::Json => {
            serde_json::to_string_pretty(output).with_context(|| "Failed to serialize output")
        }
    }
}
