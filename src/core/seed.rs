// シードドメインモデル
//
// シード（名前付きSQL）、台帳エントリ、実行結果を表現する型。

use chrono::{DateTime, Utc};
use serde::Serialize;

/// シード
///
/// 対象データベースに対して実行する名前付きSQLです。
/// ファイルから読み込んだ場合はファイル名（拡張子込み）、
/// 登録した場合は登録時のキーが名前になります。構築後は不変です。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seed {
    name: String,
    sql: String,
}

impl Seed {
    /// 新しいシードを作成
    pub fn new(name: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql: sql.into(),
        }
    }

    /// シード名
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 実行するSQL
    pub fn sql(&self) -> &str {
        &self.sql
    }
}

/// 台帳エントリ
///
/// 台帳テーブルの1行。シードが適用された日時を記録します。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerEntry {
    /// シード名
    pub name: String,

    /// 適用日時
    pub executed_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// 新しい台帳エントリを作成
    pub fn new(name: impl Into<String>, executed_at: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            executed_at,
        }
    }
}

/// 追跡モードでの実行結果
///
/// どちらのリストもソース順（ファイル名順または登録順）です。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// 今回の実行で適用されたシード名
    pub applied: Vec<String>,

    /// 台帳に記録済みのためスキップされたシード名
    pub skipped: Vec<String>,
}

impl RunReport {
    /// 何も適用されなかったかどうか
    pub fn is_up_to_date(&self) -> bool {
        self.applied.is_empty()
    }

    /// 処理したシードの総数
    pub fn total(&self) -> usize {
        self.applied.len() + self.skipped.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_accessors() {
        let seed = Seed::new("001_users.sql", "INSERT INTO users (name) VALUES ('alice')");

        assert_eq!(seed.name(), "001_users.sql");
        assert!(seed.sql().starts_with("INSERT INTO users"));
    }

    #[test]
    fn test_run_report_counts() {
        let report = RunReport {
            applied: vec!["seed_2".to_string()],
            skipped: vec!["seed_1".to_string()],
        };

        assert!(!report.is_up_to_date());
        assert_eq!(report.total(), 2);
        assert!(RunReport::default().is_up_to_date());
    }

    #[test]
    fn test_ledger_entry_serialization() {
        let executed_at = DateTime::parse_from_rfc3339("2026-01-21T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let entry = LedgerEntry::new("001_users.sql", executed_at);

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["name"], "001_users.sql");
        assert_eq!(json["executed_at"], "2026-01-21T12:00:00Z");
    }
}
