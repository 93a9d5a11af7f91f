// シード台帳サービス
//
// 実行済みシードを記録する台帳テーブルの管理を担当するサービス。
// データベース固有のSQL構文（タイムスタンプ型、プレースホルダー）を抽象化します。
// すべての操作は呼び出し側の接続（プール接続またはトランザクション）上で実行されます。

use crate::core::config::{validate_table_name, Dialect};
use crate::core::error::{ConfigError, LedgerError};
use crate::core::naming;
use crate::core::seed::LedgerEntry;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use sqlx::{AnyConnection, Row};
use std::collections::HashSet;

/// シード台帳サービス
///
/// 台帳テーブルの作成、実行記録、参照を提供します。
#[derive(Debug, Clone)]
pub struct SeedLedgerService {
    dialect: Dialect,
    table: String,
}

impl SeedLedgerService {
    /// 既定のテーブル名（`geeder_seeds`）で作成
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            table: naming::LEDGER_TABLE.to_string(),
        }
    }

    /// テーブル名を指定して作成
    ///
    /// テーブル名はSQLに埋め込まれるため識別子として検証します。
    pub fn with_table(dialect: Dialect, table: &str) -> Result<Self, ConfigError> {
        validate_table_name(table)?;
        Ok(Self {
            dialect,
            table: table.to_string(),
        })
    }

    /// データベース方言
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// 台帳テーブル名
    pub fn table(&self) -> &str {
        &self.table
    }

    /// 台帳テーブル作成SQLを生成
    ///
    /// 同一トランザクション内の記録でも適用順が残るよう、
    /// 文単位で進む時刻関数をデフォルト値に使う。
    pub fn generate_create_table_sql(&self) -> String {
        match self.dialect {
            Dialect::PostgreSQL => format!(
                r#"CREATE TABLE IF NOT EXISTS {} (
    name VARCHAR(255) PRIMARY KEY,
    executed_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT clock_timestamp()
)"#,
                self.table
            ),
            Dialect::MySQL => format!(
                r#"CREATE TABLE IF NOT EXISTS {} (
    name VARCHAR(255) PRIMARY KEY,
    executed_at TIMESTAMP(6) NOT NULL DEFAULT CURRENT_TIMESTAMP(6)
)"#,
                self.table
            ),
            Dialect::SQLite => format!(
                r#"CREATE TABLE IF NOT EXISTS {} (
    name VARCHAR(255) PRIMARY KEY,
    executed_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now'))
)"#,
                self.table
            ),
        }
    }

    /// 実行記録のINSERTクエリを生成（パラメータバインド）
    pub fn generate_record_query(&self, name: &str) -> (String, Vec<String>) {
        let sql = format!(
            "INSERT INTO {} (name) VALUES ({})",
            self.table,
            self.dialect.placeholder(1)
        );
        (sql, vec![name.to_string()])
    }

    /// 実行済みシード名取得のSELECT SQLを生成
    pub fn generate_executed_names_sql(&self) -> String {
        format!("SELECT name FROM {}", self.table)
    }

    /// 実行履歴取得のSELECT SQLを生成
    ///
    /// Anyドライバーは日時型をデコードできないため、日時は文字列として取得する。
    pub fn generate_history_sql(&self) -> String {
        let executed_at = match self.dialect {
            Dialect::PostgreSQL => {
                r#"to_char(executed_at AT TIME ZONE 'UTC', 'YYYY-MM-DD"T"HH24:MI:SS.US"Z"')"#
            }
            Dialect::MySQL => "CAST(UNIX_TIMESTAMP(executed_at) AS CHAR)",
            Dialect::SQLite => "executed_at",
        };
        format!(
            "SELECT name, {} AS executed_at FROM {} ORDER BY {}.executed_at, name",
            executed_at, self.table, self.table
        )
    }

    /// 台帳テーブルを作成（存在する場合は何もしない）
    pub async fn ensure_table(&self, conn: &mut AnyConnection) -> Result<(), LedgerError> {
        let sql = self.generate_create_table_sql();

        sqlx::query(&sql)
            .execute(&mut *conn)
            .await
            .map_err(|source| LedgerError::CreateTable {
                table: self.table.clone(),
                source,
            })?;

        Ok(())
    }

    /// シードの実行を記録
    ///
    /// 既に記録済みの名前は主キー制約違反となり `LedgerError::Duplicate` を返す。
    pub async fn record_execution(
        &self,
        conn: &mut AnyConnection,
        name: &str,
    ) -> Result<(), LedgerError> {
        let (sql, params) = self.generate_record_query(name);

        let mut query = sqlx::query(&sql);
        for param in &params {
            query = query.bind(param);
        }

        query.execute(&mut *conn).await.map_err(|source| {
            let duplicate = matches!(&source, sqlx::Error::Database(db) if db.is_unique_violation());
            if duplicate {
                LedgerError::Duplicate {
                    name: name.to_string(),
                    source,
                }
            } else {
                LedgerError::Insert {
                    name: name.to_string(),
                    source,
                }
            }
        })?;

        Ok(())
    }

    /// 実行済みシード名の集合を取得
    pub async fn load_executed_names(
        &self,
        conn: &mut AnyConnection,
    ) -> Result<HashSet<String>, LedgerError> {
        let sql = self.generate_executed_names_sql();

        let rows = sqlx::query(&sql)
            .fetch_all(&mut *conn)
            .await
            .map_err(|source| self.query_error(source))?;

        rows.iter()
            .map(|row| row.try_get::<String, _>(0))
            .collect::<Result<HashSet<_>, _>>()
            .map_err(|source| self.query_error(source))
    }

    /// 実行履歴を実行日時の昇順で取得
    pub async fn history(&self, conn: &mut AnyConnection) -> Result<Vec<LedgerEntry>, LedgerError> {
        let sql = self.generate_history_sql();

        let rows = sqlx::query(&sql)
            .fetch_all(&mut *conn)
            .await
            .map_err(|source| self.query_error(source))?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in &rows {
            let name: String = row.try_get(0).map_err(|source| self.query_error(source))?;
            let raw: String = row.try_get(1).map_err(|source| self.query_error(source))?;

            let executed_at =
                parse_executed_at(&raw).ok_or_else(|| LedgerError::InvalidTimestamp {
                    name: name.clone(),
                    value: raw.clone(),
                })?;
            entries.push(LedgerEntry::new(name, executed_at));
        }

        Ok(entries)
    }

    fn query_error(&self, source: sqlx::Error) -> LedgerError {
        LedgerError::Query {
            table: self.table.clone(),
            source,
        }
    }
}

/// 台帳の日時文字列をパース
///
/// 対応形式:
/// - RFC 3339（PostgreSQL）
/// - `YYYY-MM-DD HH:MM:SS[.fff]`（SQLite、UTCとして扱う）
/// - UNIX時刻の秒数（小数部可、MySQL）
pub fn parse_executed_at(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    parse_unix_seconds(value)
}

fn parse_unix_seconds(value: &str) -> Option<DateTime<Utc>> {
    let (secs, frac) = match value.split_once('.') {
        Some((secs, frac)) => (secs, frac),
        None => (value, ""),
    };
    if secs.is_empty() || !secs.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if !frac.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let secs: i64 = secs.parse().ok()?;
    let nanos: u32 = if frac.is_empty() {
        0
    } else {
        let digits: String = frac.chars().chain(std::iter::repeat('0')).take(9).collect();
        digits.parse().ok()?
    };

    DateTime::from_timestamp(secs, nanos)
}
