// 設定ファイル管理
//
// 設定ファイル（YAML形式）の構造、検証、
// 環境別のデータベース接続設定、データベース方言の判定を扱います。

use crate::core::error::ConfigError;
use crate::core::naming;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;

/// データベース方言
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dialect {
    #[serde(rename = "postgresql", alias = "postgres", alias = "pg", alias = "pgx")]
    PostgreSQL,
    #[serde(rename = "mysql", alias = "mariadb")]
    MySQL,
    #[serde(rename = "sqlite", alias = "sqlite3")]
    SQLite,
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dialect::PostgreSQL => write!(f, "postgresql"),
            Dialect::MySQL => write!(f, "mysql"),
            Dialect::SQLite => write!(f, "sqlite"),
        }
    }
}

impl FromStr for Dialect {
    type Err = ConfigError;

    /// ドライバー名からDialectを判定する
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.to_ascii_lowercase().as_str() {
            "postgresql" | "postgres" | "pg" | "pgx" => Ok(Dialect::PostgreSQL),
            "mysql" | "mariadb" => Ok(Dialect::MySQL),
            "sqlite" | "sqlite3" => Ok(Dialect::SQLite),
            _ => Err(ConfigError::UnsupportedDriver {
                name: name.to_string(),
            }),
        }
    }
}

impl Dialect {
    /// 接続文字列のスキームからDialectを推定する
    ///
    /// スキームが無い、または未知の場合は None
    pub fn from_url(url: &str) -> Option<Self> {
        let (scheme, _) = url.split_once(':')?;
        match scheme.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Some(Dialect::PostgreSQL),
            "mysql" | "mariadb" => Some(Dialect::MySQL),
            "sqlite" => Some(Dialect::SQLite),
            _ => None,
        }
    }

    /// Dialectに応じたデフォルトポートを返す
    ///
    /// - PostgreSQL: 5432
    /// - MySQL: 3306
    /// - SQLite: None（ファイルベースのためポート不要）
    pub fn default_port(&self) -> Option<u16> {
        match self {
            Dialect::PostgreSQL => Some(5432),
            Dialect::MySQL => Some(3306),
            Dialect::SQLite => None,
        }
    }

    /// n番目（1始まり）のバインドパラメータのプレースホルダー
    ///
    /// sqlxのAnyドライバーはプレースホルダーを変換しないため、方言ごとに書き分ける。
    pub fn placeholder(&self, index: usize) -> String {
        match self {
            Dialect::PostgreSQL => format!("${}", index),
            Dialect::MySQL | Dialect::SQLite => "?".to_string(),
        }
    }
}

/// プロジェクト設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// 設定ファイルのバージョン
    pub version: String,

    /// データベース方言（ドライバー未指定で接続文字列からも判定できない場合に使用）
    #[serde(default)]
    pub dialect: Option<Dialect>,

    /// シードディレクトリ
    #[serde(default = "default_seeds_dir")]
    pub seeds_dir: PathBuf,

    /// サブディレクトリも探索するか
    #[serde(default = "default_recursive")]
    pub recursive: bool,

    /// 台帳テーブル名
    #[serde(default = "default_ledger_table")]
    pub ledger_table: String,

    /// 環境別のデータベース設定
    #[serde(default)]
    pub environments: HashMap<String, DatabaseConfig>,
}

fn default_seeds_dir() -> PathBuf {
    PathBuf::from(naming::SEEDS_DIR)
}

fn default_recursive() -> bool {
    true
}

fn default_ledger_table() -> String {
    naming::LEDGER_TABLE.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            dialect: None,
            seeds_dir: default_seeds_dir(),
            recursive: default_recursive(),
            ledger_table: default_ledger_table(),
            environments: HashMap::new(),
        }
    }
}

impl Config {
    /// デフォルトの設定ファイルパス
    pub const DEFAULT_CONFIG_PATH: &'static str = naming::CONFIG_FILE;

    /// 指定された環境のデータベース設定を取得
    pub fn get_database_config(&self, environment: &str) -> Result<DatabaseConfig, ConfigError> {
        self.environments.get(environment).cloned().ok_or_else(|| {
            let mut available: Vec<String> = self.environments.keys().cloned().collect();
            available.sort();
            ConfigError::EnvironmentNotFound {
                name: environment.to_string(),
                available,
            }
        })
    }

    /// 設定の妥当性を検証
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version.is_empty() {
            return Err(ConfigError::MissingVersion);
        }

        validate_table_name(&self.ledger_table)?;

        Ok(())
    }
}

/// データベース接続設定
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// 接続文字列（指定時は host/port/database より優先）
    #[serde(default)]
    pub dsn: Option<String>,

    /// ホスト名（SQLiteの場合は不要）
    #[serde(default)]
    pub host: String,

    /// ポート番号（未指定時は方言のデフォルト）
    #[serde(default)]
    pub port: Option<u16>,

    /// データベース名（SQLiteの場合はファイルパス）
    #[serde(default)]
    pub database: String,

    /// ユーザー名
    #[serde(default)]
    pub user: Option<String>,

    /// パスワード
    #[serde(default)]
    pub password: Option<String>,

    /// 接続タイムアウト（秒）
    #[serde(default)]
    pub timeout: Option<u64>,

    /// 最大接続数
    #[serde(default)]
    pub max_connections: Option<u32>,
}

/// 台帳テーブル名がSQL識別子として安全か検証する
///
/// テーブル名はSQLに直接埋め込まれるため、英数字とアンダースコアのみ許可する。
pub fn validate_table_name(name: &str) -> Result<(), ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidLedgerTable {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    let first = name.chars().next().ok_or_else(|| invalid("name is empty"))?;
    if !(first.is_ascii_alphabetic() || first == '_') {
        return Err(invalid("must start with a letter or underscore"));
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(invalid("only ASCII letters, digits and underscores are allowed"));
    }
    if name.len() > 63 {
        return Err(invalid("must be at most 63 characters"));
    }

    Ok(())
}
