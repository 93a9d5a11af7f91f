// エラー型定義
//
// ライブラリ全体で使用されるカスタムエラー型を提供します。
// thiserrorを使用して、ConfigError, SourceError, RegistrationError,
// LedgerError, DatabaseError, SeedError を定義します。
// 下位レイヤーのエラーは #[source] で保持し、どのシード・どのフェーズで
// 失敗したかを上位に伝えます。

use std::path::PathBuf;
use thiserror::Error;

/// 設定エラー
///
/// 接続パラメータやシードディレクトリが不足・不正な場合に発生します。
/// 実行前に検出され、トランザクションは開始されません。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Driver not specified
    #[error("database driver is required (use --driver or GEEDER_DRIVER)")]
    MissingDriver,

    /// Connection string not specified
    #[error("connection string is required (use --dsn or GEEDER_DSN)")]
    MissingDsn,

    /// Seed directory not specified
    #[error("seed directory is required (use --dir or GEEDER_DIR)")]
    MissingSeedDir,

    /// Seed directory does not exist
    #[error("seed directory not found: {path:?}")]
    SeedDirNotFound {
        /// 指定されたディレクトリ
        path: PathBuf,
    },

    /// Unsupported driver name
    #[error("unsupported database driver '{name}'. Please specify one of: postgresql, mysql, sqlite")]
    UnsupportedDriver {
        /// 指定されたドライバー名
        name: String,
    },

    /// Environment not found in config file
    #[error("environment '{name}' not found. Available environments: {available:?}")]
    EnvironmentNotFound {
        /// 環境名
        name: String,
        /// 設定ファイルに定義されている環境名
        available: Vec<String>,
    },

    /// Config version missing
    #[error("config file version is not specified")]
    MissingVersion,

    /// Invalid ledger table name
    #[error("invalid ledger table name '{name}': {reason}")]
    InvalidLedgerTable {
        /// テーブル名
        name: String,
        /// 不正な理由
        reason: String,
    },
}

/// シードソースの読み込みエラー
///
/// ファイルシステム上のシードを読み込めない場合に発生します。
/// トランザクション開始前に検出されます。
#[derive(Debug, Error)]
pub enum SourceError {
    /// Directory could not be listed
    #[error("failed to read seed directory {path:?}")]
    ReadDir {
        /// ディレクトリパス
        path: PathBuf,
        /// エラー原因
        #[source]
        source: std::io::Error,
    },

    /// Seed file could not be read
    #[error("failed to read seed file {path:?}")]
    ReadFile {
        /// ファイルパス
        path: PathBuf,
        /// エラー原因
        #[source]
        source: std::io::Error,
    },

    /// Root is not a directory
    #[error("{path:?} is not a directory")]
    NotADirectory {
        /// 指定されたパス
        path: PathBuf,
    },

    /// Two seed files share the same base name
    #[error("duplicate seed name '{name}' ({first:?} and {second:?})")]
    DuplicateName {
        /// シード名
        name: String,
        /// 先に見つかったファイル
        first: PathBuf,
        /// 後に見つかったファイル
        second: PathBuf,
    },
}

/// シード登録エラー
///
/// シード定義のプログラミングミスを表します。登録は拒否され、
/// レジストリの内容は変更されません。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// Empty seed name
    #[error("seed name must not be empty")]
    EmptyName,

    /// Empty seed SQL
    #[error("seed '{name}': SQL must not be empty")]
    EmptySql {
        /// シード名
        name: String,
    },

    /// Name already registered
    #[error("seed '{name}' already registered")]
    Duplicate {
        /// シード名
        name: String,
    },
}

/// 台帳（実行済みシード記録テーブル）のエラー
#[derive(Debug, Error)]
pub enum LedgerError {
    /// CREATE TABLE failed
    #[error("failed to create ledger table '{table}'")]
    CreateTable {
        /// テーブル名
        table: String,
        /// エラー原因
        #[source]
        source: sqlx::Error,
    },

    /// Name already recorded (primary key violation)
    #[error("seed '{name}' is already recorded in the ledger")]
    Duplicate {
        /// シード名
        name: String,
        /// エラー原因
        #[source]
        source: sqlx::Error,
    },

    /// INSERT failed for another reason
    #[error("failed to record seed '{name}'")]
    Insert {
        /// シード名
        name: String,
        /// エラー原因
        #[source]
        source: sqlx::Error,
    },

    /// SELECT failed
    #[error("failed to query ledger table '{table}'")]
    Query {
        /// テーブル名
        table: String,
        /// エラー原因
        #[source]
        source: sqlx::Error,
    },

    /// executed_at could not be parsed
    #[error("invalid executed_at value '{value}' for seed '{name}'")]
    InvalidTimestamp {
        /// シード名
        name: String,
        /// 取得した値
        value: String,
    },
}

impl LedgerError {
    /// 重複記録エラーかどうか
    pub fn is_duplicate(&self) -> bool {
        matches!(self, LedgerError::Duplicate { .. })
    }
}

/// データベース接続エラー
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Connection error
    #[error("database connection error: {message}")]
    Connection {
        /// エラーメッセージ
        message: String,
        /// エラー原因
        #[source]
        source: sqlx::Error,
    },
}

/// シード実行エラー
///
/// シードランナーとステータス照会が返すエラーです。
/// 実行中のエラーはすべてトランザクションのロールバック後に返されます。
#[derive(Debug, Error)]
pub enum SeedError {
    /// Seed source could not be loaded
    #[error("load seeds")]
    Load(#[source] SourceError),

    /// Transaction could not be started
    #[error("begin transaction")]
    Begin(#[source] sqlx::Error),

    /// A seed's SQL failed
    #[error("execute seed '{name}'")]
    Execute {
        /// 失敗したシード名
        name: String,
        /// エラー原因
        #[source]
        source: sqlx::Error,
    },

    /// Ledger write for a seed failed
    #[error("record seed '{name}'")]
    Record {
        /// 失敗したシード名
        name: String,
        /// エラー原因
        #[source]
        source: LedgerError,
    },

    /// Ledger preparation or query failed
    #[error("ledger")]
    Ledger(#[source] LedgerError),

    /// Connection could not be acquired from the pool
    #[error("acquire connection")]
    Acquire(#[source] sqlx::Error),

    /// Commit failed
    #[error("commit")]
    Commit(#[source] sqlx::Error),

    /// Deadline exceeded
    #[error("timed out during {phase}")]
    Timeout {
        /// タイムアウトしたフェーズ
        phase: String,
    },
}

impl SeedError {
    /// 失敗したシード名（特定できる場合）
    pub fn seed_name(&self) -> Option<&str> {
        match self {
            SeedError::Execute { name, .. } | SeedError::Record { name, .. } => Some(name),
            _ => None,
        }
    }

    /// タイムアウトエラーかどうか
    pub fn is_timeout(&self) -> bool {
        matches!(self, SeedError::Timeout { .. })
    }
}
