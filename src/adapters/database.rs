// データベース接続アダプター
//
// SQLxのAnyドライバーを使用したデータベース接続プールの管理を行います。
// PostgreSQL、MySQL、SQLiteに対応した統一されたインターフェースを提供します。

use crate::adapters::connection_string;
use crate::core::config::{DatabaseConfig, Dialect};
use crate::core::error::DatabaseError;
use sqlx::pool::PoolOptions;
use sqlx::{Any, AnyPool};
use std::time::Duration;
use tracing::debug;

/// データベース接続サービス
///
/// データベース接続プールの初期化と管理を行います。
#[derive(Debug, Clone, Default)]
pub struct DatabaseConnectionService {}

impl DatabaseConnectionService {
    /// 新しいDatabaseConnectionServiceを作成
    pub fn new() -> Self {
        Self {}
    }

    /// 設定からデータベース接続プールを作成
    pub async fn create_pool(
        &self,
        dialect: Dialect,
        config: &DatabaseConfig,
    ) -> Result<AnyPool, DatabaseError> {
        let connection_string = connection_string::build_connection_string(dialect, config);
        self.connect(dialect, &connection_string, config).await
    }

    /// 接続文字列を指定してデータベース接続プールを作成
    pub async fn connect(
        &self,
        dialect: Dialect,
        connection_string: &str,
        config: &DatabaseConfig,
    ) -> Result<AnyPool, DatabaseError> {
        let url = connection_string::normalize_dsn(dialect, connection_string);
        debug!(dialect = %dialect, "Connecting to database");

        self.create_pool_options(dialect, config)
            .connect(&url)
            .await
            .map_err(|e| DatabaseError::Connection {
                message: format!("failed to create {} connection pool", dialect),
                source: e,
            })
    }

    /// 接続テストを実行
    pub async fn test_connection(&self, pool: &AnyPool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1")
            .execute(pool)
            .await
            .map(|_| ())
            .map_err(|e| DatabaseError::Connection {
                message: "database connection test failed".to_string(),
                source: e,
            })
    }

    /// DatabaseConfigからプールオプションを作成
    ///
    /// 未設定の場合はデフォルト値（max_connections=5, timeout=30秒）を使用します。
    /// SQLiteは `:memory:` でも同じデータベースを参照できるよう接続を1本に制限します。
    pub fn create_pool_options(&self, dialect: Dialect, config: &DatabaseConfig) -> PoolOptions<Any> {
        let max_conn = match dialect {
            Dialect::SQLite => 1,
            Dialect::PostgreSQL | Dialect::MySQL => config.max_connections.unwrap_or(5),
        };
        let timeout = config.timeout.unwrap_or(30);

        PoolOptions::new()
            .max_connections(max_conn)
            .acquire_timeout(Duration::from_secs(timeout))
    }
}
