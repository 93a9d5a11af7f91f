// ステータスレポーター
//
// 台帳テーブルから適用済みシードの履歴を取得する。

use crate::adapters::seed_ledger::SeedLedgerService;
use crate::core::error::SeedError;
use crate::core::seed::LedgerEntry;
use sqlx::AnyPool;

/// ステータスレポーター
#[derive(Debug, Clone)]
pub struct StatusReporter {
    pool: AnyPool,
    ledger: SeedLedgerService,
}

impl StatusReporter {
    /// 新しいStatusReporterを作成
    pub fn new(pool: AnyPool, ledger: SeedLedgerService) -> Self {
        Self { pool, ledger }
    }

    /// 適用済みシードを実行日時の昇順で取得
    ///
    /// 台帳テーブルが無い場合は作成してから空のリストを返す。
    pub async fn status(&self) -> Result<Vec<LedgerEntry>, SeedError> {
        let mut conn = self.pool.acquire().await.map_err(SeedError::Acquire)?;

        self.ledger
            .ensure_table(&mut conn)
            .await
            .map_err(SeedError::Ledger)?;

        self.ledger
            .history(&mut conn)
            .await
            .map_err(SeedError::Ledger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Dialect;
    use sqlx::any::AnyPoolOptions;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_status_on_fresh_database() {
        sqlx::any::install_default_drivers();
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("status.db");
        let pool = AnyPoolOptions::new()
            .max_connections(1)
            .connect(&format!("sqlite://{}?mode=rwc", db_path.display()))
            .await
            .unwrap();

        let reporter = StatusReporter::new(pool, SeedLedgerService::new(Dialect::SQLite));
        let entries = reporter.status().await.unwrap();

        assert!(entries.is_empty());
    }
}
