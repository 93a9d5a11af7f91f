// シードランナー
//
// シードソースから読み込んだシードを1つのトランザクションで実行する。
// - 非追跡モード: すべてのシードを毎回実行
// - 追跡モード: 台帳に記録済みのシードをスキップし、新しいシードのみ実行して記録
//
// いずれのモードでも、失敗した場合はその実行で行ったすべての変更（台帳の記録を含む）を
// ロールバックする。

use crate::adapters::seed_ledger::SeedLedgerService;
use crate::adapters::seed_source::SeedSource;
use crate::core::config::Dialect;
use crate::core::error::SeedError;
use crate::core::seed::{RunReport, Seed};
use sqlx::{Any, AnyPool, Transaction};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// シードランナー
#[derive(Debug, Clone)]
pub struct SeedRunner {
    pool: AnyPool,
    ledger: SeedLedgerService,
    timeout: Option<Duration>,
}

impl SeedRunner {
    /// 新しいSeedRunnerを作成（台帳は既定のテーブル名）
    pub fn new(pool: AnyPool, dialect: Dialect) -> Self {
        Self {
            pool,
            ledger: SeedLedgerService::new(dialect),
            timeout: None,
        }
    }

    /// 台帳サービスを差し替える
    pub fn with_ledger(mut self, ledger: SeedLedgerService) -> Self {
        self.ledger = ledger;
        self
    }

    /// 実行全体の制限時間を設定
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// 台帳サービス
    pub fn ledger(&self) -> &SeedLedgerService {
        &self.ledger
    }

    /// すべてのシードを実行する（非追跡モード）
    ///
    /// 実行したシードをソース順で返す。シードが無い場合はトランザクションを開始しない。
    pub async fn run_untracked(&self, source: &dyn SeedSource) -> Result<Vec<Seed>, SeedError> {
        let seeds = source.load().map_err(SeedError::Load)?;
        if seeds.is_empty() {
            debug!("No seeds to run");
            return Ok(seeds);
        }

        let deadline = self.deadline();
        let mut tx = self.begin(deadline).await?;

        for seed in &seeds {
            if let Err(e) = self.execute_seed(&mut tx, seed, deadline).await {
                rollback(tx).await;
                return Err(e);
            }
            info!(seed = %seed.name(), "Applied seed");
        }

        self.commit(tx, deadline).await?;
        info!(applied = seeds.len(), "Seed run complete");
        Ok(seeds)
    }

    /// 未実行のシードのみ実行し、台帳に記録する（追跡モード）
    pub async fn run(&self, source: &dyn SeedSource) -> Result<RunReport, SeedError> {
        let seeds = source.load().map_err(SeedError::Load)?;
        self.run_seeds(&seeds).await
    }

    /// 指定したシードを追跡モードで実行する
    ///
    /// 適用とスキップの結果はいずれも入力順。
    pub async fn run_seeds(&self, seeds: &[Seed]) -> Result<RunReport, SeedError> {
        let deadline = self.deadline();

        // MySQLのDDLは暗黙コミットされるため、台帳テーブルはトランザクション外で作成する
        self.ensure_ledger(deadline).await?;

        if seeds.is_empty() {
            debug!("No seeds to run");
            return Ok(RunReport::default());
        }

        let mut tx = self.begin(deadline).await?;
        match self.apply_tracked(&mut tx, seeds, deadline).await {
            Ok(report) => {
                self.commit(tx, deadline).await?;
                info!(
                    applied = report.applied.len(),
                    skipped = report.skipped.len(),
                    total = report.total(),
                    "Seed run complete"
                );
                Ok(report)
            }
            Err(e) => {
                rollback(tx).await;
                Err(e)
            }
        }
    }

    async fn apply_tracked(
        &self,
        tx: &mut Transaction<'static, Any>,
        seeds: &[Seed],
        deadline: Option<Instant>,
    ) -> Result<RunReport, SeedError> {
        let executed = within(deadline, "load ledger", async {
            self.ledger
                .load_executed_names(&mut **tx)
                .await
                .map_err(SeedError::Ledger)
        })
        .await?;

        let mut report = RunReport::default();
        for seed in seeds {
            if executed.contains(seed.name()) {
                debug!(seed = %seed.name(), "Skipping already executed seed");
                report.skipped.push(seed.name().to_string());
                continue;
            }

            self.execute_seed(tx, seed, deadline).await?;

            let phase = format!("record seed '{}'", seed.name());
            within(deadline, &phase, async {
                self.ledger
                    .record_execution(&mut **tx, seed.name())
                    .await
                    .map_err(|source| SeedError::Record {
                        name: seed.name().to_string(),
                        source,
                    })
            })
            .await?;

            info!(seed = %seed.name(), "Applied seed");
            report.applied.push(seed.name().to_string());
        }

        Ok(report)
    }

    async fn execute_seed(
        &self,
        tx: &mut Transaction<'static, Any>,
        seed: &Seed,
        deadline: Option<Instant>,
    ) -> Result<(), SeedError> {
        let phase = format!("execute seed '{}'", seed.name());
        within(deadline, &phase, async {
            sqlx::raw_sql(seed.sql())
                .execute(&mut **tx)
                .await
                .map(|_| ())
                .map_err(|source| SeedError::Execute {
                    name: seed.name().to_string(),
                    source,
                })
        })
        .await
    }

    async fn ensure_ledger(&self, deadline: Option<Instant>) -> Result<(), SeedError> {
        within(deadline, "prepare ledger", async {
            let mut conn = self.pool.acquire().await.map_err(SeedError::Acquire)?;
            self.ledger
                .ensure_table(&mut conn)
                .await
                .map_err(SeedError::Ledger)
        })
        .await
    }

    async fn begin(&self, deadline: Option<Instant>) -> Result<Transaction<'static, Any>, SeedError> {
        within(deadline, "begin transaction", async {
            self.pool.begin().await.map_err(SeedError::Begin)
        })
        .await
    }

    // タイムアウト時はトランザクションがドロップされ、ロールバックされる
    async fn commit(
        &self,
        tx: Transaction<'static, Any>,
        deadline: Option<Instant>,
    ) -> Result<(), SeedError> {
        within(deadline, "commit", async move {
            tx.commit().await.map_err(SeedError::Commit)
        })
        .await
    }

    fn deadline(&self) -> Option<Instant> {
        self.timeout.map(|timeout| Instant::now() + timeout)
    }
}

/// 制限時間付きで実行する
async fn within<T, F>(deadline: Option<Instant>, phase: &str, future: F) -> Result<T, SeedError>
where
    F: Future<Output = Result<T, SeedError>>,
{
    match deadline {
        Some(deadline) => tokio::time::timeout_at(deadline, future)
            .await
            .map_err(|_| SeedError::Timeout {
                phase: phase.to_string(),
            })?,
        None => future.await,
    }
}

/// ロールバック（失敗しても元のエラーを優先する）
async fn rollback(tx: Transaction<'static, Any>) {
    if let Err(e) = tx.rollback().await {
        warn!(error = %e, "Failed to roll back transaction");
    }
}
