// 統合テスト共通ヘルパー

#![allow(dead_code)]

use sqlx::any::AnyPoolOptions;
use sqlx::{AnyPool, Row};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// 一時ディレクトリ上のSQLiteファイルに接続する
pub async fn sqlite_pool(temp_dir: &TempDir) -> (AnyPool, PathBuf) {
    sqlx::any::install_default_drivers();
    let db_path = temp_dir.path().join("test.db");
    let pool = AnyPoolOptions::new()
        .max_connections(1)
        .connect(&format!("sqlite://{}?mode=rwc", db_path.display()))
        .await
        .unwrap();
    (pool, db_path)
}

/// シードファイルを書き込む
pub fn write_seed(dir: &Path, name: &str, sql: &str) {
    fs::write(dir.join(name), sql).unwrap();
}

/// COUNT(*) などの単一整数を取得する
pub async fn query_i64(pool: &AnyPool, sql: &str) -> i64 {
    sqlx::query(sql)
        .fetch_one(pool)
        .await
        .unwrap()
        .get::<i64, _>(0)
}

/// テーブルの存在確認
pub async fn table_exists(pool: &AnyPool, table: &str) -> bool {
    let sql = format!(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = '{}'",
        table
    );
    query_i64(pool, &sql).await > 0
}

/// 台帳に記録されたシード名（名前順）
pub async fn ledger_names(pool: &AnyPool) -> Vec<String> {
    sqlx::query("SELECT name FROM geeder_seeds ORDER BY name")
        .fetch_all(pool)
        .await
        .unwrap()
        .iter()
        .map(|row| row.get::<String, _>(0))
        .collect()
}
