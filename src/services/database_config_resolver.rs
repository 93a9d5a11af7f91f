// データベース設定の解決サービス
//
// 環境変数による上書きをサービス層で扱い、coreは純粋な構造体に保つ。

use crate::core::config::DatabaseConfig;

/// データベース設定の解決ユーティリティ
#[derive(Debug, Clone, Default)]
pub struct DatabaseConfigResolver;

impl DatabaseConfigResolver {
    /// プロセスの環境変数による上書きを適用
    ///
    /// `DB_DSN`, `DB_HOST`, `DB_PORT`, `DB_DATABASE`, `DB_USER`, `DB_PASSWORD`
    pub fn apply_env_overrides(base: &DatabaseConfig) -> DatabaseConfig {
        Self::apply_overrides(base, |key| std::env::var(key).ok())
    }

    /// 任意の参照関数による上書きを適用
    pub fn apply_overrides<F>(base: &DatabaseConfig, lookup: F) -> DatabaseConfig
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = base.clone();

        if let Some(dsn) = lookup("DB_DSN") {
            config.dsn = Some(dsn);
        }
        if let Some(host) = lookup("DB_HOST") {
            config.host = host;
        }
        // 数値でないポートは無視
        if let Some(port) = lookup("DB_PORT").and_then(|p| p.parse::<u16>().ok()) {
            config.port = Some(port);
        }
        if let Some(database) = lookup("DB_DATABASE") {
            config.database = database;
        }
        if let Some(user) = lookup("DB_USER") {
            config.user = Some(user);
        }
        if let Some(password) = lookup("DB_PASSWORD") {
            config.password = Some(password);
        }

        config
    }
}
