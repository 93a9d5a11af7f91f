// コマンド共通コンテキスト
//
// 設定ファイル読み込み、接続先・シードディレクトリの解決をCLI層で集約する。
// 優先順位: CLIフラグ / GEEDER_* 環境変数 > 設定ファイル > デフォルト

use crate::adapters::connection_string;
use crate::adapters::database::DatabaseConnectionService;
use crate::adapters::seed_ledger::SeedLedgerService;
use crate::core::config::{Config, DatabaseConfig, Dialect};
use crate::core::error::ConfigError;
use crate::services::config_loader::ConfigLoader;
use crate::services::database_config_resolver::DatabaseConfigResolver;
use anyhow::{Context, Result};
use sqlx::AnyPool;
use std::path::{Path, PathBuf};
use tracing::debug;

/// 解決済みの接続設定
#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    /// データベース方言
    pub dialect: Dialect,
    /// 接続URL
    pub url: String,
    /// プール設定の元になるデータベース設定
    pub database: DatabaseConfig,
}

/// CLIコマンド共通の実行コンテキスト
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub project_path: PathBuf,
    pub config: Option<Config>,
}

impl CommandContext {
    /// プロジェクトルートと任意の設定ファイルパスからコンテキストを作成
    ///
    /// 設定ファイルは任意。`--config` で明示されたファイルが無い場合のみエラー。
    pub fn load_with_config(project_path: PathBuf, config_path: Option<PathBuf>) -> Result<Self> {
        let config = ConfigLoader::load(config_path.as_deref(), &project_path)?;

        Ok(Self {
            project_path,
            config,
        })
    }

    /// 接続先を解決
    ///
    /// ドライバーはフラグ、接続文字列のスキーム、設定ファイルの `dialect` の順に決定する。
    pub fn resolve_connection(
        &self,
        driver: Option<&str>,
        dsn: Option<&str>,
        env: &str,
    ) -> Result<ConnectionSettings, ConfigError> {
        let dsn = dsn.filter(|d| !d.is_empty());

        let base = match &self.config {
            Some(config) if config.environments.contains_key(env) => {
                config.get_database_config(env)?
            }
            // 接続文字列が指定されていれば環境定義は不要
            Some(config) if dsn.is_none() && !config.environments.is_empty() => {
                config.get_database_config(env)?
            }
            _ => DatabaseConfig::default(),
        };

        let mut database = DatabaseConfigResolver::apply_env_overrides(&base);
        if let Some(dsn) = dsn {
            database.dsn = Some(dsn.to_string());
        }

        let dialect = match driver.filter(|d| !d.is_empty()) {
            Some(name) => name.parse::<Dialect>()?,
            None => database
                .dsn
                .as_deref()
                .and_then(Dialect::from_url)
                .or_else(|| self.config.as_ref().and_then(|c| c.dialect))
                .ok_or(ConfigError::MissingDriver)?,
        };

        let has_dsn = database.dsn.as_deref().is_some_and(|d| !d.is_empty());
        if !has_dsn && database.database.is_empty() {
            return Err(ConfigError::MissingDsn);
        }

        let url = connection_string::build_connection_string(dialect, &database);
        debug!(dialect = %dialect, env = env, "Resolved connection settings");

        Ok(ConnectionSettings {
            dialect,
            url,
            database,
        })
    }

    /// シードディレクトリを解決し、存在することを確認して返す
    pub fn resolve_seeds_dir(&self, dir: Option<&Path>) -> Result<PathBuf, ConfigError> {
        let dir = match dir {
            Some(dir) => dir.to_path_buf(),
            None => self
                .config
                .as_ref()
                .map(|c| c.seeds_dir.clone())
                .ok_or(ConfigError::MissingSeedDir)?,
        };

        let path = if dir.is_absolute() {
            dir
        } else {
            self.project_path.join(dir)
        };
        if !path.exists() {
            return Err(ConfigError::SeedDirNotFound { path });
        }
        Ok(path)
    }

    /// サブディレクトリを探索するか（設定ファイルが無ければ true）
    pub fn recursive(&self) -> bool {
        self.config.as_ref().is_none_or(|c| c.recursive)
    }

    /// 台帳サービスを作成
    pub fn ledger(&self, dialect: Dialect) -> Result<SeedLedgerService, ConfigError> {
        match &self.config {
            Some(config) => SeedLedgerService::with_table(dialect, &config.ledger_table),
            None => Ok(SeedLedgerService::new(dialect)),
        }
    }

    /// データベースに接続し、接続を確認する
    pub async fn connect_pool(&self, settings: &ConnectionSettings) -> Result<AnyPool> {
        let db_service = DatabaseConnectionService::new();
        let database = DatabaseConfig {
            dsn: Some(settings.url.clone()),
            ..settings.database.clone()
        };

        let pool = db_service
            .create_pool(settings.dialect, &database)
            .await
            .with_context(|| format!("Failed to connect to {} database", settings.dialect))?;
        db_service
            .test_connection(&pool)
            .await
            .with_context(|| format!("Failed to connect to {} database", settings.dialect))?;
        Ok(pool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::TempDir;

    fn context_without_config(project_path: &Path) -> CommandContext {
        CommandContext {
            project_path: project_path.to_path_buf(),
            config: None,
        }
    }

    fn config_with_env(env: &str, database: &str) -> Config {
        let mut environments = HashMap::new();
        environments.insert(
            env.to_string(),
            DatabaseConfig {
                database: database.to_string(),
                ..Default::default()
            },
        );
        Config {
            dialect: Some(Dialect::SQLite),
            environments,
            ..Default::default()
        }
    }

    #[test]
    fn test_resolve_connection_from_flags() {
        let temp_dir = TempDir::new().unwrap();
        let context = context_without_config(temp_dir.path());

        let settings = context
            .resolve_connection(Some("sqlite"), Some("app.db"), "development")
            .unwrap();
        assert_eq!(settings.dialect, Dialect::SQLite);
        assert_eq!(settings.url, "sqlite://app.db?mode=rwc");
    }

    #[test]
    fn test_resolve_connection_infers_driver_from_dsn() {
        let temp_dir = TempDir::new().unwrap();
        let context = context_without_config(temp_dir.path());

        let settings = context
            .resolve_connection(None, Some("postgres://app@localhost/app"), "development")
            .unwrap();
        assert_eq!(settings.dialect, Dialect::PostgreSQL);
        assert_eq!(settings.url, "postgres://app@localhost/app");
    }

    #[test]
    fn test_resolve_connection_missing_driver() {
        let temp_dir = TempDir::new().unwrap();
        let context = context_without_config(temp_dir.path());

        let result = context.resolve_connection(None, Some("./app.db"), "development");
        assert_eq!(result.unwrap_err(), ConfigError::MissingDriver);
    }

    #[test]
    fn test_resolve_connection_unsupported_driver() {
        let temp_dir = TempDir::new().unwrap();
        let context = context_without_config(temp_dir.path());

        let result = context.resolve_connection(Some("oracle"), Some("db"), "development");
        assert!(matches!(
            result,
            Err(ConfigError::UnsupportedDriver { ref name }) if name == "oracle"
        ));
    }

    #[test]
    fn test_resolve_connection_from_config_environment() {
        let temp_dir = TempDir::new().unwrap();
        let context = CommandContext {
            project_path: temp_dir.path().to_path_buf(),
            config: Some(config_with_env("development", "dev.db")),
        };

        let settings = context
            .resolve_connection(None, None, "development")
            .unwrap();
        assert_eq!(settings.dialect, Dialect::SQLite);
        assert_eq!(settings.url, "sqlite://dev.db?mode=rwc");
    }

    #[test]
    fn test_resolve_connection_unknown_environment() {
        let temp_dir = TempDir::new().unwrap();
        let context = CommandContext {
            project_path: temp_dir.path().to_path_buf(),
            config: Some(config_with_env("development", "dev.db")),
        };

        let result = context.resolve_connection(None, None, "production");
        assert!(matches!(
            result,
            Err(ConfigError::EnvironmentNotFound { ref name, .. }) if name == "production"
        ));
    }

    #[test]
    fn test_resolve_connection_flag_overrides_config() {
        let temp_dir = TempDir::new().unwrap();
        let context = CommandContext {
            project_path: temp_dir.path().to_path_buf(),
            config: Some(config_with_env("development", "dev.db")),
        };

        let settings = context
            .resolve_connection(None, Some("other.db"), "production")
            .unwrap();
        assert_eq!(settings.url, "sqlite://other.db?mode=rwc");
    }

    #[test]
    fn test_resolve_connection_dsn_scheme_overrides_config_dialect() {
        let temp_dir = TempDir::new().unwrap();
        let context = CommandContext {
            project_path: temp_dir.path().to_path_buf(),
            config: Some(config_with_env("development", "dev.db")),
        };

        let settings = context
            .resolve_connection(None, Some("postgres://app@localhost/app"), "development")
            .unwrap();
        assert_eq!(settings.dialect, Dialect::PostgreSQL);
        assert_eq!(settings.url, "postgres://app@localhost/app");
    }

    #[tokio::test]
    async fn test_connect_pool_sqlite() {
        sqlx::any::install_default_drivers();
        let temp_dir = TempDir::new().unwrap();
        let context = context_without_config(temp_dir.path());
        let db_path = temp_dir.path().join("app.db");

        let settings = context
            .resolve_connection(Some("sqlite"), db_path.to_str(), "development")
            .unwrap();
        let pool = context.connect_pool(&settings).await.unwrap();

        assert!(db_path.exists());
        pool.close().await;
    }

    #[test]
    fn test_resolve_seeds_dir() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("seeds")).unwrap();
        let context = context_without_config(temp_dir.path());

        let dir = context.resolve_seeds_dir(Some(Path::new("seeds"))).unwrap();
        assert_eq!(dir, temp_dir.path().join("seeds"));

        assert_eq!(
            context.resolve_seeds_dir(None),
            Err(ConfigError::MissingSeedDir)
        );
        assert!(matches!(
            context.resolve_seeds_dir(Some(Path::new("missing"))),
            Err(ConfigError::SeedDirNotFound { .. })
        ));
    }

    #[test]
    fn test_resolve_seeds_dir_from_config() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("seeds")).unwrap();
        let context = CommandContext {
            project_path: temp_dir.path().to_path_buf(),
            config: Some(Config::default()),
        };

        let dir = context.resolve_seeds_dir(None).unwrap();
        assert_eq!(dir, temp_dir.path().join("seeds"));
    }

    #[test]
    fn test_ledger_uses_configured_table() {
        let temp_dir = TempDir::new().unwrap();
        let context = CommandContext {
            project_path: temp_dir.path().to_path_buf(),
            config: Some(Config {
                ledger_table: "app_seeds".to_string(),
                ..Default::default()
            }),
        };

        let ledger = context.ledger(Dialect::SQLite).unwrap();
        assert_eq!(ledger.table(), "app_seeds");
        assert!(context.recursive());
    }
}
