// 設定ファイル読み込みサービス
//
// core::config はファイルI/Oを持たず、読み込みと検証はこのサービスで行う。

use crate::core::config::Config;
use anyhow::{bail, Context, Result};
use std::path::Path;
use tracing::debug;

/// 設定ファイル読み込みサービス
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader;

impl ConfigLoader {
    /// YAMLファイルから設定を読み込み、検証する
    pub fn from_file(path: &Path) -> Result<Config> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: Config = serde_saphyr::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        config
            .validate()
            .with_context(|| format!("Invalid config file: {:?}", path))?;

        debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    /// 設定ファイルを読み込む
    ///
    /// 明示的に指定されたパスが存在しない場合はエラー。
    /// 未指定の場合はデフォルトパス（`.geeder.yaml`）を探し、無ければ `None` を返す。
    pub fn load(explicit: Option<&Path>, project_path: &Path) -> Result<Option<Config>> {
        match explicit {
            Some(path) => {
                let path = if path.is_absolute() {
                    path.to_path_buf()
                } else {
                    project_path.join(path)
                };
                if !path.exists() {
                    bail!("Config file not found: {:?}", path);
                }
                Self::from_file(&path).map(Some)
            }
            None => {
                let path = project_path.join(Config::DEFAULT_CONFIG_PATH);
                if !path.exists() {
                    debug!("No config file found, using defaults");
                    return Ok(None);
                }
                Self::from_file(&path).map(Some)
            }
        }
    }
}
