// シードソース
//
// 実行するシードの順序付きリストを供給するインターフェースと、
// ディレクトリから `*.sql` ファイルを読み込む実装を提供します。

use crate::core::error::SourceError;
use crate::core::naming;
use crate::core::seed::Seed;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// シードソースのトレイト
///
/// `load` が返す順序がそのまま実行順序になります。
pub trait SeedSource {
    /// シードを順序付きで読み込む
    fn load(&self) -> Result<Vec<Seed>, SourceError>;
}

impl SeedSource for Vec<Seed> {
    fn load(&self) -> Result<Vec<Seed>, SourceError> {
        Ok(self.clone())
    }
}

/// ディレクトリ上の `*.sql` ファイルを読み込むシードソース
///
/// - 拡張子が `.sql` の通常ファイルのみ対象
/// - ファイル名（パスではなくベース名）のバイト順で昇順ソート
/// - シード名はファイル名（拡張子込み）
/// - 一致するファイルが無い場合は空リスト（エラーではない）
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
    recursive: bool,
}

impl DirectorySource {
    /// 新しいDirectorySourceを作成（サブディレクトリも探索する）
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            recursive: true,
        }
    }

    /// サブディレクトリを探索するかどうかを設定
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// `.sql` ファイルのパスを収集
    fn collect_sql_paths(&self, dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), SourceError> {
        let entries = fs::read_dir(dir).map_err(|source| SourceError::ReadDir {
            path: dir.to_path_buf(),
            source,
        })?;

        for entry in entries {
            let entry = entry.map_err(|source| SourceError::ReadDir {
                path: dir.to_path_buf(),
                source,
            })?;
            let file_type = entry.file_type().map_err(|source| SourceError::ReadDir {
                path: dir.to_path_buf(),
                source,
            })?;
            let path = entry.path();

            // ディレクトリへのシンボリックリンクは辿らない
            if file_type.is_dir() {
                if self.recursive {
                    self.collect_sql_paths(&path, out)?;
                }
                continue;
            }

            if is_seed_file(&path) {
                out.push(path);
            }
        }

        Ok(())
    }
}

impl SeedSource for DirectorySource {
    fn load(&self) -> Result<Vec<Seed>, SourceError> {
        if self.root.exists() && !self.root.is_dir() {
            return Err(SourceError::NotADirectory {
                path: self.root.clone(),
            });
        }

        let mut paths = Vec::new();
        self.collect_sql_paths(&self.root, &mut paths)?;

        // ベース名で並べ、同名はパスで決定的に並べる
        paths.sort_by(|a, b| {
            base_name(a)
                .as_bytes()
                .cmp(base_name(b).as_bytes())
                .then_with(|| a.cmp(b))
        });

        let mut seen: HashMap<String, PathBuf> = HashMap::new();
        let mut seeds = Vec::with_capacity(paths.len());
        for path in paths {
            let name = base_name(&path);
            if let Some(first) = seen.get(&name) {
                return Err(SourceError::DuplicateName {
                    name,
                    first: first.clone(),
                    second: path,
                });
            }

            let sql = fs::read_to_string(&path).map_err(|source| SourceError::ReadFile {
                path: path.clone(),
                source,
            })?;
            seen.insert(name.clone(), path);
            seeds.push(Seed::new(name, sql));
        }

        debug!(root = %self.root.display(), count = seeds.len(), "Loaded seed files");
        Ok(seeds)
    }
}

/// シードファイルかどうか（拡張子 `.sql`）
fn is_seed_file(path: &Path) -> bool {
    path.is_file() && path.extension().and_then(|e| e.to_str()) == Some(naming::SEED_EXTENSION)
}

/// ファイルのベース名
fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
