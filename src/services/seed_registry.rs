// シードレジストリ
//
// 名前付きシードを登録順に保持するスレッドセーフなレジストリ。
// 登録リストと名前インデックスを1つのMutexで保護する。

use crate::adapters::seed_source::SeedSource;
use crate::core::error::{RegistrationError, SourceError};
use crate::core::seed::Seed;
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};
use tracing::debug;

#[derive(Debug, Default)]
struct RegistryState {
    seeds: Vec<Seed>,
    names: HashSet<String>,
}

/// シードレジストリ
///
/// 通常は呼び出し側が所有しますが、プロセス全体で共有する場合は
/// [`SeedRegistry::global`] を使用できます。
#[derive(Debug, Default)]
pub struct SeedRegistry {
    state: Mutex<RegistryState>,
}

impl SeedRegistry {
    /// 空のレジストリを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// プロセス全体で共有されるレジストリ
    pub fn global() -> &'static SeedRegistry {
        static GLOBAL: OnceLock<SeedRegistry> = OnceLock::new();
        GLOBAL.get_or_init(SeedRegistry::new)
    }

    /// シードを登録
    ///
    /// 空の名前・空のSQL・登録済みの名前は拒否され、レジストリは変更されません。
    /// 空白文字（改行を含む）のみのSQLも空として扱います。
    pub fn register(
        &self,
        name: impl Into<String>,
        sql: impl Into<String>,
    ) -> Result<(), RegistrationError> {
        let name = name.into();
        let sql = sql.into();

        if name.is_empty() {
            return Err(RegistrationError::EmptyName);
        }
        if sql.trim().is_empty() {
            return Err(RegistrationError::EmptySql { name });
        }

        let mut state = self.lock();
        if state.names.contains(&name) {
            return Err(RegistrationError::Duplicate { name });
        }

        debug!(seed = %name, "Registered seed");
        state.names.insert(name.clone());
        state.seeds.push(Seed::new(name, sql));
        Ok(())
    }

    /// 登録済みシードのスナップショット（登録順）
    pub fn list(&self) -> Vec<Seed> {
        self.lock().seeds.clone()
    }

    /// すべての登録を削除
    pub fn reset(&self) {
        let mut state = self.lock();
        state.seeds.clear();
        state.names.clear();
    }

    /// 登録数
    pub fn len(&self) -> usize {
        self.lock().seeds.len()
    }

    /// 登録が空かどうか
    pub fn is_empty(&self) -> bool {
        self.lock().seeds.is_empty()
    }

    // 状態の変更は検証後にのみ行うため、ポイズン状態でも内容は一貫している
    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SeedSource for SeedRegistry {
    fn load(&self) -> Result<Vec<Seed>, SourceError> {
        Ok(self.list())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_register_and_list_in_order() {
        let registry = SeedRegistry::new();
        registry.register("seed_b", "SELECT 2").unwrap();
        registry.register("seed_a", "SELECT 1").unwrap();

        let names: Vec<String> = registry.list().iter().map(|s| s.name().to_string()).collect();
        assert_eq!(names, vec!["seed_b", "seed_a"]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_register_duplicate_rejected() {
        let registry = SeedRegistry::new();
        registry.register("seed_1", "SELECT 1").unwrap();

        let result = registry.register("seed_1", "SELECT 2");
        assert_eq!(
            result,
            Err(RegistrationError::Duplicate {
                name: "seed_1".to_string()
            })
        );

        let seeds = registry.list();
        assert_eq!(seeds.len(), 1);
        assert_eq!(seeds[0].sql(), "SELECT 1");
    }

    #[test]
    fn test_register_empty_values_rejected() {
        let registry = SeedRegistry::new();

        assert_eq!(
            registry.register("", "SELECT 1"),
            Err(RegistrationError::EmptyName)
        );
        assert_eq!(
            registry.register("seed_1", "   "),
            Err(RegistrationError::EmptySql {
                name: "seed_1".to_string()
            })
        );
        assert_eq!(
            registry.register("seed_2", " \n\t"),
            Err(RegistrationError::EmptySql {
                name: "seed_2".to_string()
            })
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn test_reset() {
        let registry = SeedRegistry::new();
        registry.register("seed_1", "SELECT 1").unwrap();
        registry.reset();

        assert!(registry.is_empty());
        // リセット後は同じ名前を再登録できる
        assert!(registry.register("seed_1", "SELECT 1").is_ok());
    }

    #[test]
    fn test_list_is_snapshot() {
        let registry = SeedRegistry::new();
        registry.register("seed_1", "SELECT 1").unwrap();

        let snapshot = registry.list();
        registry.register("seed_2", "SELECT 2").unwrap();

        assert_eq!(snapshot.len(), 1);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_concurrent_registration() {
        let registry = Arc::new(SeedRegistry::new());

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    for i in 0..25 {
                        registry
                            .register(format!("seed_{}_{}", t, i), "SELECT 1")
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let seeds = registry.list();
        assert_eq!(seeds.len(), 200);
        let unique: HashSet<&str> = seeds.iter().map(|s| s.name()).collect();
        assert_eq!(unique.len(), 200);
    }

    #[test]
    fn test_registry_as_seed_source() {
        let registry = SeedRegistry::new();
        registry.register("seed_1", "SELECT 1").unwrap();

        let source: &dyn SeedSource = &registry;
        assert_eq!(source.load().unwrap(), registry.list());
    }
}
