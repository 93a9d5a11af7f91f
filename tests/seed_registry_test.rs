/// シードレジストリの統合テスト
///
/// 並行登録、登録の拒否、グローバルレジストリを検証します。

#[cfg(test)]
mod seed_registry_tests {
    use geeder::core::error::RegistrationError;
    use geeder::services::seed_registry::SeedRegistry;
    use std::collections::HashSet;
    use std::sync::Arc;

    /// 複数タスクからの並行登録で、すべての登録が1件ずつ残る
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_registration_from_tasks() {
        let registry = Arc::new(SeedRegistry::new());

        let handles: Vec<_> = (0..50)
            .map(|i| {
                let registry = Arc::clone(&registry);
                tokio::spawn(async move {
                    registry.register(format!("seed_{:03}", i), format!("SELECT {}", i))
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let seeds = registry.list();
        assert_eq!(seeds.len(), 50);
        let names: HashSet<&str> = seeds.iter().map(|s| s.name()).collect();
        assert_eq!(names.len(), 50);
    }

    /// 同じ名前の並行登録は1件だけ成功する
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_duplicate_registration() {
        let registry = Arc::new(SeedRegistry::new());

        let handles: Vec<_> = (0..20)
            .map(|_| {
                let registry = Arc::clone(&registry);
                tokio::spawn(async move { registry.register("seed_1", "SELECT 1") })
            })
            .collect();

        let mut succeeded = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(()) => succeeded += 1,
                Err(e) => assert_eq!(
                    e,
                    RegistrationError::Duplicate {
                        name: "seed_1".to_string()
                    }
                ),
            }
        }

        assert_eq!(succeeded, 1);
        assert_eq!(registry.len(), 1);
    }

    /// グローバルレジストリは同一インスタンスを返す
    #[test]
    fn test_global_registry_is_shared() {
        let first = SeedRegistry::global();
        let second = SeedRegistry::global();
        assert!(std::ptr::eq(first, second));

        first
            .register("global_registry_seed", "SELECT 1")
            .unwrap();
        assert!(second
            .list()
            .iter()
            .any(|s| s.name() == "global_registry_seed"));
    }
}
