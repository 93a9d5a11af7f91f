// Services Layer
// シードの登録・実行・状態照会と、設定の読み込みを行うサービス層

pub mod config_loader;
pub mod database_config_resolver;
pub mod seed_registry;
pub mod seed_runner;
pub mod status_reporter;
