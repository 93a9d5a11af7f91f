// Adapters
// データベースとファイルシステムへのアクセスを抽象化

pub mod connection_string;
pub mod database;
pub mod seed_ledger;
pub mod seed_source;
