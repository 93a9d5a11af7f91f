// Geederライブラリのエントリーポイント
//
// モジュール構造:
// - cli: CLIレイヤー（ユーザー入力の受付とコマンドルーティング）
// - core: コアドメイン（シード、台帳エントリ、設定、エラー型）
// - adapters: データベースとファイルシステムへのアクセスを抽象化
// - services: シードの登録・実行・状態照会

pub mod adapters;
pub mod cli;
pub mod core;
pub mod services;
