// 命名ポリシー
//
// 設定ファイル名、台帳テーブル名、環境変数名の単一ソースを提供します。

/// 既定の設定ファイル名
pub const CONFIG_FILE: &str = ".geeder.yaml";

/// 既定のシードディレクトリ
pub const SEEDS_DIR: &str = "seeds";

/// 実行済みシードを記録する台帳テーブル名
pub const LEDGER_TABLE: &str = "geeder_seeds";

/// シードファイルの拡張子
pub const SEED_EXTENSION: &str = "sql";

/// 既定の環境名
pub const DEFAULT_ENV: &str = "development";

/// シードディレクトリを指定する環境変数
pub const ENV_DIR: &str = "GEEDER_DIR";

/// ドライバー名を指定する環境変数
pub const ENV_DRIVER: &str = "GEEDER_DRIVER";

/// 接続文字列を指定する環境変数
pub const ENV_DSN: &str = "GEEDER_DSN";
