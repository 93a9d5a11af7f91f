// Core Domain
// シード、台帳エントリ、設定、エラー型の純粋なドメイン定義

pub mod config;
pub mod error;
pub mod naming;
pub mod seed;
