//! Errors - エラー型と分類
//!
//! # 分類
//! - ProvisionError: 実行全体を止める致命的エラー（board 作成失敗）
//! - ApiError: リモート呼び出し 1 回分の失敗
//! - TaskFileError: タスクファイル 1 件分の失敗
//! - ConfigError: 設定ファイルの読み込み・検証エラー

use std::path::PathBuf;

use thiserror::Error;

/// リモート API 呼び出しの失敗。リトライはしません。
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// テスト用トラッカーなどが意図的に拒否した場合
    #[error("rejected: {0}")]
    Rejected(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse board config: {0}")]
    Parse(#[from] serde_yaml_ng::Error),

    #[error("invalid board config: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum TaskFileError {
    #[error("failed to read task file: {0}")]
    Read(#[from] std::io::Error),

    #[error("malformed front-matter: {0}")]
    FrontMatter(String),

    #[error("task file has no title attribute")]
    MissingTitle,
}

/// 実行全体を中断するエラー
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("failed to create board {name:?}: {source}")]
    CreateBoard {
        name: String,
        #[source]
        source: ApiError,
    },
}
