//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **GitHubTracker**: 本番用の WorkTracker（GitHub REST API）
//! - **InMemoryTracker**: 開発用・テスト用の WorkTracker（`--dry-run` でも使う）
//! - **FsTaskSource**: ローカルフォルダからタスクファイルを読む
//! - **CollectingReporter**: 失敗をログに出して保持する

pub mod github;
pub mod inmem_tracker;
pub mod fs_source;
pub mod reporter;

// 主要な型を再エクスポート
pub use self::github::GitHubTracker;
pub use self::inmem_tracker::{ColumnInsertion, InMemoryTracker, IssueRecord};
pub use self::fs_source::FsTaskSource;
pub use self::reporter::CollectingReporter;
