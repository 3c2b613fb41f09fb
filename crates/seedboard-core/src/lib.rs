//! seedboard-core
//!
//! 宣言的な設定からプロジェクトボードを組み立てるためのコア。
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, board, task, failure, errors）
//! - **ports**: 抽象化レイヤー（WorkTracker, TaskSource, FailureReporter, Clock）
//! - **app**: アプリケーションロジック（builder, provisioner, issue_generator, in_flight, report）
//! - **impls**: 実装（GitHubTracker, InMemoryTracker, FsTaskSource, CollectingReporter）
//! - **config**: ボード設定ファイルの読み込みと検証
//! - **frontmatter**: タスクファイルの front-matter 分解

pub mod domain;
pub mod ports;
pub mod app;
pub mod impls;
pub mod config;
pub mod frontmatter;
