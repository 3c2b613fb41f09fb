//! App - アプリケーション層
//!
//! このモジュールは、ports を組み合わせてアプリケーションロジックを実装します。
//!
//! # 主要コンポーネント
//! - **AppBuilder**: アプリケーションの構築とワイヤリング
//! - **BoardProvisioner**: board と column の作成・並べ替え
//! - **IssueGenerator**: タスクファイル → issue → card のパイプライン
//! - **InFlight**: 起動したバックグラウンド処理の待ち合わせ
//! - **RunReport**: 実行結果

pub mod builder;
pub mod provisioner;
pub mod issue_generator;
pub mod in_flight;
pub mod report;

// 主要な型を再エクスポート
pub use self::builder::{App, AppBuilder, BuildError};
pub use self::provisioner::{BoardProvisioner, ColumnChain, ProvisionedBoard};
pub use self::issue_generator::IssueGenerator;
pub use self::in_flight::{FileOutcome, InFlight, WorkOutcome};
pub use self::report::{RunReport, RunStatus};
