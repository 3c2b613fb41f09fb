//! Ports - 抽象化レイヤー
//!
//! このモジュールは Hexagonal Architecture の「ポート」を定義します。
//! 各 trait は外部システム（作業管理サービス、ファイルシステム、失敗の報告先、時刻）への
//! インターフェースを提供し、実装の詳細を隠蔽します。

pub mod tracker;
pub mod task_source;
pub mod reporter;
pub mod clock;

// 主要な trait を再エクスポート
pub use self::tracker::WorkTracker;
pub use self::task_source::TaskSource;
pub use self::reporter::FailureReporter;
pub use self::clock::{Clock, FixedClock, SystemClock};
