//! FailureReporter port - プロセス全体で共有する失敗の報告先

use crate::domain::Failure;

/// 報告すると実行全体が「失敗」扱いになるが、進行中の他の処理は止めない。
pub trait FailureReporter: Send + Sync {
    fn report(&self, failure: Failure);
}
