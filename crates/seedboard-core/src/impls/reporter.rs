//! CollectingReporter - 失敗をログに出しつつ溜めておく FailureReporter

use std::sync::Mutex;

use crate::domain::Failure;
use crate::ports::FailureReporter;

/// 報告された失敗を到着順に保持する
///
/// `report` は同期関数なので std の Mutex で十分（await を跨がない）。
#[derive(Debug, Default)]
pub struct CollectingReporter {
    failures: Mutex<Vec<Failure>>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failures(&self) -> Vec<Failure> {
        self.failures
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn has_failed(&self) -> bool {
        !self
            .failures
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .is_empty()
    }
}

impl FailureReporter for CollectingReporter {
    fn report(&self, failure: Failure) {
        tracing::error!(subject = %failure.subject, "{}", failure.message);
        self.failures
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(failure);
    }
}
