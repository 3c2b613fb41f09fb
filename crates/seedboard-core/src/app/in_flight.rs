//! InFlight - 実行中のバックグラウンド処理の集合
//!
//! ファイルごとのパイプラインと column の move キューはすべてここに登録され、
//! 最終ステータスを決める前に `join_all` で全件待ち合わせます（fan-out / fan-in）。
//! 一件の失敗で他を打ち切ることはありません。

use std::future::Future;
use std::sync::Arc;

use tokio::task::JoinSet;

use crate::domain::{Card, Failure, FailureSubject, Issue};
use crate::ports::FailureReporter;

/// タスクファイル 1 件分の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    pub file: String,
    /// 作成に成功した issue
    pub issue: Option<Issue>,
    /// 作成に成功した card（issue があっても None のことがある）
    pub card: Option<Card>,
}

impl FileOutcome {
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            issue: None,
            card: None,
        }
    }
}

/// バックグラウンド処理 1 本の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkOutcome {
    /// move キューが受理された move の数を返して終了した
    Positioned { moved: usize },
    File(FileOutcome),
}

pub struct InFlight {
    tasks: JoinSet<WorkOutcome>,
    reporter: Arc<dyn FailureReporter>,
}

impl InFlight {
    pub fn new(reporter: Arc<dyn FailureReporter>) -> Self {
        Self {
            tasks: JoinSet::new(),
            reporter,
        }
    }

    pub fn spawn<F>(&mut self, work: F)
    where
        F: Future<Output = WorkOutcome> + Send + 'static,
    {
        self.tasks.spawn(work);
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// 全件の完了を待つ。panic したタスクは失敗として報告する。
    pub async fn join_all(mut self) -> Vec<WorkOutcome> {
        let mut outcomes = Vec::with_capacity(self.tasks.len());
        while let Some(joined) = self.tasks.join_next().await {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => self.reporter.report(Failure::new(
                    FailureSubject::Task,
                    format!("background work did not finish: {e}"),
                )),
            }
        }
        outcomes
    }
}
