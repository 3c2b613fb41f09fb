//! RunReport - 1 回の実行結果
//!
//! すべてのバックグラウンド処理が終わってから組み立てるので、
//! ここにある件数とステータスは確定値です。

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{Board, Card, Column, Failure, Issue};

use super::in_flight::WorkOutcome;
use super::provisioner::ProvisionedBoard;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Succeeded,
    /// 一件でも失敗が報告された
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub board: Board,
    pub columns: Vec<Column>,
    /// 受理された move の数
    pub columns_positioned: usize,
    pub issues: Vec<Issue>,
    pub cards: Vec<Card>,
    pub failures: Vec<Failure>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub status: RunStatus,
}

impl RunReport {
    pub fn assemble(
        provisioned: ProvisionedBoard,
        outcomes: Vec<WorkOutcome>,
        failures: Vec<Failure>,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> Self {
        let mut columns_positioned = 0;
        let mut issues = Vec::new();
        let mut cards = Vec::new();

        for outcome in outcomes {
            match outcome {
                WorkOutcome::Positioned { moved } => columns_positioned += moved,
                WorkOutcome::File(file) => {
                    issues.extend(file.issue);
                    cards.extend(file.card);
                }
            }
        }
        issues.sort_by_key(|issue| issue.number);

        let status = if failures.is_empty() {
            RunStatus::Succeeded
        } else {
            RunStatus::Failed
        };

        Self {
            board: provisioned.board,
            columns: provisioned.columns,
            columns_positioned,
            issues,
            cards,
            failures,
            started_at,
            finished_at,
            status,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.status == RunStatus::Succeeded
    }
}
