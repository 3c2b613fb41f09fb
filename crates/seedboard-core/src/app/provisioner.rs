//! BoardProvisioner - board と column を設定どおりの順序で作る
//!
//! # フロー
//! 1. WorkTracker::create_board()（失敗したら実行全体を中断）
//! 2. column ごとに（設定の順番で、直列に）
//!    - create_column() で id を得る
//!    - index 0 なら IssueGenerator を起動（待たない）
//!    - 配置指示を MoveQueue に積む（`first` / `after:<直前の column>`）
//!
//! リモートサービスは作成順に並べてくれないので、column ごとに
//! 「直前に作った column の後ろ」を明示します。帰納的に全体の順序が決まります。

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::domain::{
    Board, BoardSpec, Column, ColumnId, ColumnPosition, ColumnState, Failure, FailureSubject,
    ProvisionError, RepoRef,
};
use crate::ports::{FailureReporter, WorkTracker};

use super::in_flight::{InFlight, WorkOutcome};
use super::issue_generator::IssueGenerator;

/// 直前の column を次の反復へ渡すアキュムレータ
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnChain {
    previous: Option<ColumnId>,
}

impl ColumnChain {
    /// `column` の配置指示と、次の反復で使うチェーンを返す
    pub fn place(self, column: ColumnId) -> (ColumnPosition, ColumnChain) {
        let position = match self.previous {
            None => ColumnPosition::First,
            Some(previous) => ColumnPosition::After(previous),
        };
        (
            position,
            ColumnChain {
                previous: Some(column),
            },
        )
    }
}

/// 配置指示 1 件
#[derive(Debug, Clone)]
struct ColumnMove {
    column_id: ColumnId,
    name: String,
    position: ColumnPosition,
}

/// move を受け取った順に一件ずつ適用するバックグラウンドキュー
///
/// 呼び出し側は完了を待たない。送信側を drop するとキューは残りを流して終わる。
struct MoveQueue {
    tx: mpsc::UnboundedSender<ColumnMove>,
    reporter: Arc<dyn FailureReporter>,
}

impl MoveQueue {
    fn spawn(
        tracker: Arc<dyn WorkTracker>,
        reporter: Arc<dyn FailureReporter>,
        in_flight: &mut InFlight,
    ) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<ColumnMove>();
        let worker_reporter = reporter.clone();

        in_flight.spawn(async move {
            let mut moved = 0;
            while let Some(m) = rx.recv().await {
                tracing::debug!(column = %m.name, position = %m.position, "moving column");
                match tracker.move_column(m.column_id, m.position).await {
                    Ok(()) => moved += 1,
                    Err(e) => worker_reporter.report(Failure::new(
                        FailureSubject::Column { name: m.name },
                        format!("Failed to move the column to {}: {e}", m.position),
                    )),
                }
            }
            WorkOutcome::Positioned { moved }
        });

        Self { tx, reporter }
    }

    fn submit(&self, m: ColumnMove) {
        if let Err(mpsc::error::SendError(m)) = self.tx.send(m) {
            self.reporter.report(Failure::new(
                FailureSubject::Column { name: m.name },
                "column move queue stopped before the move was issued",
            ));
        }
    }
}

/// 作成済みの board と、作成できた column（設定順）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionedBoard {
    pub board: Board,
    pub columns: Vec<Column>,
}

pub struct BoardProvisioner {
    tracker: Arc<dyn WorkTracker>,
    reporter: Arc<dyn FailureReporter>,
    repo: RepoRef,
    generator: IssueGenerator,
}

impl BoardProvisioner {
    pub fn new(
        tracker: Arc<dyn WorkTracker>,
        reporter: Arc<dyn FailureReporter>,
        repo: RepoRef,
        generator: IssueGenerator,
    ) -> Self {
        Self {
            tracker,
            reporter,
            repo,
            generator,
        }
    }

    /// board と column を作る
    ///
    /// move と issue 生成は `in_flight` に登録されるだけで、ここでは待たない。
    /// column の作成に失敗した場合は報告してそこで打ち切る（後続は直前の id が無いと配置できない）。
    pub async fn provision(
        &self,
        spec: &BoardSpec,
        in_flight: &mut InFlight,
    ) -> Result<ProvisionedBoard, ProvisionError> {
        tracing::debug!(board = %spec.name, repo = %self.repo, "creating project board");
        let board = self
            .tracker
            .create_board(&self.repo, &spec.name)
            .await
            .map_err(|source| ProvisionError::CreateBoard {
                name: spec.name.clone(),
                source,
            })?;

        let moves = MoveQueue::spawn(self.tracker.clone(), self.reporter.clone(), in_flight);
        let mut columns = Vec::with_capacity(spec.columns.len());
        let mut chain = ColumnChain::default();

        for (index, name) in spec.columns.iter().enumerate() {
            tracing::debug!(column = %name, index, state = ?ColumnState::Requested, "adding column");
            let created = match self.tracker.create_column(board.id, name).await {
                Ok(created) => created,
                Err(e) => {
                    self.reporter.report(Failure::new(
                        FailureSubject::Column { name: name.clone() },
                        format!("Failed to create the column: {e}"),
                    ));
                    break;
                }
            };
            let column = Column {
                intended_index: index,
                ..created
            };
            tracing::debug!(column = %column.name, id = %column.id, state = ?ColumnState::Created, "column created");

            if index == 0 {
                let spawned = self.generator.spawn_all(&spec.folder, column.id, in_flight);
                tracing::debug!(folder = %spec.folder.display(), files = spawned, "generating issues");
            }

            let (position, next) = chain.place(column.id);
            chain = next;
            moves.submit(ColumnMove {
                column_id: column.id,
                name: column.name.clone(),
                position,
            });
            tracing::debug!(column = %column.name, %position, state = ?ColumnState::Positioned, "column move issued");

            columns.push(column);
        }

        Ok(ProvisionedBoard { board, columns })
    }
}
