//! InMemoryTracker - 開発用・テスト用の作業管理サービス
//!
//! # 学習ポイント
//! - リモートサービスの「作成順と表示順が一致しない」性質の再現
//! - 失敗注入（board / column / move / issue / card）
//! - move の遅延注入（後から出した move ほど先に終わる）
//! - tokio::sync::Mutex による状態管理（ロックを跨いで await しない）

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tokio::sync::Mutex;

use crate::domain::{
    ApiError, Board, BoardId, Card, CardId, Column, ColumnId, ColumnPosition, ContentType, Issue,
    IssueId, IssueRequest, RepoRef,
};
use crate::ports::WorkTracker;

/// 新しい column を表示順のどこに差し込むか
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnInsertion {
    /// ランダムな位置（リモートサービスの振る舞いに近い）
    #[default]
    Random,
    /// 常に先頭（作成順の逆になる）
    Front,
    /// 常に末尾
    Back,
}

/// 作成済み issue の記録
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueRecord {
    pub repo: RepoRef,
    pub request: IssueRequest,
    pub issue: Issue,
}

#[derive(Debug, Default)]
struct Faults {
    board: bool,
    columns: HashSet<String>,
    moves: HashSet<String>,
    issues: HashSet<String>,
    cards: HashSet<String>,
}

#[derive(Debug, Default)]
struct TrackerState {
    next_id: u64,
    boards: Vec<Board>,
    /// board ごとの表示順
    layouts: HashMap<BoardId, Vec<ColumnId>>,
    columns: HashMap<ColumnId, (BoardId, String)>,
    issues: Vec<IssueRecord>,
    issue_numbers: HashMap<RepoRef, u64>,
    cards: Vec<Card>,
    moves: usize,
}

impl TrackerState {
    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// InMemoryTracker は WorkTracker のインメモリ実装
///
/// # 使用例
/// ```ignore
/// let tracker = InMemoryTracker::new()
///     .with_insertion(ColumnInsertion::Front)
///     .fail_issue("Flaky");
/// ```
pub struct InMemoryTracker {
    state: Mutex<TrackerState>,
    faults: Faults,
    insertion: ColumnInsertion,
    move_latency: Option<Duration>,
    move_calls: AtomicU32,
}

impl InMemoryTracker {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(TrackerState::default()),
            faults: Faults::default(),
            insertion: ColumnInsertion::default(),
            move_latency: None,
            move_calls: AtomicU32::new(0),
        }
    }

    pub fn with_insertion(mut self, insertion: ColumnInsertion) -> Self {
        self.insertion = insertion;
        self
    }

    /// n 回目の move の応答を `base / n` だけ遅らせる
    ///
    /// 同時に出した move は後のものほど先に適用される。
    pub fn with_shrinking_move_latency(mut self, base: Duration) -> Self {
        self.move_latency = Some(base);
        self
    }

    pub fn fail_board(mut self) -> Self {
        self.faults.board = true;
        self
    }

    pub fn fail_column(mut self, name: impl Into<String>) -> Self {
        self.faults.columns.insert(name.into());
        self
    }

    /// 指定した名前の column に対する move を拒否する
    pub fn fail_move(mut self, column_name: impl Into<String>) -> Self {
        self.faults.moves.insert(column_name.into());
        self
    }

    pub fn fail_issue(mut self, title: impl Into<String>) -> Self {
        self.faults.issues.insert(title.into());
        self
    }

    /// 指定したタイトルの issue に対する card 作成を拒否する
    pub fn fail_card(mut self, issue_title: impl Into<String>) -> Self {
        self.faults.cards.insert(issue_title.into());
        self
    }

    pub async fn boards(&self) -> Vec<Board> {
        self.state.lock().await.boards.clone()
    }

    /// board 上の column 名を表示順で返す
    pub async fn column_names(&self, board_id: BoardId) -> Vec<String> {
        let state = self.state.lock().await;
        state
            .layouts
            .get(&board_id)
            .map(|layout| {
                layout
                    .iter()
                    .filter_map(|id| state.columns.get(id).map(|(_, name)| name.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub async fn column_id(&self, board_id: BoardId, name: &str) -> Option<ColumnId> {
        let state = self.state.lock().await;
        state
            .columns
            .iter()
            .find(|(_, (board, column))| *board == board_id && column == name)
            .map(|(id, _)| *id)
    }

    pub async fn issues(&self) -> Vec<IssueRecord> {
        self.state.lock().await.issues.clone()
    }

    pub async fn cards(&self) -> Vec<Card> {
        self.state.lock().await.cards.clone()
    }

    /// 受け付けた move の回数
    pub async fn move_count(&self) -> usize {
        self.state.lock().await.moves
    }
}

impl Default for InMemoryTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WorkTracker for InMemoryTracker {
    async fn create_board(&self, repo: &RepoRef, name: &str) -> Result<Board, ApiError> {
        tokio::task::yield_now().await;
        if self.faults.board {
            return Err(ApiError::Rejected(format!("board {name:?}")));
        }

        let mut state = self.state.lock().await;
        let board = Board {
            id: BoardId::new(state.allocate_id()),
            name: name.to_string(),
            repo: repo.clone(),
        };
        state.layouts.insert(board.id, Vec::new());
        state.boards.push(board.clone());
        Ok(board)
    }

    async fn create_column(&self, board_id: BoardId, name: &str) -> Result<Column, ApiError> {
        tokio::task::yield_now().await;
        if self.faults.columns.contains(name) {
            return Err(ApiError::Rejected(format!("column {name:?}")));
        }

        let mut state = self.state.lock().await;
        let id = ColumnId::new(state.allocate_id());
        let Some(layout) = state.layouts.get_mut(&board_id) else {
            return Err(ApiError::Rejected(format!("unknown board {board_id:?}")));
        };
        let at = match self.insertion {
            ColumnInsertion::Random => rand::thread_rng().gen_range(0..=layout.len()),
            ColumnInsertion::Front => 0,
            ColumnInsertion::Back => layout.len(),
        };
        layout.insert(at, id);
        state.columns.insert(id, (board_id, name.to_string()));

        Ok(Column {
            id,
            name: name.to_string(),
            intended_index: 0,
        })
    }

    async fn move_column(
        &self,
        column_id: ColumnId,
        position: ColumnPosition,
    ) -> Result<(), ApiError> {
        let nth = self.move_calls.fetch_add(1, Ordering::SeqCst) + 1;
        match self.move_latency {
            Some(base) => tokio::time::sleep(base / nth).await,
            None => tokio::task::yield_now().await,
        }
        let mut state = self.state.lock().await;
        let Some((board_id, name)) = state.columns.get(&column_id).cloned() else {
            return Err(ApiError::Rejected(format!("unknown column {column_id:?}")));
        };
        if self.faults.moves.contains(&name) {
            return Err(ApiError::Rejected(format!("move of column {name:?}")));
        }

        let Some(layout) = state.layouts.get_mut(&board_id) else {
            return Err(ApiError::Rejected(format!("unknown board {board_id:?}")));
        };
        if let ColumnPosition::After(anchor) = position
            && (anchor == column_id || !layout.contains(&anchor))
        {
            return Err(ApiError::Rejected(format!(
                "anchor {anchor:?} is not on board {board_id:?}"
            )));
        }
        layout.retain(|id| *id != column_id);
        let at = match position {
            ColumnPosition::First => 0,
            ColumnPosition::After(anchor) => match layout.iter().position(|id| *id == anchor) {
                Some(index) => index + 1,
                None => {
                    return Err(ApiError::Rejected(format!(
                        "anchor {anchor:?} is not on board {board_id:?}"
                    )));
                }
            },
        };
        layout.insert(at, column_id);
        state.moves += 1;
        Ok(())
    }

    async fn create_issue(
        &self,
        repo: &RepoRef,
        request: &IssueRequest,
    ) -> Result<Issue, ApiError> {
        tokio::task::yield_now().await;
        if self.faults.issues.contains(&request.title) {
            return Err(ApiError::Rejected(format!("issue {:?}", request.title)));
        }

        let mut state = self.state.lock().await;
        let id = IssueId::new(state.allocate_id());
        let number = {
            let counter = state.issue_numbers.entry(repo.clone()).or_insert(0);
            *counter += 1;
            *counter
        };
        let issue = Issue {
            id,
            number,
            title: request.title.clone(),
        };
        state.issues.push(IssueRecord {
            repo: repo.clone(),
            request: request.clone(),
            issue: issue.clone(),
        });
        Ok(issue)
    }

    async fn create_card(
        &self,
        column_id: ColumnId,
        content_id: IssueId,
        content_type: ContentType,
    ) -> Result<Card, ApiError> {
        tokio::task::yield_now().await;
        let mut state = self.state.lock().await;

        let Some(title) = state
            .issues
            .iter()
            .find(|record| record.issue.id == content_id)
            .map(|record| record.issue.title.clone())
        else {
            return Err(ApiError::Rejected(format!("unknown issue {content_id:?}")));
        };
        if self.faults.cards.contains(&title) {
            return Err(ApiError::Rejected(format!("card for {title:?}")));
        }
        if !state.columns.contains_key(&column_id) {
            return Err(ApiError::Rejected(format!("unknown column {column_id:?}")));
        }

        let card = Card {
            id: CardId::new(state.allocate_id()),
            column_id,
            content_id,
            content_type,
        };
        state.cards.push(card.clone());
        Ok(card)
    }
}
