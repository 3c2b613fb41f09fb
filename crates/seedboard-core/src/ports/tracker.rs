//! WorkTracker port - 作業管理サービス（GitHub Projects など）
//!
//! # 設計原則
//! - 各呼び出しは独立に失敗し得る。リトライはしない
//! - 複数オブジェクトをまとめて作るトランザクションは存在しない前提
//! - ハンドルは読み取り専用で共有される（`&self` のみ）

use async_trait::async_trait;

use crate::domain::{
    ApiError, Board, BoardId, Card, Column, ColumnId, ColumnPosition, ContentType, Issue,
    IssueId, IssueRequest, RepoRef,
};

#[async_trait]
pub trait WorkTracker: Send + Sync {
    async fn create_board(&self, repo: &RepoRef, name: &str) -> Result<Board, ApiError>;

    /// column を作成する。返ってくる表示位置に保証はない。
    ///
    /// 戻り値の `intended_index` は呼び出し側が上書きする。
    async fn create_column(&self, board_id: BoardId, name: &str) -> Result<Column, ApiError>;

    async fn move_column(
        &self,
        column_id: ColumnId,
        position: ColumnPosition,
    ) -> Result<(), ApiError>;

    async fn create_issue(&self, repo: &RepoRef, request: &IssueRequest)
    -> Result<Issue, ApiError>;

    async fn create_card(
        &self,
        column_id: ColumnId,
        content_id: IssueId,
        content_type: ContentType,
    ) -> Result<Card, ApiError>;
}
