//! Domain identifiers (strongly-typed IDs).
//!
//! リモートサービスが払い出す識別子はどれも整数ですが、
//! Phantom type パターンで種類ごとに別の型として扱います。
//!
//! ## Phantom Type パターン
//! `Id<T>` というジェネリック型で共通実装を提供しつつ、
//! `T` は実行時には使わない（PhantomData）マーカー型として、
//! コンパイル時の型安全性を提供します。
//! ColumnId を IssueId の位置に渡すようなミスはコンパイルエラーになります。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;

/// IdMarker は各 ID 型のマーカー trait
///
/// Debug 表示で使う種類名（"board", "column" など）を提供します。
pub trait IdMarker: Send + Sync + 'static {
    fn kind() -> &'static str;
}

/// ジェネリック ID 型
///
/// Display はリモート API にそのまま渡せる数値表現です（`"after:42"` など）。
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id<T: IdMarker> {
    value: u64,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

impl<T: IdMarker> Id<T> {
    pub fn new(value: u64) -> Self {
        Self {
            value,
            _marker: PhantomData,
        }
    }

    pub fn get(&self) -> u64 {
        self.value
    }
}

impl<T: IdMarker> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<T: IdMarker> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", T::kind(), self.value)
    }
}

// ========================================
// マーカー型の定義
// ========================================

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BoardMarker {}

impl IdMarker for BoardMarker {
    fn kind() -> &'static str {
        "board"
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ColumnMarker {}

impl IdMarker for ColumnMarker {
    fn kind() -> &'static str {
        "column"
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IssueMarker {}

impl IdMarker for IssueMarker {
    fn kind() -> &'static str {
        "issue"
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CardMarker {}

impl IdMarker for CardMarker {
    fn kind() -> &'static str {
        "card"
    }
}

// ========================================
// Type Alias（使いやすさのため）
// ========================================

/// Identifier of a project board.
pub type BoardId = Id<BoardMarker>;

/// Identifier of a column (lane) on a board.
pub type ColumnId = Id<ColumnMarker>;

/// Identifier of an issue. This is the global id, not the per-repo number.
pub type IssueId = Id<IssueMarker>;

/// Identifier of a card attached to a column.
pub type CardId = Id<CardMarker>;
