//! Board / Column の型と、ボード設定（BoardSpec）。

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::ConfigError;
use super::ids::{BoardId, ColumnId};

/// ボード設定。設定ファイルから読み込まれ、検証済みの状態でのみ存在します。
///
/// `columns` の並びが表示順の意図です（index 0 が先頭）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardSpec {
    pub name: String,
    pub columns: Vec<String>,
    pub folder: PathBuf,
}

impl BoardSpec {
    pub fn new(
        name: impl Into<String>,
        columns: impl IntoIterator<Item = impl Into<String>>,
        folder: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            folder: folder.into(),
        }
    }
}

/// ボードと issue を置くリポジトリ（`owner/repo`）。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }
}

impl FromStr for RepoRef {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().split_once('/') {
            Some((owner, repo))
                if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') =>
            {
                Ok(Self::new(owner, repo))
            }
            _ => Err(ConfigError::Invalid(format!(
                "repository must look like owner/repo, got {s:?}"
            ))),
        }
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// 作成済みのボード。以降の column 操作はすべて `id` を必要とします。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub id: BoardId,
    pub name: String,
    pub repo: RepoRef,
}

/// 作成済みの column。
///
/// `intended_index` は設定上の位置で、リモートが返した順序とは無関係です。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: ColumnId,
    pub name: String,
    pub intended_index: usize,
}

/// column の配置指示
///
/// 相対的なカウンタではなく「どの column の後ろか」を自分で持っているので、
/// 指示ごとに完結しています。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnPosition {
    First,
    After(ColumnId),
}

impl fmt::Display for ColumnPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnPosition::First => f.write_str("first"),
            ColumnPosition::After(id) => write!(f, "after:{id}"),
        }
    }
}

/// column の状態遷移
///
/// Requested → Created → Positioned。move の完了（Confirmed）は待ちません。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnState {
    Requested,
    Created,
    Positioned,
}
