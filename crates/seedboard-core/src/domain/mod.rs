//! Domain model (IDs, board, task files, failures, errors).

pub mod ids;
pub mod board;
pub mod task;
pub mod failure;
pub mod errors;

pub use self::ids::{BoardId, CardId, ColumnId, IssueId};
pub use self::board::{Board, BoardSpec, Column, ColumnPosition, ColumnState, RepoRef};
pub use self::task::{Card, ContentType, Issue, IssueRequest, ListAttribute, TaskAttributes, TaskFile};
pub use self::failure::{Failure, FailureSubject};
pub use self::errors::{ApiError, ConfigError, ProvisionError, TaskFileError};
