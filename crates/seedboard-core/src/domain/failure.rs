//! Failure - 非致命的な失敗の記録
//!
//! 失敗は FailureReporter に送られ、実行結果を「失敗」にしますが、
//! 他の処理は止めません。

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use super::ids::IssueId;

/// 失敗がどの対象に紐づくか（診断に必要な文脈）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureSubject {
    /// folder の列挙に失敗
    Folder { path: PathBuf },
    /// column の作成・配置に失敗
    Column { name: String },
    /// タスクファイルの読み込み・分解・issue 作成に失敗
    TaskFile {
        file: String,
        title: Option<String>,
    },
    /// issue は作成済みだが card の作成に失敗
    Issue {
        file: String,
        id: IssueId,
        number: u64,
        title: String,
    },
    /// バックグラウンドタスクが panic した
    Task,
}

impl fmt::Display for FailureSubject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureSubject::Folder { path } => write!(f, "folder {}", path.display()),
            FailureSubject::Column { name } => write!(f, "column {name:?}"),
            FailureSubject::TaskFile { file, title: None } => write!(f, "{file}"),
            FailureSubject::TaskFile {
                file,
                title: Some(title),
            } => write!(f, "{file} ({title:?})"),
            FailureSubject::Issue {
                file,
                number,
                title,
                ..
            } => write!(f, "issue #{number} {title:?} from {file}"),
            FailureSubject::Task => f.write_str("background task"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub subject: FailureSubject,
    pub message: String,
}

impl Failure {
    pub fn new(subject: FailureSubject, message: impl Into<String>) -> Self {
        Self {
            subject,
            message: message.into(),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.subject, self.message)
    }
}
