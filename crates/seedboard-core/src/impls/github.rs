//! GitHubTracker - GitHub REST API（classic projects）による WorkTracker 実装
//!
//! | 操作 | エンドポイント |
//! |------|----------------|
//! | create_board  | `POST /repos/{owner}/{repo}/projects` |
//! | create_column | `POST /projects/{project_id}/columns` |
//! | move_column   | `POST /projects/columns/{column_id}/moves` |
//! | create_issue  | `POST /repos/{owner}/{repo}/issues` |
//! | create_card   | `POST /projects/columns/{column_id}/cards` |

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::domain::{
    ApiError, Board, BoardId, Card, CardId, Column, ColumnId, ColumnPosition, ContentType, Issue,
    IssueId, IssueRequest, RepoRef,
};
use crate::ports::WorkTracker;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

const API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!("seedboard/", env!("CARGO_PKG_VERSION"));

/// GitHub のエラーボディから人が読めるメッセージを取り出す
///
/// `message` と `errors[].message` を優先し、無ければボディをそのまま返す。
fn extract_error_message(body: &str) -> String {
    let Ok(json) = serde_json::from_str::<serde_json::Value>(body) else {
        return body.to_string();
    };
    let Some(message) = json.get("message").and_then(|v| v.as_str()) else {
        return body.to_string();
    };

    let details: Vec<&str> = json
        .get("errors")
        .and_then(|v| v.as_array())
        .map(|errors| {
            errors
                .iter()
                .filter_map(|e| e.get("message").and_then(|m| m.as_str()))
                .collect()
        })
        .unwrap_or_default();

    if details.is_empty() {
        message.to_string()
    } else {
        format!("{message} ({})", details.join("; "))
    }
}

#[derive(Debug, Deserialize)]
struct IdResponse {
    id: u64,
}

#[derive(Debug, Deserialize)]
struct IssueResponse {
    id: u64,
    number: u64,
    title: String,
}

#[derive(Debug, Serialize)]
struct NameBody<'a> {
    name: &'a str,
}

#[derive(Debug, Serialize)]
struct MoveBody {
    position: String,
}

#[derive(Debug, Serialize)]
struct CardBody {
    content_id: u64,
    content_type: &'static str,
}

/// GitHubTracker は GitHub API クライアント
///
/// ハンドルは共有される前提で、内部状態は持たない（reqwest::Client は Clone 可能）。
#[derive(Clone)]
pub struct GitHubTracker {
    client: Client,
    api_url: String,
    connect_timeout: Duration,
}

impl GitHubTracker {
    /// token で認証したクライアントを作る
    ///
    /// `api_url` は通常 [`DEFAULT_API_URL`]。GitHub Enterprise では別のベース URL を渡す。
    pub fn new(token: &str, api_url: &str, connect_timeout: Duration) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static(API_VERSION),
        );
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| ApiError::Rejected("token contains invalid characters".to_string()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .connect_timeout(connect_timeout)
            .build()?;

        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            connect_timeout,
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    /// HTTP ステータスを ApiError に写す
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Status {
            status: status.as_u16(),
            message: extract_error_message(&body),
        })
    }

    async fn post<B: Serialize + Sync, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, ApiError> {
        let response = self.client.post(self.url(path)).json(body).send().await?;
        let response = Self::check_response(response).await?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl WorkTracker for GitHubTracker {
    async fn create_board(&self, repo: &RepoRef, name: &str) -> Result<Board, ApiError> {
        let path = format!("/repos/{}/{}/projects", repo.owner, repo.repo);
        let created: IdResponse = self.post(&path, &NameBody { name }).await?;
        Ok(Board {
            id: BoardId::new(created.id),
            name: name.to_string(),
            repo: repo.clone(),
        })
    }

    async fn create_column(&self, board_id: BoardId, name: &str) -> Result<Column, ApiError> {
        let path = format!("/projects/{board_id}/columns");
        let created: IdResponse = self.post(&path, &NameBody { name }).await?;
        Ok(Column {
            id: ColumnId::new(created.id),
            name: name.to_string(),
            intended_index: 0,
        })
    }

    async fn move_column(
        &self,
        column_id: ColumnId,
        position: ColumnPosition,
    ) -> Result<(), ApiError> {
        let path = format!("/projects/columns/{column_id}/moves");
        let body = MoveBody {
            position: position.to_string(),
        };
        let response = self.client.post(self.url(&path)).json(&body).send().await?;
        Self::check_response(response).await?;
        Ok(())
    }

    async fn create_issue(
        &self,
        repo: &RepoRef,
        request: &IssueRequest,
    ) -> Result<Issue, ApiError> {
        let path = format!("/repos/{}/{}/issues", repo.owner, repo.repo);
        let created: IssueResponse = self.post(&path, request).await?;
        Ok(Issue {
            id: IssueId::new(created.id),
            number: created.number,
            title: created.title,
        })
    }

    async fn create_card(
        &self,
        column_id: ColumnId,
        content_id: IssueId,
        content_type: ContentType,
    ) -> Result<Card, ApiError> {
        let path = format!("/projects/columns/{column_id}/cards");
        let body = CardBody {
            content_id: content_id.get(),
            content_type: content_type.as_str(),
        };
        let created: IdResponse = self.post(&path, &body).await?;
        Ok(Card {
            id: CardId::new(created.id),
            column_id,
            content_id,
            content_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_json_message() {
        let body = r#"{"message":"Validation Failed","errors":[{"message":"title is too long"}]}"#;
        assert_eq!(
            extract_error_message(body),
            "Validation Failed (title is too long)"
        );
    }

    #[test]
    fn error_message_without_details() {
        assert_eq!(
            extract_error_message(r#"{"message":"Not Found"}"#),
            "Not Found"
        );
    }

    #[test]
    fn error_message_falls_back_to_raw_body() {
        assert_eq!(extract_error_message("bad gateway"), "bad gateway");
        assert_eq!(extract_error_message(r#"{"oops":1}"#), r#"{"oops":1}"#);
    }

    #[test]
    fn api_url_trailing_slash_is_trimmed() {
        let tracker = GitHubTracker::new(
            "t0ken",
            "https://ghe.example.com/api/v3/",
            Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        )
        .unwrap();
        assert_eq!(tracker.api_url(), "https://ghe.example.com/api/v3");
        assert_eq!(
            tracker.url("/projects/1/columns"),
            "https://ghe.example.com/api/v3/projects/1/columns"
        );
    }

    #[test]
    fn connect_timeout_is_taken_from_the_caller() {
        let tracker =
            GitHubTracker::new("t0ken", DEFAULT_API_URL, Duration::from_secs(5)).unwrap();
        assert_eq!(tracker.connect_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn token_with_newline_is_rejected() {
        let result = GitHubTracker::new("t0k\nen", DEFAULT_API_URL, Duration::from_secs(5));
        assert!(matches!(result, Err(ApiError::Rejected(_))));
    }

    #[test]
    fn card_body_uses_issue_content_type() {
        let body = CardBody {
            content_id: 42,
            content_type: ContentType::Issue.as_str(),
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"content_id": 42, "content_type": "Issue"})
        );
    }
}
