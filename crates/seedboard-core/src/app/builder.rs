//! AppBuilder - アプリケーションの構築とワイヤリング
//!
//! # 学習ポイント
//! - Builder パターンの実装
//! - 起動時検証（Fail-fast 設計）
//! - ports を Arc<dyn ...> で束ねて共有する

use std::sync::Arc;

use crate::domain::{BoardSpec, ProvisionError, RepoRef};
use crate::impls::{CollectingReporter, FsTaskSource};
use crate::ports::{Clock, SystemClock, TaskSource, WorkTracker};

use super::in_flight::InFlight;
use super::issue_generator::IssueGenerator;
use super::provisioner::BoardProvisioner;
use super::report::RunReport;

/// AppBuilder はアプリケーションを構築
///
/// # 使用例
/// ```ignore
/// let app = AppBuilder::new()
///     .tracker(Arc::new(GitHubTracker::new(&token, DEFAULT_API_URL, timeout)?))
///     .repo("octo/board".parse()?)
///     .build()?;
/// let report = app.run(&spec).await?;
/// ```
///
/// # Fail-fast 設計
/// - tracker と repo は必須。無ければ build() が BuildError を返す
/// - task_source と clock は省略時にローカルファイルシステムと現在時刻
pub struct AppBuilder {
    tracker: Option<Arc<dyn WorkTracker>>,
    source: Option<Arc<dyn TaskSource>>,
    clock: Option<Arc<dyn Clock>>,
    repo: Option<RepoRef>,
}

/// BuildError はアプリケーション構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Missing components: {0:?}. These must be provided before build().")]
    MissingComponents(Vec<&'static str>),
}

impl AppBuilder {
    pub fn new() -> Self {
        Self {
            tracker: None,
            source: None,
            clock: None,
            repo: None,
        }
    }

    pub fn tracker(mut self, tracker: Arc<dyn WorkTracker>) -> Self {
        self.tracker = Some(tracker);
        self
    }

    pub fn task_source(mut self, source: Arc<dyn TaskSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn repo(mut self, repo: RepoRef) -> Self {
        self.repo = Some(repo);
        self
    }

    pub fn build(self) -> Result<App, BuildError> {
        match (self.tracker, self.repo) {
            (Some(tracker), Some(repo)) => Ok(App {
                tracker,
                source: self.source.unwrap_or_else(|| Arc::new(FsTaskSource)),
                clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
                repo,
            }),
            (tracker, repo) => {
                let mut missing = Vec::new();
                if tracker.is_none() {
                    missing.push("tracker");
                }
                if repo.is_none() {
                    missing.push("repo");
                }
                Err(BuildError::MissingComponents(missing))
            }
        }
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// App は 1 回分のプロビジョニングを実行する
pub struct App {
    tracker: Arc<dyn WorkTracker>,
    source: Arc<dyn TaskSource>,
    clock: Arc<dyn Clock>,
    repo: RepoRef,
}

impl App {
    /// board・column・issue・card を作り、すべての処理の完了を待って結果を返す
    ///
    /// board の作成失敗だけが `Err` になる。それ以外の失敗は RunReport に載る。
    /// 同じ設定で 2 回呼ぶと board も issue も 2 つずつできる（重複排除はしない）。
    pub async fn run(&self, spec: &BoardSpec) -> Result<RunReport, ProvisionError> {
        let started_at = self.clock.now();
        let reporter = Arc::new(CollectingReporter::new());

        let generator = IssueGenerator::new(
            self.tracker.clone(),
            self.source.clone(),
            reporter.clone(),
            self.repo.clone(),
        );
        let provisioner = BoardProvisioner::new(
            self.tracker.clone(),
            reporter.clone(),
            self.repo.clone(),
            generator,
        );

        let mut in_flight = InFlight::new(reporter.clone());
        let provisioned = provisioner.provision(spec, &mut in_flight).await;
        tracing::debug!(pending = in_flight.len(), "waiting for in-flight work");
        let outcomes = in_flight.join_all().await;
        let provisioned = provisioned?;

        let report = RunReport::assemble(
            provisioned,
            outcomes,
            reporter.failures(),
            started_at,
            self.clock.now(),
        );
        tracing::info!(
            board = %report.board.name,
            columns = report.columns.len(),
            issues = report.issues.len(),
            cards = report.cards.len(),
            failures = report.failures.len(),
            status = ?report.status,
            "provisioning finished"
        );
        Ok(report)
    }
}
