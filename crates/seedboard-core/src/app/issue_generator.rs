//! IssueGenerator - タスクファイルから issue と card を作る
//!
//! # フロー（ファイルごとに独立・並行）
//! 1. TaskSource::read_file() で本文を読む
//! 2. front-matter を属性と本文に分解
//! 3. IssueRequest を組み立てる
//! 4. WorkTracker::create_issue()
//! 5. WorkTracker::create_card()（issue が作れたときだけ）
//!
//! どの段階の失敗もそのファイルのパイプラインだけを止め、FailureReporter に報告します。
//! card だけ失敗した場合、issue は残ります（補償削除はしません）。

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::domain::{
    ColumnId, ContentType, Failure, FailureSubject, IssueRequest, RepoRef, TaskFile,
    TaskFileError,
};
use crate::frontmatter;
use crate::ports::{FailureReporter, TaskSource, WorkTracker};

use super::in_flight::{FileOutcome, InFlight, WorkOutcome};

#[derive(Clone)]
pub struct IssueGenerator {
    tracker: Arc<dyn WorkTracker>,
    source: Arc<dyn TaskSource>,
    reporter: Arc<dyn FailureReporter>,
    repo: RepoRef,
}

impl IssueGenerator {
    pub fn new(
        tracker: Arc<dyn WorkTracker>,
        source: Arc<dyn TaskSource>,
        reporter: Arc<dyn FailureReporter>,
        repo: RepoRef,
    ) -> Self {
        Self {
            tracker,
            source,
            reporter,
            repo,
        }
    }

    /// folder を一度だけ列挙し、ファイルごとのパイプラインを `in_flight` に登録する
    ///
    /// 結果は待たない。登録したパイプラインの数を返す。
    pub fn spawn_all(&self, folder: &Path, column_id: ColumnId, in_flight: &mut InFlight) -> usize {
        let entries = match self.source.list_entries(folder) {
            Ok(entries) => entries,
            Err(e) => {
                self.reporter.report(Failure::new(
                    FailureSubject::Folder {
                        path: folder.to_path_buf(),
                    },
                    format!("Failed to list task files: {e}"),
                ));
                return 0;
            }
        };

        let count = entries.len();
        for entry in entries {
            let generator = self.clone();
            let path = folder.join(&entry);
            // 読み込みには元の名前、報告とログには表示用の名前
            let name = entry.to_string_lossy().into_owned();
            in_flight.spawn(async move {
                WorkOutcome::File(generator.process_file(name, path, column_id).await)
            });
        }
        count
    }

    /// ファイル 1 件分のパイプライン
    pub async fn process_file(&self, name: String, path: PathBuf, column_id: ColumnId) -> FileOutcome {
        tracing::debug!(file = %name, "loading task file");
        let mut outcome = FileOutcome::new(name.clone());

        let raw = match self.source.read_file(&path).await {
            Ok(raw) => raw,
            Err(e) => {
                self.file_failed(&name, TaskFileError::Read(e));
                return outcome;
            }
        };

        let parsed = match frontmatter::parse(&raw) {
            Ok(parsed) => parsed,
            Err(e) => {
                self.file_failed(&name, e);
                return outcome;
            }
        };
        let task = TaskFile {
            name,
            attributes: parsed.attributes,
            body: parsed.body,
        };
        tracing::debug!(file = %task.name, attributes = ?task.attributes, "parsed task file");

        let request = match IssueRequest::try_from(&task) {
            Ok(request) => request,
            Err(e) => {
                self.file_failed(&task.name, e);
                return outcome;
            }
        };

        let issue = match self.tracker.create_issue(&self.repo, &request).await {
            Ok(issue) => issue,
            Err(e) => {
                self.reporter.report(Failure::new(
                    FailureSubject::TaskFile {
                        file: task.name,
                        title: Some(request.title),
                    },
                    format!("Failed creating the issue: {e}"),
                ));
                return outcome;
            }
        };
        tracing::debug!(file = %task.name, issue = %issue, "created issue");
        outcome.issue = Some(issue.clone());

        match self
            .tracker
            .create_card(column_id, issue.id, ContentType::Issue)
            .await
        {
            Ok(card) => {
                tracing::debug!(issue = %issue, column = %column_id, "added issue as a card");
                outcome.card = Some(card);
            }
            Err(e) => self.reporter.report(Failure::new(
                FailureSubject::Issue {
                    file: task.name,
                    id: issue.id,
                    number: issue.number,
                    title: issue.title,
                },
                format!("Failed to add the issue as a card: {e}"),
            )),
        }

        outcome
    }

    fn file_failed(&self, name: &str, error: TaskFileError) {
        self.reporter.report(Failure::new(
            FailureSubject::TaskFile {
                file: name.to_string(),
                title: None,
            },
            error.to_string(),
        ));
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::impls::{CollectingReporter, InMemoryTracker};
    use crate::ports::TaskSource;
    use async_trait::async_trait;
    use std::collections::BTreeMap;
    use std::ffi::OsString;
    use std::io;

    /// テスト用: メモリ上のフォルダ
    #[derive(Default)]
    pub(crate) struct MapTaskSource {
        files: BTreeMap<String, String>,
    }

    impl MapTaskSource {
        pub(crate) fn with(mut self, name: &str, content: &str) -> Self {
            self.files.insert(name.to_string(), content.to_string());
            self
        }
    }

    #[async_trait]
    impl TaskSource for MapTaskSource {
        fn list_entries(&self, _folder: &Path) -> io::Result<Vec<OsString>> {
            Ok(self.files.keys().map(OsString::from).collect())
        }

        async fn read_file(&self, path: &Path) -> io::Result<String> {
            tokio::task::yield_now().await;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            self.files
                .get(&name)
                .cloned()
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, name))
        }
    }

    struct Fixture {
        tracker: Arc<InMemoryTracker>,
        reporter: Arc<CollectingReporter>,
        column_id: ColumnId,
        outcomes: Vec<FileOutcome>,
    }

    async fn generate(tracker: InMemoryTracker, source: MapTaskSource) -> Fixture {
        let tracker = Arc::new(tracker);
        let reporter = Arc::new(CollectingReporter::new());
        let repo = RepoRef::new("octo", "board");

        let board = tracker.create_board(&repo, "b").await.unwrap();
        let column = tracker.create_column(board.id, "Todo").await.unwrap();

        let generator = IssueGenerator::new(
            tracker.clone(),
            Arc::new(source),
            reporter.clone(),
            repo,
        );
        let mut in_flight = InFlight::new(reporter.clone());
        generator.spawn_all(Path::new("tasks"), column.id, &mut in_flight);

        let outcomes = in_flight
            .join_all()
            .await
            .into_iter()
            .filter_map(|o| match o {
                WorkOutcome::File(f) => Some(f),
                WorkOutcome::Positioned { .. } => None,
            })
            .collect();

        Fixture {
            tracker,
            reporter,
            column_id: column.id,
            outcomes,
        }
    }

    #[tokio::test]
    async fn creates_issue_and_card_per_file() {
        let source = MapTaskSource::default()
            .with("a.md", "---\ntitle: A\nassignees: alice, bob\n---\nbody a")
            .with("b.md", "---\ntitle: B\nlabels: bug,p1\n---\nbody b");

        let fx = generate(InMemoryTracker::new(), source).await;

        assert!(!fx.reporter.has_failed());
        let mut records = fx.tracker.issues().await;
        records.sort_by(|x, y| x.request.title.cmp(&y.request.title));
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].request.body, "body a");
        assert_eq!(
            records[0].request.assignees,
            Some(vec!["alice".to_string(), "bob".to_string()])
        );
        assert_eq!(records[0].request.labels, None);
        assert_eq!(records[1].request.assignees, None);
        assert_eq!(
            records[1].request.labels,
            Some(vec!["bug".to_string(), "p1".to_string()])
        );

        let cards = fx.tracker.cards().await;
        assert_eq!(cards.len(), 2);
        assert!(cards.iter().all(|c| c.column_id == fx.column_id));
        assert!(cards.iter().all(|c| c.content_type == ContentType::Issue));
        assert!(fx.outcomes.iter().all(|o| o.issue.is_some() && o.card.is_some()));
    }

    #[tokio::test]
    async fn issue_failure_creates_no_card_and_is_tagged_with_the_file() {
        let source = MapTaskSource::default()
            .with("bad.md", "---\ntitle: Broken\n---\n")
            .with("good.md", "---\ntitle: Fine\n---\n");

        let fx = generate(InMemoryTracker::new().fail_issue("Broken"), source).await;

        let failures = fx.reporter.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(
            failures[0].subject,
            FailureSubject::TaskFile {
                file: "bad.md".to_string(),
                title: Some("Broken".to_string()),
            }
        );
        assert!(failures[0].message.starts_with("Failed creating the issue"));

        let issues = fx.tracker.issues().await;
        assert_eq!(issues.len(), 1);
        let cards = fx.tracker.cards().await;
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].content_id, issues[0].issue.id);
    }

    #[tokio::test]
    async fn card_failure_leaves_the_issue_in_place() {
        let source = MapTaskSource::default()
            .with("orphan.md", "---\ntitle: Orphan\n---\n")
            .with("sibling.md", "---\ntitle: Sibling\n---\n");

        let fx = generate(InMemoryTracker::new().fail_card("Orphan"), source).await;

        let issues = fx.tracker.issues().await;
        assert_eq!(issues.len(), 2);
        let orphan = issues
            .iter()
            .find(|r| r.issue.title == "Orphan")
            .map(|r| r.issue.clone())
            .unwrap();

        let failures = fx.reporter.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(
            failures[0].subject,
            FailureSubject::Issue {
                file: "orphan.md".to_string(),
                id: orphan.id,
                number: orphan.number,
                title: "Orphan".to_string(),
            }
        );

        let cards = fx.tracker.cards().await;
        assert_eq!(cards.len(), 1);
        assert_ne!(cards[0].content_id, orphan.id);

        let outcome = fx.outcomes.iter().find(|o| o.file == "orphan.md").unwrap();
        assert_eq!(outcome.issue.as_ref(), Some(&orphan));
        assert_eq!(outcome.card, None);
    }

    #[tokio::test]
    async fn malformed_file_reports_once_and_siblings_succeed() {
        let source = MapTaskSource::default()
            .with("broken.md", "---\ntitle: [oops\n---\nbody")
            .with("one.md", "---\ntitle: One\n---\n")
            .with("two.md", "---\ntitle: Two\n---\n");

        let fx = generate(InMemoryTracker::new(), source).await;

        let failures = fx.reporter.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(
            failures[0].subject,
            FailureSubject::TaskFile {
                file: "broken.md".to_string(),
                title: None,
            }
        );
        assert_eq!(fx.tracker.issues().await.len(), 2);
        assert_eq!(fx.tracker.cards().await.len(), 2);

        let broken = fx.outcomes.iter().find(|o| o.file == "broken.md").unwrap();
        assert_eq!(broken.issue, None);
        assert_eq!(broken.card, None);
    }

    #[tokio::test]
    async fn file_without_title_is_reported() {
        let source = MapTaskSource::default().with("untitled.md", "just notes");

        let fx = generate(InMemoryTracker::new(), source).await;

        let failures = fx.reporter.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].message, TaskFileError::MissingTitle.to_string());
        assert!(fx.tracker.issues().await.is_empty());
    }

    #[tokio::test]
    async fn unlistable_folder_is_reported_once() {
        let tracker: Arc<dyn WorkTracker> = Arc::new(InMemoryTracker::new());
        let reporter = Arc::new(CollectingReporter::new());
        let generator = IssueGenerator::new(
            tracker,
            Arc::new(crate::impls::FsTaskSource),
            reporter.clone(),
            RepoRef::new("octo", "board"),
        );
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");

        let mut in_flight = InFlight::new(reporter.clone());
        let spawned = generator.spawn_all(&missing, ColumnId::new(1), &mut in_flight);

        assert_eq!(spawned, 0);
        assert!(in_flight.is_empty());
        let failures = reporter.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].subject, FailureSubject::Folder { path: missing });
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn non_utf8_file_name_is_read_from_the_real_path() {
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        let name = std::ffi::OsStr::from_bytes(b"caf\xe9.md");
        std::fs::write(dir.path().join(name), "---\ntitle: Cafe\n---\n").unwrap();

        let tracker = Arc::new(InMemoryTracker::new());
        let reporter = Arc::new(CollectingReporter::new());
        let repo = RepoRef::new("octo", "board");
        let board = tracker.create_board(&repo, "b").await.unwrap();
        let column = tracker.create_column(board.id, "Todo").await.unwrap();
        let generator = IssueGenerator::new(
            tracker.clone(),
            Arc::new(crate::impls::FsTaskSource),
            reporter.clone(),
            repo,
        );

        let mut in_flight = InFlight::new(reporter.clone());
        generator.spawn_all(dir.path(), column.id, &mut in_flight);
        let outcomes = in_flight.join_all().await;

        assert!(!reporter.has_failed(), "{:?}", reporter.failures());
        let issues = tracker.issues().await;
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].request.title, "Cafe");
        assert!(matches!(
            &outcomes[0],
            WorkOutcome::File(file) if file.file == "caf\u{fffd}.md"
        ));
    }

    #[tokio::test]
    async fn process_file_reports_read_errors() {
        let tracker = Arc::new(InMemoryTracker::new());
        let reporter = Arc::new(CollectingReporter::new());
        let generator = IssueGenerator::new(
            tracker.clone(),
            Arc::new(MapTaskSource::default()),
            reporter.clone(),
            RepoRef::new("octo", "board"),
        );

        let outcome = generator
            .process_file("gone.md".into(), PathBuf::from("tasks/gone.md"), ColumnId::new(1))
            .await;

        assert_eq!(outcome, FileOutcome::new("gone.md"));
        assert_eq!(reporter.failures().len(), 1);
        assert!(tracker.issues().await.is_empty());
    }
}
