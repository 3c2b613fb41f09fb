//! seedboard: provision a project board from a YAML config and a folder of task files.
//!
//! Inputs come from flags or, when running as a GitHub Action, from the
//! `INPUT_*` / `GITHUB_*` environment.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use seedboard_core::app::{AppBuilder, RunReport};
use seedboard_core::config::load_board_spec;
use seedboard_core::domain::RepoRef;
use seedboard_core::impls::github::{DEFAULT_API_URL, DEFAULT_CONNECT_TIMEOUT_SECS};
use seedboard_core::impls::{GitHubTracker, InMemoryTracker};
use seedboard_core::ports::WorkTracker;

#[derive(Debug, Parser)]
#[command(name = "seedboard", version, about)]
struct Args {
    /// Board config file (name, columns, folder)
    #[arg(long, env = "INPUT_CONFIG")]
    config: PathBuf,

    /// API token. Falls back to GITHUB_TOKEN.
    #[arg(long, env = "INPUT_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Repository that owns the board and the issues (owner/repo)
    #[arg(long, env = "GITHUB_REPOSITORY")]
    repo: RepoRef,

    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Seconds to wait for a connection to the API
    #[arg(long, env = "INPUT_CONNECT_TIMEOUT", default_value_t = DEFAULT_CONNECT_TIMEOUT_SECS)]
    connect_timeout: u64,

    /// Run against an in-memory tracker instead of the real API
    #[arg(long)]
    dry_run: bool,

    /// Print the run report as JSON on stdout (annotations then go to stderr)
    #[arg(long)]
    json: bool,

    /// Debug logging (also enabled by RUNNER_DEBUG=1)
    #[arg(short, long)]
    verbose: bool,
}

/// Initialize logging with RUST_LOG environment variable support
fn init_logging(verbose: bool) {
    let runner_debug = std::env::var("RUNNER_DEBUG").is_ok_and(|v| v == "1");
    let default_level = if verbose || runner_debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn in_github_actions() -> bool {
    std::env::var("GITHUB_ACTIONS").is_ok_and(|v| v == "true")
}

/// Escape the data part of a workflow command. `%` must go first.
fn escape_workflow_data(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Surface a message as a workflow error annotation when running in Actions.
///
/// With `--json` stdout carries only the report, so the annotation goes to stderr.
fn annotate_error(message: &str, json: bool) {
    if !in_github_actions() {
        return;
    }
    let line = format!("::error::{}", escape_workflow_data(message));
    if json {
        eprintln!("{line}");
    } else {
        println!("{line}");
    }
}

fn tracker(args: &Args) -> Result<Arc<dyn WorkTracker>> {
    if args.dry_run {
        tracing::info!("dry run: using an in-memory tracker");
        return Ok(Arc::new(InMemoryTracker::new()));
    }

    let token = match args.token.clone().filter(|t| !t.is_empty()) {
        Some(token) => token,
        None => match std::env::var("GITHUB_TOKEN") {
            Ok(token) if !token.is_empty() => token,
            _ => bail!("no token given: pass --token or set INPUT_TOKEN / GITHUB_TOKEN"),
        },
    };
    let tracker = GitHubTracker::new(
        &token,
        &args.api_url,
        Duration::from_secs(args.connect_timeout),
    )
    .context("failed to build the GitHub client")?;
    tracing::debug!(
        api_url = tracker.api_url(),
        connect_timeout = ?tracker.connect_timeout(),
        "using the GitHub API"
    );
    Ok(Arc::new(tracker))
}

fn print_summary(report: &RunReport) {
    println!(
        "Board {:?} (id {}) in {}",
        report.board.name, report.board.id, report.board.repo
    );
    for column in &report.columns {
        println!("  [{}] {}", column.intended_index, column.name);
    }
    println!(
        "{} issue(s), {} card(s), {} column move(s), {} failure(s)",
        report.issues.len(),
        report.cards.len(),
        report.columns_positioned,
        report.failures.len()
    );
    for failure in &report.failures {
        println!("  failed: {failure}");
    }
}

async fn run(args: Args) -> Result<ExitCode> {
    let spec = load_board_spec(&args.config)
        .with_context(|| format!("failed to load {}", args.config.display()))?;

    let app = AppBuilder::new()
        .tracker(tracker(&args)?)
        .repo(args.repo.clone())
        .build()?;

    let report = app.run(&spec).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }
    for failure in &report.failures {
        annotate_error(&failure.to_string(), args.json);
    }

    Ok(if report.succeeded() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);
    let json = args.json;

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            let message = format!("{e:#}");
            annotate_error(&message, json);
            tracing::error!("{message}");
            ExitCode::FAILURE
        }
    }
}
