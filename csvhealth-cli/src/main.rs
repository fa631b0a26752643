#![deny(missing_docs)]
//! csvhealth command-line interface.
//!
//! Uploads a CSV file to the dataset analysis service and shows the quality
//! dashboard, or validates and inspects files locally.

mod browse;
mod client;
mod config;
mod session;

use browse::BrowseExit;
use clap::{Args, Parser, Subcommand, ValueEnum};
use client::AnalysisClient;
use config::ApiArgs;
use csvhealth_core::{
    AnalysisResult, Completion, FileSummary, NotificationSink, Paginator, ResultsReport,
    StdFileSystem, Workflow, parse_analysis, render_json, render_results, render_results_markdown,
    render_upload_screen, render_waiting_screen, select_csv,
};
use session::Sleeper;
use std::fmt::Write;
use std::future::Future;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

pub(crate) type CliResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Exit status after the user cancels with Ctrl-C.
const CANCELLED_EXIT: u8 = 130;

#[derive(Parser)]
#[command(name = "csvhealth", version, about = "CSV dataset quality analysis")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
struct ViewArgs {
    /// Observations shown per page.
    #[arg(long, default_value = "3")]
    page_size: NonZeroUsize,
    /// Observation page to print (1-based, clamped to the last page).
    #[arg(long, default_value_t = 1)]
    page: usize,
    /// Page through observations interactively (text output to stdout only).
    #[arg(short, long)]
    interactive: bool,
}

#[derive(Args, Clone)]
struct OutputArgs {
    /// Output format for report data.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Write the report to a file instead of stdout.
    #[arg(long = "report-output")]
    report_output: Option<PathBuf>,
}

#[derive(ValueEnum, Copy, Clone, Debug, Eq, PartialEq)]
enum OutputFormat {
    Text,
    Json,
    Markdown,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a CSV file for analysis and show the results.
    Analyze {
        /// CSV file to analyze.
        file: PathBuf,
        #[command(flatten)]
        api: ApiArgs,
        #[command(flatten)]
        view: ViewArgs,
        #[command(flatten)]
        report: OutputArgs,
    },
    /// Check a saved analysis response and show it as a dashboard.
    Validate {
        /// JSON file holding an analysis response.
        file: PathBuf,
        #[command(flatten)]
        view: ViewArgs,
        #[command(flatten)]
        report: OutputArgs,
    },
    /// Check whether a file would be accepted for upload.
    Inspect {
        /// File to check.
        file: PathBuf,
        #[command(flatten)]
        report: OutputArgs,
    },
}

#[cfg(not(test))]
#[tokio::main(flavor = "current_thread")]
async fn main() -> CliResult<ExitCode> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            file,
            api,
            view,
            report,
        } => run_analyze(&file, &api, &view, &report).await,
        Commands::Validate { file, view, report } => run_validate(&file, &view, &report).await,
        Commands::Inspect { file, report } => run_inspect(&file, &report).await,
    }
}

#[cfg(test)]
fn main() {}

/// Upload `path` with the production client and show the results.
#[cfg(not(test))]
async fn run_analyze(
    path: &Path,
    api: &ApiArgs,
    view: &ViewArgs,
    report: &OutputArgs,
) -> CliResult<ExitCode> {
    let config = config::ClientConfig::from_args(api)?;
    let client = client::ReqwestAnalysisClient::new(&config)?;
    analyze_with(
        path,
        view,
        report,
        &client,
        &session::TokioSleeper,
        session::StderrNotifier,
        interrupted(),
    )
    .await
}

/// Upload `path` with injected dependencies.
async fn analyze_with<C, S, N, X>(
    path: &Path,
    view: &ViewArgs,
    report: &OutputArgs,
    client: &C,
    sleeper: &S,
    notifier: N,
    cancel: X,
) -> CliResult<ExitCode>
where
    C: AnalysisClient,
    S: Sleeper,
    N: NotificationSink,
    X: Future<Output = ()>,
{
    let mut workflow = Workflow::new(notifier);
    eprint!("{}", render_upload_screen());
    if let Err(rejected) = workflow.pick(&StdFileSystem::new(), path) {
        eprintln!("error: {}: {rejected}", path.display());
        return Ok(ExitCode::FAILURE);
    }

    tokio::pin!(cancel);
    let mut rng = rand::thread_rng();
    let completion = session::run_submission(
        &mut workflow,
        client,
        sleeper,
        &mut rng,
        cancel.as_mut(),
        |name, progress| eprint!("\r{}", render_waiting_screen(name, progress)),
    )
    .await?;
    eprintln!();

    match completion {
        Completion::Succeeded => {
            let summary = workflow.file().map(|file| file.summary(today()));
            emit_results(workflow.analysis(), summary.as_ref(), view, report, cancel).await
        }
        Completion::Failed => Ok(ExitCode::FAILURE),
        Completion::Discarded => Ok(ExitCode::from(CANCELLED_EXIT)),
    }
}

/// Resolves on Ctrl-C; never resolves if the handler cannot be installed.
async fn interrupted() {
    if tokio::signal::ctrl_c().await.is_err() {
        log::warn!("could not listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

/// Validate a saved analysis response and render it.
async fn run_validate(path: &Path, view: &ViewArgs, report: &OutputArgs) -> CliResult<ExitCode> {
    let bytes = tokio::fs::read(path).await?;
    match parse_analysis(&bytes) {
        Ok(analysis) => {
            let cancel = interrupted();
            emit_results(Some(&analysis), None, view, report, cancel).await
        }
        Err(err) => {
            let count = err.issues().len();
            eprintln!("{}: {count} schema issue(s)", path.display());
            for issue in err.issues() {
                eprintln!("- {issue}");
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Report whether `path` passes the upload filter.
async fn run_inspect(path: &Path, report: &OutputArgs) -> CliResult<ExitCode> {
    let file = match select_csv(&StdFileSystem::new(), path) {
        Ok(file) => file,
        Err(rejected) => {
            eprintln!("rejected: {}: {rejected}", path.display());
            return Ok(ExitCode::FAILURE);
        }
    };
    let summary = file.summary(today());
    let contents = match report.format {
        OutputFormat::Text => render_inspect_text(&summary),
        OutputFormat::Markdown => render_inspect_markdown(&summary),
        OutputFormat::Json => render_json(&summary)?,
    };
    emit_output(report, contents).await?;
    Ok(ExitCode::SUCCESS)
}

/// Print or save the results, or browse them when `--interactive` applies.
/// Ctrl-C while browsing ends with the cancel exit status.
async fn emit_results<X: Future<Output = ()>>(
    analysis: Option<&AnalysisResult>,
    file: Option<&FileSummary>,
    view: &ViewArgs,
    report: &OutputArgs,
    cancel: X,
) -> CliResult<ExitCode> {
    if wants_browser(view, report) {
        let exit = browse::browse(
            analysis,
            file,
            view.page_size,
            browse::stdin_lines(),
            &mut std::io::stdout(),
            cancel,
        )
        .await?;
        return Ok(match exit {
            BrowseExit::Quit => ExitCode::SUCCESS,
            BrowseExit::Interrupted => ExitCode::from(CANCELLED_EXIT),
        });
    }
    let contents = render_report(analysis, file, view, report.format)?;
    emit_output(report, contents).await?;
    Ok(ExitCode::SUCCESS)
}

fn wants_browser(view: &ViewArgs, report: &OutputArgs) -> bool {
    view.interactive && report.format == OutputFormat::Text && report.report_output.is_none()
}

fn render_report(
    analysis: Option<&AnalysisResult>,
    file: Option<&FileSummary>,
    view: &ViewArgs,
    format: OutputFormat,
) -> CliResult<String> {
    let contents = match format {
        OutputFormat::Text => {
            let len = analysis.map_or(0, |analysis| analysis.observations().len());
            let mut paginator = Paginator::new(len, view.page_size);
            for _ in 1..view.page.min(paginator.page_count()) {
                paginator.next();
            }
            render_results(analysis, file, &paginator)
        }
        OutputFormat::Markdown => render_results_markdown(analysis, file),
        OutputFormat::Json => render_json(&ResultsReport { file, analysis })?,
    };
    Ok(contents)
}

async fn emit_output(output: &OutputArgs, contents: String) -> CliResult<()> {
    if let Some(path) = &output.report_output {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, contents).await?;
    } else {
        print!("{contents}");
    }
    Ok(())
}

fn render_inspect_text(summary: &FileSummary) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "File: {}", summary.name);
    let _ = writeln!(output, "Status: accepted");
    let _ = writeln!(output, "Records: {}", summary.rows);
    let _ = writeln!(output, "Size: {}", summary.size);
    let _ = writeln!(output, "Checked: {}", summary.analyzed_at);
    output
}

fn render_inspect_markdown(summary: &FileSummary) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "# {}\n", summary.name);
    let _ = writeln!(output, "| Records | Size | Checked |");
    let _ = writeln!(output, "| --- | --- | --- |");
    let _ = writeln!(
        output,
        "| {} | {} | {} |",
        summary.rows, summary.size, summary.analyzed_at
    );
    output
}

fn today() -> String {
    chrono::Local::now().format("%d %b %Y").to_string()
}
