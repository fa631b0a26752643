//! Interactive paging over the observations of a results dashboard.

use csvhealth_core::{AnalysisResult, FileSummary, Paginator, render_results};
use std::future::Future;
use std::io::{self, BufRead, Write};
use std::num::NonZeroUsize;
use tokio::sync::mpsc;

const PROMPT: &str = "[n]ext  [p]revious  [s <size>] page size  [q]uit > ";

/// One line of user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BrowseCommand {
    Next,
    Previous,
    PageSize(NonZeroUsize),
    Quit,
}

fn parse_command(line: &str) -> Option<BrowseCommand> {
    let mut parts = line.split_whitespace();
    let command = match parts.next()? {
        "n" | "next" => BrowseCommand::Next,
        "p" | "prev" | "previous" => BrowseCommand::Previous,
        "q" | "quit" => BrowseCommand::Quit,
        "s" | "size" => {
            let size = parts.next()?.parse::<usize>().ok()?;
            BrowseCommand::PageSize(NonZeroUsize::new(size)?)
        }
        _ => return None,
    };
    if parts.next().is_some() {
        return None;
    }
    Some(command)
}

/// How a browsing session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BrowseExit {
    /// The user quit or input ended.
    Quit,
    /// The cancel future resolved while waiting for input.
    Interrupted,
}

/// Stream stdin lines from a detached reader thread. A blocked read must not
/// hold up runtime shutdown, so the thread is never joined.
pub(crate) fn stdin_lines() -> mpsc::Receiver<io::Result<String>> {
    let (tx, rx) = mpsc::channel(1);
    std::thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Show the dashboard and page through observations until the user quits,
/// input ends or `cancel` resolves.
pub(crate) async fn browse<W, X>(
    analysis: Option<&AnalysisResult>,
    file: Option<&FileSummary>,
    page_size: NonZeroUsize,
    mut lines: mpsc::Receiver<io::Result<String>>,
    output: &mut W,
    cancel: X,
) -> io::Result<BrowseExit>
where
    W: Write,
    X: Future<Output = ()>,
{
    let len = analysis.map_or(0, |analysis| analysis.observations().len());
    let mut paginator = Paginator::new(len, page_size);
    tokio::pin!(cancel);

    loop {
        write!(output, "{}", render_results(analysis, file, &paginator))?;
        write!(output, "{PROMPT}")?;
        output.flush()?;

        let line = tokio::select! {
            biased;
            _ = &mut cancel => {
                writeln!(output)?;
                return Ok(BrowseExit::Interrupted);
            }
            line = lines.recv() => line,
        };
        let Some(line) = line else {
            writeln!(output)?;
            return Ok(BrowseExit::Quit);
        };
        match parse_command(&line?) {
            Some(BrowseCommand::Next) => paginator.next(),
            Some(BrowseCommand::Previous) => paginator.previous(),
            Some(BrowseCommand::PageSize(size)) => paginator.set_page_size(size),
            Some(BrowseCommand::Quit) => return Ok(BrowseExit::Quit),
            None => writeln!(output, "unknown command")?,
        }
        writeln!(output)?;
    }
}
