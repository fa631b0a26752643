//! Drives one submission: upload, progress ticks, and cancellation.

use crate::client::AnalysisClient;
use csvhealth_core::{
    Completion, Notification, NotificationLevel, NotificationSink, PROGRESS_TICK,
    SimulatedProgress, Submission, Workflow, WorkflowError,
};
use rand::Rng;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// Async sleep abstraction for progress ticks.
pub(crate) trait Sleeper {
    fn sleep<'a>(&'a self, duration: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>>;
}

/// Tokio-backed sleeper used in production.
#[cfg_attr(test, allow(dead_code))]
pub(crate) struct TokioSleeper;

impl Sleeper for TokioSleeper {
    fn sleep<'a>(&'a self, duration: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        Box::pin(tokio::time::sleep(duration))
    }
}

/// Prints workflow notifications to stderr.
#[cfg_attr(test, allow(dead_code))]
pub(crate) struct StderrNotifier;

impl NotificationSink for StderrNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Error => eprintln!("error: {}", notification.message),
            NotificationLevel::Info => eprintln!("{}", notification.message),
        }
    }
}

/// Submit the selected file and wait for its outcome.
///
/// Progress advances every [`PROGRESS_TICK`] while the request is pending and
/// `on_progress` sees every frame, including the final 100 on success. When
/// `cancel` resolves first the request is dropped, the workflow returns to
/// the upload screen with the file still selected, and
/// [`Completion::Discarded`] is returned.
pub(crate) async fn run_submission<N, C, S, R, X, F>(
    workflow: &mut Workflow<N>,
    client: &C,
    sleeper: &S,
    rng: &mut R,
    cancel: X,
    mut on_progress: F,
) -> Result<Completion, WorkflowError>
where
    N: NotificationSink,
    C: AnalysisClient,
    S: Sleeper,
    R: Rng,
    X: Future<Output = ()>,
    F: FnMut(&str, &SimulatedProgress),
{
    let Submission { ticket, file } = workflow.begin_submission()?;
    if let Some(progress) = workflow.progress() {
        on_progress(file.name(), &progress);
    }

    let mut request = client.submit_for_analysis(&file);
    tokio::pin!(cancel);

    loop {
        tokio::select! {
            biased;
            _ = &mut cancel => {
                workflow.abandon();
                log::info!("analysis of {} cancelled", file.name());
                return Ok(Completion::Discarded);
            }
            outcome = &mut request => {
                let completion = workflow.complete(ticket, outcome);
                if let Some(progress) = workflow.progress() {
                    on_progress(file.name(), &progress);
                }
                return Ok(completion);
            }
            _ = sleeper.sleep(PROGRESS_TICK) => {
                if workflow.tick_progress(ticket, &mut *rng).is_some() {
                    if let Some(progress) = workflow.progress() {
                        on_progress(file.name(), &progress);
                    }
                }
            }
        }
    }
}
