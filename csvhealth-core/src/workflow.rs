//! Upload-to-results workflow state machine.
//!
//! The workflow owns the transient session state: the selected file, the
//! submission status, and the cosmetic progress. Network calls happen
//! outside; callers report their outcome back through
//! [`Workflow::complete`] with the [`SubmissionTicket`] they were issued.
//! Outcomes carrying a stale ticket (the user reset or left the waiting
//! screen) are discarded without touching the state.

use std::{error::Error, fmt, path::Path};

use rand::Rng;

use crate::domain::AnalysisResult;
use crate::error::AnalysisError;
use crate::fs::FileSystem;
use crate::progress::SimulatedProgress;
use crate::upload::{SelectedFile, SelectionRejected, select_csv};

/// Notification text raised for every failed analysis.
pub const ANALYSIS_FAILED_MESSAGE: &str = "Could not analyze the file.";
/// Notification text raised when the user leaves the waiting screen.
pub const ANALYSIS_CANCELLED_MESSAGE: &str = "Analysis cancelled.";

/// Screen the user is looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// File picker.
    Upload,
    /// Progress while the analysis runs.
    Waiting,
    /// Results dashboard.
    Results,
}

/// Identifies one submission so late outcomes can be recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionTicket {
    generation: u64,
}

/// What a caller needs to perform one submission.
#[derive(Debug, Clone)]
pub struct Submission {
    /// Ticket to hand back with the outcome.
    pub ticket: SubmissionTicket,
    /// File to upload.
    pub file: SelectedFile,
}

/// Session state.
#[derive(Debug, Clone, Default)]
pub enum WorkflowState {
    /// Nothing selected.
    #[default]
    Idle,
    /// A file is chosen but not submitted.
    FileSelected {
        /// The chosen file.
        file: SelectedFile,
    },
    /// A request is in flight.
    Submitting {
        /// The file being analyzed.
        file: SelectedFile,
        /// Ticket of the in-flight request.
        ticket: SubmissionTicket,
        /// Cosmetic progress.
        progress: SimulatedProgress,
    },
    /// The analysis result is available.
    Succeeded {
        /// The analyzed file.
        file: SelectedFile,
        /// Validated result.
        analysis: AnalysisResult,
    },
    /// The last submission failed; the file can be submitted again.
    Failed {
        /// The file that failed.
        file: SelectedFile,
        /// Why it failed.
        error: AnalysisError,
    },
}

/// Outcome of reporting a submission result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The result was stored and the results screen is active.
    Succeeded,
    /// The failure was reported and the upload screen is active.
    Failed,
    /// The ticket was stale; nothing changed.
    Discarded,
}

/// Invalid workflow request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowError {
    /// Submission requested with no file selected.
    NoFileSelected,
    /// Submission requested while one is in flight.
    AlreadySubmitting,
    /// Submission requested while a result is shown; reset first.
    ResultShown,
}

impl fmt::Display for WorkflowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoFileSelected => write!(f, "no file selected"),
            Self::AlreadySubmitting => write!(f, "an analysis is already in progress"),
            Self::ResultShown => write!(f, "start a new upload before submitting again"),
        }
    }
}

impl Error for WorkflowError {}

/// Severity of a user notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    /// Informational message.
    Info,
    /// Something went wrong.
    Error,
}

/// Transient message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Severity.
    pub level: NotificationLevel,
    /// Text shown to the user.
    pub message: String,
}

impl Notification {
    /// Build an error notification.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }

    /// Build an informational notification.
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            message: message.into(),
        }
    }
}

/// Receives user notifications raised by the workflow.
#[cfg_attr(test, mockall::automock)]
pub trait NotificationSink {
    /// Show `notification` to the user.
    fn notify(&self, notification: Notification);
}

impl<T: NotificationSink + ?Sized> NotificationSink for &T {
    fn notify(&self, notification: Notification) {
        (**self).notify(notification);
    }
}

/// Controller for one upload session.
#[derive(Debug)]
pub struct Workflow<N: NotificationSink> {
    state: WorkflowState,
    generation: u64,
    notifier: N,
}

impl<N: NotificationSink> Workflow<N> {
    /// Start idle on the upload screen.
    pub fn new(notifier: N) -> Self {
        Self {
            state: WorkflowState::Idle,
            generation: 0,
            notifier,
        }
    }

    /// Current state.
    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    /// Screen for the current state.
    pub fn screen(&self) -> Screen {
        match self.state {
            WorkflowState::Idle
            | WorkflowState::FileSelected { .. }
            | WorkflowState::Failed { .. } => Screen::Upload,
            WorkflowState::Submitting { .. } => Screen::Waiting,
            WorkflowState::Succeeded { .. } => Screen::Results,
        }
    }

    /// Selected file, if any.
    pub fn file(&self) -> Option<&SelectedFile> {
        match &self.state {
            WorkflowState::Idle => None,
            WorkflowState::FileSelected { file }
            | WorkflowState::Submitting { file, .. }
            | WorkflowState::Succeeded { file, .. }
            | WorkflowState::Failed { file, .. } => Some(file),
        }
    }

    /// Analysis result, only while on the results screen.
    pub fn analysis(&self) -> Option<&AnalysisResult> {
        match &self.state {
            WorkflowState::Succeeded { analysis, .. } => Some(analysis),
            _ => None,
        }
    }

    /// Progress while submitting; 100 once succeeded.
    pub fn progress(&self) -> Option<SimulatedProgress> {
        match &self.state {
            WorkflowState::Submitting { progress, .. } => Some(*progress),
            WorkflowState::Succeeded { .. } => {
                let mut done = SimulatedProgress::new();
                done.finish();
                Some(done)
            }
            _ => None,
        }
    }

    /// Accept a file that already passed the CSV filter.
    pub fn select_file(&mut self, file: SelectedFile) -> Result<(), SelectionRejected> {
        if let Some(rejection) = self.selection_blocked() {
            return Err(rejection);
        }
        log::debug!("selected {} ({} bytes)", file.name(), file.size_bytes());
        self.state = WorkflowState::FileSelected { file };
        Ok(())
    }

    /// Run the CSV filter on `path` and select it. A rejected file leaves
    /// the state untouched.
    pub fn pick<F: FileSystem>(&mut self, fs: &F, path: &Path) -> Result<(), SelectionRejected> {
        if let Some(rejection) = self.selection_blocked() {
            return Err(rejection);
        }
        let file = select_csv(fs, path)?;
        self.select_file(file)
    }

    fn selection_blocked(&self) -> Option<SelectionRejected> {
        match self.state {
            WorkflowState::Submitting { .. } => Some(SelectionRejected::Busy),
            WorkflowState::Succeeded { .. } => Some(SelectionRejected::ResultShown),
            WorkflowState::Idle
            | WorkflowState::FileSelected { .. }
            | WorkflowState::Failed { .. } => None,
        }
    }

    /// Move to the waiting screen and issue a ticket for the request.
    pub fn begin_submission(&mut self) -> Result<Submission, WorkflowError> {
        match std::mem::take(&mut self.state) {
            WorkflowState::FileSelected { file } | WorkflowState::Failed { file, .. } => {
                self.generation += 1;
                let ticket = SubmissionTicket {
                    generation: self.generation,
                };
                log::debug!(
                    "submitting {} as generation {}",
                    file.name(),
                    self.generation
                );
                self.state = WorkflowState::Submitting {
                    file: file.clone(),
                    ticket,
                    progress: SimulatedProgress::new(),
                };
                Ok(Submission { ticket, file })
            }
            other => {
                let err = match other {
                    WorkflowState::Submitting { .. } => WorkflowError::AlreadySubmitting,
                    WorkflowState::Succeeded { .. } => WorkflowError::ResultShown,
                    _ => WorkflowError::NoFileSelected,
                };
                self.state = other;
                Err(err)
            }
        }
    }

    /// Advance the cosmetic progress of the submission holding `ticket`.
    pub fn tick_progress<R: Rng>(&mut self, ticket: SubmissionTicket, rng: &mut R) -> Option<f64> {
        match &mut self.state {
            WorkflowState::Submitting {
                ticket: current,
                progress,
                ..
            } if *current == ticket => {
                progress.advance(rng);
                Some(progress.value())
            }
            _ => None,
        }
    }

    /// Report the outcome of the submission holding `ticket`.
    pub fn complete(
        &mut self,
        ticket: SubmissionTicket,
        outcome: Result<AnalysisResult, AnalysisError>,
    ) -> Completion {
        match std::mem::take(&mut self.state) {
            WorkflowState::Submitting {
                file,
                ticket: current,
                ..
            } if current == ticket => match outcome {
                Ok(analysis) => {
                    log::debug!("analysis of {} succeeded", file.name());
                    self.state = WorkflowState::Succeeded { file, analysis };
                    Completion::Succeeded
                }
                Err(error) => {
                    log::warn!(
                        "analysis of {} failed ({}): {error}",
                        file.name(),
                        error.kind()
                    );
                    self.notifier
                        .notify(Notification::error(ANALYSIS_FAILED_MESSAGE));
                    self.state = WorkflowState::Failed { file, error };
                    Completion::Failed
                }
            },
            other => {
                log::debug!(
                    "discarding outcome for stale generation {}",
                    ticket.generation
                );
                self.state = other;
                Completion::Discarded
            }
        }
    }

    /// Leave the waiting screen. The in-flight request's outcome will be
    /// discarded and the file stays selected.
    pub fn abandon(&mut self) -> bool {
        match std::mem::take(&mut self.state) {
            WorkflowState::Submitting { file, .. } => {
                self.generation += 1;
                log::debug!("abandoned submission of {}", file.name());
                self.notifier
                    .notify(Notification::info(ANALYSIS_CANCELLED_MESSAGE));
                self.state = WorkflowState::FileSelected { file };
                true
            }
            other => {
                self.state = other;
                false
            }
        }
    }

    /// Start over from the upload screen, dropping any file and result.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.state = WorkflowState::Idle;
    }
}
