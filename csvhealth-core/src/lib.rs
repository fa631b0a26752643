#![deny(missing_docs)]
//! csvhealth core library.
//!
//! Domain types, response validation, and the upload workflow behind the
//! csvhealth client. Nothing here touches the network.

pub mod domain;
pub mod error;
pub mod fs;
pub mod pagination;
pub mod progress;
pub mod report;
pub mod schema;
pub mod upload;
pub mod workflow;

pub use domain::{AnalysisResult, Finding, Metrics};
pub use error::{AnalysisError, CsvHealthError, Result};
pub use fs::{FileSystem, StdFileSystem};
pub use pagination::{Paginator, page, page_count};
pub use progress::{
    ANALYZING_THRESHOLD, PROGRESS_CEILING, PROGRESS_TICK, ProgressStage, SimulatedProgress,
};
pub use report::{
    ResultsReport, format_percent, render_json, render_results, render_results_markdown,
    render_upload_screen, render_waiting_screen,
};
pub use schema::{SchemaError, SchemaIssue, parse_analysis, validate_analysis};
pub use upload::{
    CSV_MIME, FileSummary, MAX_UPLOAD_BYTES, SelectedFile, SelectionRejected, count_rows,
    format_size, is_csv_candidate, select_csv,
};
pub use workflow::{
    ANALYSIS_CANCELLED_MESSAGE, ANALYSIS_FAILED_MESSAGE, Completion, Notification,
    NotificationLevel, NotificationSink, Screen, Submission, SubmissionTicket, Workflow,
    WorkflowError, WorkflowState,
};
