//! Renderers for the upload, waiting, and results screens.

use std::fmt::Write;

use serde::Serialize;

use crate::domain::{AnalysisResult, Finding, Metrics};
use crate::pagination::Paginator;
use crate::progress::{ProgressStage, SimulatedProgress};
use crate::upload::{FileSummary, MAX_UPLOAD_BYTES, format_size};

const SUBTITLE: &str = "Automatic data quality review and anomaly detection";

const STAGES: [ProgressStage; 3] = [
    ProgressStage::Loading,
    ProgressStage::Analyzing,
    ProgressStage::Finished,
];

/// Payload written by the JSON output format.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsReport<'a> {
    /// Uploaded file details.
    pub file: Option<&'a FileSummary>,
    /// Validated analysis, with wire field names.
    pub analysis: Option<&'a AnalysisResult>,
}

/// Render the upload prompt.
pub fn render_upload_screen() -> String {
    let mut output = String::new();
    let _ = writeln!(output, "csvhealth: dataset quality analysis\n");
    let _ = writeln!(output, "Select a CSV file to analyze.");
    let _ = writeln!(
        output,
        "Supports .csv files up to {}, one file per analysis.",
        format_size(MAX_UPLOAD_BYTES)
    );
    output
}

/// Render one frame of the waiting screen.
pub fn render_waiting_screen(file_name: &str, progress: &SimulatedProgress) -> String {
    let current = progress.stage();
    let markers: Vec<String> = STAGES
        .iter()
        .map(|stage| {
            let mark = if stage.index() < current.index() {
                "x"
            } else if *stage == current {
                ">"
            } else {
                " "
            };
            format!("[{mark}] {}", stage_name(*stage))
        })
        .collect();
    format!(
        "{} {} {:>3.0}% {}",
        markers.join(" - "),
        file_name,
        progress.value(),
        current.label()
    )
}

/// Render the results dashboard as plain text.
///
/// A missing analysis renders an empty dashboard rather than failing.
pub fn render_results(
    analysis: Option<&AnalysisResult>,
    file: Option<&FileSummary>,
    observations: &Paginator,
) -> String {
    let mut output = String::new();
    append_file_summary(&mut output, file);

    let _ = writeln!(output, "Dataset quality analysis");
    let _ = writeln!(output, "{SUBTITLE}\n");

    let Some(analysis) = analysis else {
        let _ = writeln!(output, "No analysis available.");
        return output;
    };

    let _ = writeln!(output, "Quality metrics");
    append_metrics(&mut output, analysis.metrics());
    let _ = writeln!(output);

    let _ = writeln!(output, "Key suggestions");
    if analysis.suggestions().is_empty() {
        let _ = writeln!(output, "- none");
    }
    for suggestion in analysis.suggestions() {
        let _ = writeln!(output, "- {}", suggestion.message);
    }
    let _ = writeln!(output);

    append_observation_page(&mut output, analysis.observations(), observations);
    output
}

/// Render the results as Markdown, with every observation listed.
pub fn render_results_markdown(
    analysis: Option<&AnalysisResult>,
    file: Option<&FileSummary>,
) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "# Dataset Quality Analysis\n");
    if let Some(file) = file {
        let _ = writeln!(output, "## {}\n", file.name);
        let _ = writeln!(output, "- Analyzed: {}", file.analyzed_at);
        let _ = writeln!(output, "- Records: {}", file.rows);
        let _ = writeln!(output, "- Size: {}\n", file.size);
    }

    let Some(analysis) = analysis else {
        let _ = writeln!(output, "No analysis available.");
        return output;
    };

    let _ = writeln!(output, "### Quality metrics");
    append_metrics(&mut output, analysis.metrics());
    let _ = writeln!(output);
    append_findings_markdown(&mut output, "Key suggestions", analysis.suggestions());
    append_findings_markdown(&mut output, "Observations", analysis.observations());
    output
}

/// Render any serializable report payload as JSON.
pub fn render_json<T: Serialize + ?Sized>(payload: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(payload)
}

/// Format a metric value as shown to the user, without rounding.
pub fn format_percent(value: f64) -> String {
    format!("{value}%")
}

fn stage_name(stage: ProgressStage) -> &'static str {
    match stage {
        ProgressStage::Loading => "Uploading",
        ProgressStage::Analyzing => "Analyzing",
        ProgressStage::Finished => "Done",
    }
}

fn append_file_summary(output: &mut String, file: Option<&FileSummary>) {
    let Some(file) = file else {
        return;
    };
    let _ = writeln!(output, "File: {}", file.name);
    let _ = writeln!(output, "- Analyzed: {}", file.analyzed_at);
    let _ = writeln!(output, "- Records: {}", file.rows);
    let _ = writeln!(output, "- Size: {}", file.size);
    let _ = writeln!(output);
}

fn append_metrics(output: &mut String, metrics: &Metrics) {
    for (label, value) in metrics.labelled() {
        let _ = writeln!(output, "- {label}: {}", format_percent(value));
    }
}

fn append_observation_page(output: &mut String, items: &[Finding], paginator: &Paginator) {
    if paginator.page_count() == 0 {
        let _ = writeln!(output, "Observations: none");
        return;
    }
    let _ = writeln!(
        output,
        "Observations (page {}/{})",
        paginator.page_index() + 1,
        paginator.page_count()
    );
    for finding in paginator.visible(items) {
        let _ = writeln!(output, "- [{}] {}", finding.report_kind, finding.title);
        let _ = writeln!(output, "  {}", finding.message);
    }
}

fn append_findings_markdown(output: &mut String, title: &str, findings: &[Finding]) {
    if findings.is_empty() {
        let _ = writeln!(output, "### {title}\nNone reported.\n");
        return;
    }
    let _ = writeln!(output, "### {title}");
    for finding in findings {
        let _ = writeln!(
            output,
            "- **{}** ({}): {}",
            finding.title, finding.report_kind, finding.message
        );
    }
    let _ = writeln!(output);
}
