//! Domain entities for csvhealth.

use serde::Serialize;

/// Quality percentages computed by the analysis service.
///
/// Values are conventionally within `[0, 100]`; the range is not enforced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Metrics {
    /// Share of cells with missing values.
    #[serde(rename = "porcentaje_valores_faltantes")]
    pub missing_values_percent: f64,
    /// Share of rows that duplicate an earlier row.
    #[serde(rename = "porcentaje_filas_duplicadas")]
    pub duplicate_rows_percent: f64,
    /// Aggregate dataset health score.
    #[serde(rename = "salud_del_dataset")]
    pub dataset_health_percent: f64,
}

impl Metrics {
    /// Metric labels paired with their values, in display order.
    pub fn labelled(&self) -> [(&'static str, f64); 3] {
        [
            ("Missing values", self.missing_values_percent),
            ("Duplicates", self.duplicate_rows_percent),
            ("Health", self.dataset_health_percent),
        ]
    }
}

/// A single labelled observation or suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    /// Free-form category label.
    #[serde(rename = "tipo_de_reporte")]
    pub report_kind: String,
    /// Short headline.
    #[serde(rename = "titulo")]
    pub title: String,
    /// Body text.
    #[serde(rename = "mensaje")]
    pub message: String,
}

/// Validated result of one dataset analysis.
///
/// Only [`crate::schema::validate_analysis`] constructs this type, so every
/// instance satisfies the response contract.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    #[serde(rename = "metricas")]
    metrics: Metrics,
    #[serde(rename = "observaciones")]
    observations: Vec<Finding>,
    #[serde(rename = "sugerencias")]
    suggestions: Vec<Finding>,
}

impl AnalysisResult {
    pub(crate) fn new(
        metrics: Metrics,
        observations: Vec<Finding>,
        suggestions: Vec<Finding>,
    ) -> Self {
        Self {
            metrics,
            observations,
            suggestions,
        }
    }

    /// Quality percentages.
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Observations in display order.
    pub fn observations(&self) -> &[Finding] {
        &self.observations
    }

    /// Suggestions in display order.
    pub fn suggestions(&self) -> &[Finding] {
        &self.suggestions
    }
}
