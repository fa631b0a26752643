//! Validation of analysis payloads received from the remote service.
//!
//! The service answers with loosely typed JSON. [`validate_analysis`] checks
//! the whole document in one pass and either produces an [`AnalysisResult`]
//! or a single [`SchemaError`] listing every offending field. Nothing is
//! accepted partially.

use std::{error::Error, fmt};

use serde_json::{Map, Value};

use crate::domain::{AnalysisResult, Finding, Metrics};

const METRICS_FIELD: &str = "metricas";
const OBSERVATIONS_FIELD: &str = "observaciones";
const SUGGESTIONS_FIELD: &str = "sugerencias";
const MISSING_VALUES_FIELD: &str = "porcentaje_valores_faltantes";
const DUPLICATE_ROWS_FIELD: &str = "porcentaje_filas_duplicadas";
const HEALTH_FIELD: &str = "salud_del_dataset";
const REPORT_KIND_FIELD: &str = "tipo_de_reporte";
const TITLE_FIELD: &str = "titulo";
const MESSAGE_FIELD: &str = "mensaje";

/// One field that does not match the expected shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaIssue {
    /// JSON path of the field, e.g. `$.observaciones[2].titulo`.
    pub path: String,
    /// Expected JSON type.
    pub expected: &'static str,
    /// What was found instead (`missing` when absent).
    pub found: String,
}

impl SchemaIssue {
    /// Build an issue for a field holding a value of the wrong type.
    pub fn new(path: impl Into<String>, expected: &'static str, found: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            expected,
            found: found.into(),
        }
    }

    /// Build an issue for a required field that is absent.
    pub fn missing(path: impl Into<String>, expected: &'static str) -> Self {
        Self::new(path, expected, "missing")
    }
}

impl fmt::Display for SchemaIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: expected {}, found {}",
            self.path, self.expected, self.found
        )
    }
}

/// Aggregated validation failure for a whole payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaError {
    issues: Vec<SchemaIssue>,
}

impl SchemaError {
    /// Wrap a list of issues. An empty list still denotes a failure.
    pub fn new(issues: Vec<SchemaIssue>) -> Self {
        Self { issues }
    }

    /// Every offending field, metrics first, then observations and suggestions.
    pub fn issues(&self) -> &[SchemaIssue] {
        &self.issues
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "payload does not match the analysis schema")?;
        for (index, issue) in self.issues.iter().enumerate() {
            let separator = if index == 0 { ": " } else { "; " };
            write!(f, "{separator}{issue}")?;
        }
        Ok(())
    }
}

impl Error for SchemaError {}

/// Decode raw response bytes and validate them.
pub fn parse_analysis(bytes: &[u8]) -> Result<AnalysisResult, SchemaError> {
    let value: Value = serde_json::from_slice(bytes).map_err(|err| {
        SchemaError::new(vec![SchemaIssue::new(
            "$",
            "JSON document",
            format!("malformed JSON ({err})"),
        )])
    })?;
    validate_analysis(&value)
}

/// Validate a decoded JSON value against the analysis result contract.
///
/// The three metrics are read from the nested `metricas` object when it is
/// present, otherwise from the top-level object. Unknown fields are ignored.
pub fn validate_analysis(value: &Value) -> Result<AnalysisResult, SchemaError> {
    let Some(root) = value.as_object() else {
        return Err(SchemaError::new(vec![SchemaIssue::new(
            "$",
            "object",
            json_type(value),
        )]));
    };

    let mut issues = Vec::new();
    let metrics = match root.get(METRICS_FIELD) {
        Some(Value::Object(nested)) => read_metrics(nested, "$.metricas", &mut issues),
        Some(other) => {
            issues.push(SchemaIssue::new("$.metricas", "object", json_type(other)));
            None
        }
        None => read_metrics(root, "$", &mut issues),
    };
    let observations = read_findings(root, OBSERVATIONS_FIELD, &mut issues);
    let suggestions = read_findings(root, SUGGESTIONS_FIELD, &mut issues);

    match (metrics, observations, suggestions) {
        (Some(metrics), Some(observations), Some(suggestions)) if issues.is_empty() => {
            Ok(AnalysisResult::new(metrics, observations, suggestions))
        }
        _ => Err(SchemaError::new(issues)),
    }
}

fn read_metrics(
    object: &Map<String, Value>,
    base: &str,
    issues: &mut Vec<SchemaIssue>,
) -> Option<Metrics> {
    let missing = read_number(object, base, MISSING_VALUES_FIELD, issues);
    let duplicates = read_number(object, base, DUPLICATE_ROWS_FIELD, issues);
    let health = read_number(object, base, HEALTH_FIELD, issues);
    Some(Metrics {
        missing_values_percent: missing?,
        duplicate_rows_percent: duplicates?,
        dataset_health_percent: health?,
    })
}

fn read_number(
    object: &Map<String, Value>,
    base: &str,
    field: &str,
    issues: &mut Vec<SchemaIssue>,
) -> Option<f64> {
    let path = format!("{base}.{field}");
    match object.get(field) {
        Some(Value::Number(number)) => {
            let value = number.as_f64();
            if value.is_none() {
                issues.push(SchemaIssue::new(path, "number", "unrepresentable number"));
            }
            value
        }
        Some(other) => {
            issues.push(SchemaIssue::new(path, "number", json_type(other)));
            None
        }
        None => {
            issues.push(SchemaIssue::missing(path, "number"));
            None
        }
    }
}

fn read_findings(
    root: &Map<String, Value>,
    field: &str,
    issues: &mut Vec<SchemaIssue>,
) -> Option<Vec<Finding>> {
    let path = format!("$.{field}");
    let items = match root.get(field) {
        Some(Value::Array(items)) => items,
        Some(other) => {
            issues.push(SchemaIssue::new(path, "array", json_type(other)));
            return None;
        }
        None => {
            issues.push(SchemaIssue::missing(path, "array"));
            return None;
        }
    };

    let mut findings = Vec::with_capacity(items.len());
    let mut complete = true;
    for (index, item) in items.iter().enumerate() {
        let item_path = format!("{path}[{index}]");
        match read_finding(item, &item_path, issues) {
            Some(finding) => findings.push(finding),
            None => complete = false,
        }
    }
    complete.then_some(findings)
}

fn read_finding(value: &Value, path: &str, issues: &mut Vec<SchemaIssue>) -> Option<Finding> {
    let Some(object) = value.as_object() else {
        issues.push(SchemaIssue::new(path, "object", json_type(value)));
        return None;
    };
    let report_kind = read_string(object, path, REPORT_KIND_FIELD, issues);
    let title = read_string(object, path, TITLE_FIELD, issues);
    let message = read_string(object, path, MESSAGE_FIELD, issues);
    Some(Finding {
        report_kind: report_kind?,
        title: title?,
        message: message?,
    })
}

fn read_string(
    object: &Map<String, Value>,
    base: &str,
    field: &str,
    issues: &mut Vec<SchemaIssue>,
) -> Option<String> {
    let path = format!("{base}.{field}");
    match object.get(field) {
        Some(Value::String(text)) => Some(text.clone()),
        Some(other) => {
            issues.push(SchemaIssue::new(path, "string", json_type(other)));
            None
        }
        None => {
            issues.push(SchemaIssue::missing(path, "string"));
            None
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
