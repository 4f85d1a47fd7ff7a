//! Findings ingestion from SARIF-shaped analyzer reports.
//!
//! Parses a findings document (one or more analysis runs, each with a list
//! of results) into an ordered sequence of [`Finding`]s, preserving document
//! order. Pure transform: no side effects beyond reading the input.

use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::{AutofixError, Result};
use crate::finding::{Finding, Severity};

// ---------------------------------------------------------------------------
// Document schema (only the fields the core interprets)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct FindingsDocument {
    #[serde(default)]
    runs: Vec<AnalysisRun>,
}

#[derive(Debug, Deserialize)]
struct AnalysisRun {
    #[serde(default)]
    results: Vec<RawResult>,
}

#[derive(Debug, Deserialize)]
struct RawResult {
    #[serde(rename = "ruleId")]
    rule_id: Option<String>,
    level: Option<String>,
    message: Option<RawMessage>,
    #[serde(default)]
    locations: Vec<RawLocation>,
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawLocation {
    #[serde(rename = "physicalLocation")]
    physical_location: Option<RawPhysicalLocation>,
}

#[derive(Debug, Deserialize)]
struct RawPhysicalLocation {
    #[serde(rename = "artifactLocation")]
    artifact_location: Option<RawArtifactLocation>,
    region: Option<RawRegion>,
}

#[derive(Debug, Deserialize)]
struct RawArtifactLocation {
    uri: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawRegion {
    #[serde(rename = "startLine")]
    start_line: Option<u32>,
    #[serde(rename = "startColumn")]
    start_column: Option<u32>,
    #[serde(rename = "endLine")]
    end_line: Option<u32>,
    #[serde(rename = "endColumn")]
    end_column: Option<u32>,
}

// ---------------------------------------------------------------------------
// Ingestion
// ---------------------------------------------------------------------------

/// Parse a findings document into an ordered sequence of findings.
///
/// Fails with [`AutofixError::Parse`] when the document is malformed JSON,
/// contains no analysis runs, or a result is missing its rule id or file
/// path. A run with zero results is not an error.
pub fn parse_findings(document: &str) -> Result<Vec<Finding>> {
    let doc: FindingsDocument = serde_json::from_str(document)
        .map_err(|e| AutofixError::Parse(format!("malformed findings document: {e}")))?;

    if doc.runs.is_empty() {
        return Err(AutofixError::Parse(
            "findings document contains no analysis runs".to_string(),
        ));
    }

    let mut findings = Vec::new();
    for (run_idx, run) in doc.runs.iter().enumerate() {
        for (result_idx, result) in run.results.iter().enumerate() {
            findings.push(normalize_result(run_idx, result_idx, result)?);
        }
    }

    debug!(count = findings.len(), "ingested findings");
    Ok(findings)
}

/// Read and parse a findings document from `path`.
pub fn load_findings(path: &Path) -> Result<Vec<Finding>> {
    let document = std::fs::read_to_string(path)?;
    parse_findings(&document)
}

/// Normalize one raw result into a [`Finding`].
fn normalize_result(run_idx: usize, result_idx: usize, result: &RawResult) -> Result<Finding> {
    let rule_id = result.rule_id.clone().ok_or_else(|| {
        AutofixError::Parse(format!(
            "result {result_idx} in run {run_idx} has no rule id"
        ))
    })?;

    let physical = result
        .locations
        .first()
        .and_then(|l| l.physical_location.as_ref())
        .ok_or_else(|| {
            AutofixError::Parse(format!(
                "result {result_idx} in run {run_idx} ({rule_id}) has no physical location"
            ))
        })?;

    let file = physical
        .artifact_location
        .as_ref()
        .and_then(|a| a.uri.clone())
        .ok_or_else(|| {
            AutofixError::Parse(format!(
                "result {result_idx} in run {run_idx} ({rule_id}) has no file path"
            ))
        })?;

    let region = physical.region.as_ref();
    let start_line = region.and_then(|r| r.start_line).unwrap_or(1);
    let start_column = region.and_then(|r| r.start_column).unwrap_or(1);
    let end_line = region.and_then(|r| r.end_line);
    let end_column = region.and_then(|r| r.end_column);

    let severity = match result.level.as_deref() {
        Some("error") => Severity::Error,
        Some("note") | Some("none") => Severity::Note,
        _ => Severity::Warning,
    };

    let message = result
        .message
        .as_ref()
        .and_then(|m| m.text.clone())
        .unwrap_or_default();

    Ok(Finding::new(
        rule_id,
        file,
        start_line,
        start_column,
        end_line,
        end_column,
        severity,
        message,
    ))
}
