//! Normalized static-analysis findings.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Severity level for a finding, mapped from the analyzer's report.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Note,
    Warning,
    Error,
}

/// A single located issue reported by a static analyzer.
///
/// Immutable once ingested; the `id` is content-derived so the same finding
/// in the same document always carries the same identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Finding {
    /// Stable content-derived identifier (hex digest prefix).
    pub id: String,

    /// Rule/lint identifier (e.g. "py/sql-injection").
    pub rule_id: String,

    /// Source file path (relative to the target repository root).
    pub file: String,

    /// Start line (1-indexed).
    pub start_line: u32,

    /// Start column (1-indexed).
    pub start_column: u32,

    /// End line, when the report provides a range.
    pub end_line: Option<u32>,

    /// End column, when the report provides a range.
    pub end_column: Option<u32>,

    /// Severity level.
    pub severity: Severity,

    /// Human-readable message.
    pub message: String,
}

impl Finding {
    /// Create a new finding, deriving its stable id from content.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        rule_id: String,
        file: String,
        start_line: u32,
        start_column: u32,
        end_line: Option<u32>,
        end_column: Option<u32>,
        severity: Severity,
        message: String,
    ) -> Self {
        let id = Self::derive_id(&rule_id, &file, start_line, start_column, &message);
        Self {
            id,
            rule_id,
            file,
            start_line,
            start_column,
            end_line,
            end_column,
            severity,
            message,
        }
    }

    /// Compute the stable content-derived id for a finding.
    fn derive_id(rule_id: &str, file: &str, line: u32, column: u32, message: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(rule_id.as_bytes());
        hasher.update(b"\0");
        hasher.update(file.as_bytes());
        hasher.update(b"\0");
        hasher.update(line.to_le_bytes());
        hasher.update(column.to_le_bytes());
        hasher.update(message.as_bytes());
        let digest = hex::encode(hasher.finalize());
        digest[..16].to_string()
    }

    /// Containing directory of `file`, with a root sentinel `"."` when the
    /// path has no directory component.
    pub fn directory(&self) -> String {
        match self.file.rsplit_once('/') {
            Some((dir, _)) if !dir.is_empty() => dir.to_string(),
            _ => ".".to_string(),
        }
    }

    /// Canonical sort key: file path, then rule id, then location.
    pub fn sort_key(&self) -> (&str, &str, u32, u32) {
        (&self.file, &self.rule_id, self.start_line, self.start_column)
    }
}
