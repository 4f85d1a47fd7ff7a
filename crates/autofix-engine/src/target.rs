//! Per-target processing pipeline: ingest, plan, dispatch, summarize.
//!
//! Every error past the configuration boundary is recovered here and
//! recorded as data in the [`TargetResult`], so one target's failure can
//! never unwind into the scheduler.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use autofix_core::{
    load_findings, parse_findings, plan, AutofixError, BatchManifest, Finding, SessionOutcome,
    TargetResult,
};

use crate::config::OrchestratorConfig;
use crate::remote::FixService;
use crate::session::{failed_outcome, run_session};

/// Where a target's findings document comes from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FindingsInput {
    /// Load the document from a file path.
    Path { path: PathBuf },
    /// The document was already located by an external collaborator.
    Document { content: String },
}

/// One unit of work: a codebase whose findings are ingested, planned, and
/// processed independently of other targets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TargetSpec {
    /// Target repository identity (e.g. "org/app").
    pub repo: String,

    /// Branch for fix proposals; falls back to the configured default.
    pub target_branch: Option<String>,

    /// Findings source; falls back to the configured default path.
    pub findings: Option<FindingsInput>,
}

impl TargetSpec {
    /// Target fed by an already-located findings document.
    pub fn from_document(repo: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            repo: repo.into(),
            target_branch: None,
            findings: Some(FindingsInput::Document {
                content: content.into(),
            }),
        }
    }

    /// Target whose findings document is read from `path`.
    pub fn from_path(repo: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            repo: repo.into(),
            target_branch: None,
            findings: Some(FindingsInput::Path { path: path.into() }),
        }
    }

    /// Set the branch for fix proposals.
    pub fn with_target_branch(mut self, branch: impl Into<String>) -> Self {
        self.target_branch = Some(branch.into());
        self
    }
}

/// Run one target end to end, always yielding a [`TargetResult`].
///
/// Ingest or planning failures produce an error-carrying result; batch
/// dispatch runs under the within-target concurrency bound, preserving
/// planner order, and a failed or timed-out batch never halts the rest.
pub async fn process_target(
    spec: TargetSpec,
    config: &OrchestratorConfig,
    service: Arc<dyn FixService>,
) -> TargetResult {
    let start = Instant::now();

    let findings = match ingest(&spec, config) {
        Ok(findings) => findings,
        Err(e) => {
            warn!(target = %spec.repo, error = %e, "target ingest failed");
            return TargetResult::from_error(&spec.repo, e.to_string(), elapsed_ms(start));
        }
    };

    let plan = match plan(&findings, config.batch_size, config.max_batches) {
        Ok(plan) => plan,
        Err(e) => {
            warn!(target = %spec.repo, error = %e, "target planning failed");
            return TargetResult::from_error(&spec.repo, e.to_string(), elapsed_ms(start));
        }
    };

    let manifest = BatchManifest::from_plan(&spec.repo, &plan);
    let unprocessed = plan.unprocessed.len();
    info!(
        target = %spec.repo,
        findings = findings.len(),
        batches = plan.batches.len(),
        unprocessed,
        "dispatching batches"
    );

    let repo = spec.repo.as_str();
    let branch = spec
        .target_branch
        .as_deref()
        .or(config.target_branch.as_deref());

    let outcomes: Vec<SessionOutcome> = stream::iter(plan.batches.into_iter().map(|batch| {
        let service = Arc::clone(&service);
        async move {
            match run_session(repo, branch, &batch, config, service.as_ref()).await {
                Ok(outcome) => outcome,
                Err(e) => failed_outcome(&batch, e.to_string()),
            }
        }
    }))
    .buffered(config.max_parallel_batches)
    .collect()
    .await;

    TargetResult::from_outcomes(&spec.repo, manifest, outcomes, unprocessed, elapsed_ms(start))
}

/// Resolve the target's findings source and ingest it.
fn ingest(
    spec: &TargetSpec,
    config: &OrchestratorConfig,
) -> Result<Vec<Finding>, AutofixError> {
    match &spec.findings {
        Some(FindingsInput::Document { content }) => parse_findings(content),
        Some(FindingsInput::Path { path }) => load_findings(path),
        None => match &config.findings_path {
            Some(path) => load_findings(path),
            None => Err(AutofixError::Parse(format!(
                "target '{}' has no findings source",
                spec.repo
            ))),
        },
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}
