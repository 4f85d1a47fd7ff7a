//! Per-target and cross-target result artifacts.
//!
//! Three output artifacts for orchestration consumers:
//! - `BatchManifest` — per-target Batches document (one entry per batch)
//! - `TargetResult` — per-target Results document (one entry per session)
//! - `AggregateReport` — cross-target rollup with totals and success rate,
//!   plus a human-readable Markdown rendering

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::batch::{BatchPlan, Tier};
use crate::session::{SessionOutcome, SessionState};

// ── batches.json schema ───────────────────────────────────────────────────

/// One planned batch, as recorded in the Batches document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BatchManifestEntry {
    pub key: String,
    pub tier: Tier,
    pub index: usize,
    pub finding_ids: Vec<String>,
    pub size: usize,
}

/// Per-target Batches document: what the planner decided to dispatch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BatchManifest {
    /// Target repository identity.
    pub target: String,
    /// One entry per planned batch, in dispatch order.
    pub entries: Vec<BatchManifestEntry>,
    /// Ids of findings truncated by a batch-count cap.
    pub unprocessed_finding_ids: Vec<String>,
}

impl BatchManifest {
    /// Build a manifest from a target's batch plan.
    pub fn from_plan(target: &str, plan: &BatchPlan) -> Self {
        let entries = plan
            .batches
            .iter()
            .map(|b| BatchManifestEntry {
                key: b.key.clone(),
                tier: b.tier,
                index: b.index,
                finding_ids: b.finding_ids(),
                size: b.len(),
            })
            .collect();
        let unprocessed_finding_ids = plan.unprocessed.iter().map(|f| f.id.clone()).collect();
        Self {
            target: target.to_string(),
            entries,
            unprocessed_finding_ids,
        }
    }
}

// ── per-target results ────────────────────────────────────────────────────

/// Per-target aggregate, finalized only after every session for the target
/// reached a terminal state (or the target failed before dispatch).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TargetResult {
    /// Target repository identity.
    pub target: String,

    /// Session outcomes, in batch dispatch order.
    pub outcomes: Vec<SessionOutcome>,

    /// Batches document for this target (absent when planning never ran).
    pub manifest: Option<BatchManifest>,

    /// Sessions that succeeded.
    pub succeeded: usize,

    /// Sessions that failed.
    pub failed: usize,

    /// Sessions that timed out.
    pub timed_out: usize,

    /// Findings covered by the plan (batched + unprocessed).
    pub total_findings: usize,

    /// Findings in succeeded sessions.
    pub findings_addressed: usize,

    /// Findings truncated by a batch-count cap.
    pub unprocessed_findings: usize,

    /// Wall-clock time spent on this target, in milliseconds.
    pub elapsed_ms: u64,

    /// Target-level error (ingest or planning failure), when the target
    /// never reached dispatch.
    pub error: Option<String>,
}

impl TargetResult {
    /// Build a result from completed session outcomes.
    pub fn from_outcomes(
        target: &str,
        manifest: BatchManifest,
        outcomes: Vec<SessionOutcome>,
        unprocessed_findings: usize,
        elapsed_ms: u64,
    ) -> Self {
        let succeeded = outcomes.iter().filter(|o| o.succeeded()).count();
        let failed = outcomes
            .iter()
            .filter(|o| o.state == SessionState::Failed)
            .count();
        let timed_out = outcomes
            .iter()
            .filter(|o| o.state == SessionState::TimedOut)
            .count();
        let batched: usize = outcomes.iter().map(|o| o.finding_count).sum();
        let findings_addressed = outcomes
            .iter()
            .filter(|o| o.succeeded())
            .map(|o| o.finding_count)
            .sum();

        Self {
            target: target.to_string(),
            outcomes,
            manifest: Some(manifest),
            succeeded,
            failed,
            timed_out,
            total_findings: batched + unprocessed_findings,
            findings_addressed,
            unprocessed_findings,
            elapsed_ms,
            error: None,
        }
    }

    /// Build a result for a target that failed before any dispatch.
    pub fn from_error(target: &str, error: String, elapsed_ms: u64) -> Self {
        Self {
            target: target.to_string(),
            outcomes: Vec::new(),
            manifest: None,
            succeeded: 0,
            failed: 0,
            timed_out: 0,
            total_findings: 0,
            findings_addressed: 0,
            unprocessed_findings: 0,
            elapsed_ms,
            error: Some(error),
        }
    }

    /// Number of batches dispatched for this target.
    pub fn total_batches(&self) -> usize {
        self.outcomes.len()
    }
}

// ── cross-target rollup ───────────────────────────────────────────────────

/// Cross-target rollup: per-target table plus sums and success rate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AggregateReport {
    /// Per-target breakdown, in input order.
    pub targets: Vec<TargetResult>,
    pub total_findings: usize,
    pub total_batches: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub timed_out: usize,
    pub unprocessed_findings: usize,
    /// `succeeded / total_batches`, 0.0 when no batches were dispatched.
    pub success_rate: f32,
    pub generated_at: DateTime<Utc>,
}

impl AggregateReport {
    /// Fold per-target results into the cross-target rollup.
    ///
    /// Pure aggregation: tolerates an empty input (zero targets) and
    /// zero-success runs, always reflecting actual totals.
    pub fn from_targets(targets: Vec<TargetResult>) -> Self {
        let total_findings = targets.iter().map(|t| t.total_findings).sum();
        let total_batches: usize = targets.iter().map(TargetResult::total_batches).sum();
        let succeeded: usize = targets.iter().map(|t| t.succeeded).sum();
        let failed = targets.iter().map(|t| t.failed).sum();
        let timed_out = targets.iter().map(|t| t.timed_out).sum();
        let unprocessed_findings = targets.iter().map(|t| t.unprocessed_findings).sum();
        let success_rate = if total_batches == 0 {
            0.0
        } else {
            succeeded as f32 / total_batches as f32
        };

        Self {
            targets,
            total_findings,
            total_batches,
            succeeded,
            failed,
            timed_out,
            unprocessed_findings,
            success_rate,
            generated_at: Utc::now(),
        }
    }

    /// Render the report as a Markdown string.
    pub fn render_markdown(&self) -> String {
        let mut md = String::from("# Autofix Run Summary\n\n");
        md.push_str(&format!(
            "- Targets: {}\n- Findings: {}\n- Batches: {}\n- Succeeded: {}\n- Failed: {}\n- Timed out: {}\n- Unprocessed findings: {}\n- Success rate: {:.1}%\n",
            self.targets.len(),
            self.total_findings,
            self.total_batches,
            self.succeeded,
            self.failed,
            self.timed_out,
            self.unprocessed_findings,
            self.success_rate * 100.0
        ));

        md.push_str("\n## Targets\n\n");
        md.push_str("| Target | Batches | Succeeded | Failed | Timed out | Findings | Elapsed (ms) |\n");
        md.push_str("|---|---|---|---|---|---|---|\n");
        for t in &self.targets {
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} | {} |\n",
                t.target,
                t.total_batches(),
                t.succeeded,
                t.failed,
                t.timed_out,
                t.total_findings,
                t.elapsed_ms
            ));
        }

        let failed_targets: Vec<&TargetResult> =
            self.targets.iter().filter(|t| t.error.is_some()).collect();
        if !failed_targets.is_empty() {
            md.push_str("\n## Target errors\n\n");
            for t in failed_targets {
                md.push_str(&format!(
                    "- `{}`: {}\n",
                    t.target,
                    t.error.as_deref().unwrap_or("unknown")
                ));
            }
        }

        md
    }
}
