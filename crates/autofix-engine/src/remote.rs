//! Remote fix-service boundary.
//!
//! Three logical operations: create a session for a batch, poll its status,
//! and best-effort cancellation. Implement [`FixService`] to plug in a real
//! fixing backend or a test stub; the engine never assumes the remote side
//! enforces any ordering between sessions.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use autofix_core::{Batch, Tier};

/// Errors at the remote service boundary.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("session create failed: {0}")]
    Create(String),

    #[error("session poll failed: {0}")]
    Poll(String),

    #[error("session cancel failed: {0}")]
    Cancel(String),
}

/// Opaque handle to a remote fix session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionHandle {
    /// Remote-assigned session identifier.
    pub id: String,
}

/// Status reported by the remote service, mapping onto the session lattice.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RemoteStatus {
    /// Job accepted but not started.
    Queued,
    /// Job in progress.
    InProgress,
    /// Job finished and produced a change proposal.
    Completed { pull_request: String },
    /// Job reported an explicit failure.
    Failed { reason: String },
}

impl RemoteStatus {
    /// Whether this status is terminal for the remote job.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RemoteStatus::Completed { .. } | RemoteStatus::Failed { .. })
    }
}

/// Summary of one batch, carried by the create call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BatchSummary {
    /// Target repository identity.
    pub target: String,

    /// Branch the fix should land on; passed through opaquely.
    pub target_branch: Option<String>,

    /// Group key of the batch.
    pub batch_key: String,

    /// Bucket tier of the batch.
    pub tier: Tier,

    /// Sequence index of the batch within its target.
    pub batch_index: usize,

    /// Ids of the findings to fix.
    pub finding_ids: Vec<String>,

    /// Rule ids covered by the batch, deduplicated.
    pub rule_ids: Vec<String>,
}

impl BatchSummary {
    /// Build a summary for `batch` against `target`.
    pub fn new(target: &str, target_branch: Option<&str>, batch: &Batch) -> Self {
        let mut rule_ids: Vec<String> = batch.findings.iter().map(|f| f.rule_id.clone()).collect();
        rule_ids.sort();
        rule_ids.dedup();

        Self {
            target: target.to_string(),
            target_branch: target_branch.map(str::to_string),
            batch_key: batch.key.clone(),
            tier: batch.tier,
            batch_index: batch.index,
            finding_ids: batch.finding_ids(),
            rule_ids,
        }
    }
}

/// Injectable remote fixing backend.
#[async_trait]
pub trait FixService: Send + Sync {
    /// Create a remote fix session for a batch. One attempt per batch; the
    /// engine never retries a failed create.
    async fn create_session(&self, summary: &BatchSummary)
        -> Result<SessionHandle, RemoteError>;

    /// Query the current status of a session.
    async fn poll_session(&self, handle: &SessionHandle) -> Result<RemoteStatus, RemoteError>;

    /// Best-effort cancellation; failures are logged by the caller, never
    /// escalated.
    async fn cancel_session(&self, handle: &SessionHandle) -> Result<(), RemoteError>;
}
