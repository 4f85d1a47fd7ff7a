//! Remote session orchestration.
//!
//! Drives one batch through the session state machine:
//! `Pending -> Running -> {Succeeded, Failed, TimedOut}`. One create call,
//! a bounded polling loop against the configured deadline, and at most one
//! best-effort cancel on timeout. In dry-run mode the remote service is
//! never contacted; a `Succeeded`-shaped outcome carrying the planned batch
//! content is synthesized instead.

use std::cmp;

use chrono::Utc;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};
use uuid::Uuid;

use autofix_core::{Batch, SessionOutcome, SessionState};

use crate::config::OrchestratorConfig;
use crate::error::{EngineError, Result};
use crate::remote::{BatchSummary, FixService, RemoteStatus};

/// Live session state, mutated only by [`run_session`].
struct Session {
    id: Uuid,
    state: SessionState,
}

impl Session {
    fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            state: SessionState::Pending,
        }
    }

    /// Advance to `next`, enforcing the monotone lattice.
    fn transition(&mut self, next: SessionState) -> Result<()> {
        if !self.state.can_transition(next) {
            return Err(EngineError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        debug!(session_id = %self.id, from = %self.state, to = %next, "session transition");
        self.state = next;
        Ok(())
    }
}

/// Drive one batch through a remote fix session to a terminal outcome.
///
/// The poll count is bounded by `ceil(session_timeout / poll_interval)`;
/// a session whose remote status never turns terminal reaches `TimedOut`
/// within `session_timeout + poll_interval` of creation.
///
/// Errors only on a session-lattice invariant violation; every remote
/// failure mode is returned as data in the outcome.
pub async fn run_session(
    target: &str,
    target_branch: Option<&str>,
    batch: &Batch,
    config: &OrchestratorConfig,
    service: &dyn FixService,
) -> Result<SessionOutcome> {
    let created_at = Utc::now();
    let mut session = Session::new();

    if config.dry_run {
        info!(target, batch_key = %batch.key, size = batch.len(), "dry run: session synthesized");
        return Ok(finish(
            &session, batch, SessionState::Succeeded, created_at, 0, None, None, true,
        ));
    }

    let deadline = Instant::now() + config.session_timeout;
    let summary = BatchSummary::new(target, target_branch, batch);

    let handle = match service.create_session(&summary).await {
        Ok(handle) => handle,
        Err(e) => {
            // Single create attempt per batch; no retry.
            warn!(session_id = %session.id, target, batch_key = %batch.key, error = %e,
                "session create failed");
            session.transition(SessionState::Failed)?;
            return Ok(finish(
                &session,
                batch,
                session.state,
                created_at,
                0,
                None,
                Some(e.to_string()),
                false,
            ));
        }
    };

    session.transition(SessionState::Running)?;
    info!(session_id = %session.id, remote_id = %handle.id, target, batch_key = %batch.key,
        "remote session running");

    let mut poll_count: u32 = 0;
    loop {
        let now = Instant::now();
        if now >= deadline {
            if let Err(e) = service.cancel_session(&handle).await {
                warn!(session_id = %session.id, error = %e, "best-effort cancel failed");
            }
            session.transition(SessionState::TimedOut)?;
            return Ok(finish(
                &session,
                batch,
                session.state,
                created_at,
                poll_count,
                None,
                Some(format!(
                    "deadline exceeded after {}s",
                    config.session_timeout.as_secs()
                )),
                false,
            ));
        }

        sleep_until(cmp::min(now + config.poll_interval, deadline)).await;
        poll_count += 1;

        match service.poll_session(&handle).await {
            Ok(RemoteStatus::Completed { pull_request }) => {
                session.transition(SessionState::Succeeded)?;
                return Ok(finish(
                    &session,
                    batch,
                    session.state,
                    created_at,
                    poll_count,
                    Some(pull_request),
                    None,
                    false,
                ));
            }
            Ok(RemoteStatus::Failed { reason }) => {
                session.transition(SessionState::Failed)?;
                return Ok(finish(
                    &session,
                    batch,
                    session.state,
                    created_at,
                    poll_count,
                    None,
                    Some(reason),
                    false,
                ));
            }
            Ok(RemoteStatus::Queued) | Ok(RemoteStatus::InProgress) => {}
            Err(e) => {
                // A transient poll failure must not fail a running remote
                // job; keep polling until the deadline decides.
                warn!(session_id = %session.id, error = %e, "session poll failed");
            }
        }
    }
}

/// Synthesize a `Failed` outcome for a batch whose session could not be
/// driven at all (engine invariant violation recovered at the batch
/// boundary).
pub(crate) fn failed_outcome(batch: &Batch, reason: String) -> SessionOutcome {
    let now = Utc::now();
    SessionOutcome {
        session_id: Uuid::new_v4(),
        batch_key: batch.key.clone(),
        tier: batch.tier,
        batch_index: batch.index,
        finding_ids: batch.finding_ids(),
        finding_count: batch.len(),
        state: SessionState::Failed,
        pull_request: None,
        failure_reason: Some(reason),
        created_at: now,
        finished_at: now,
        poll_count: 0,
        dry_run: false,
    }
}

#[allow(clippy::too_many_arguments)]
fn finish(
    session: &Session,
    batch: &Batch,
    state: SessionState,
    created_at: chrono::DateTime<Utc>,
    poll_count: u32,
    pull_request: Option<String>,
    failure_reason: Option<String>,
    dry_run: bool,
) -> SessionOutcome {
    SessionOutcome {
        session_id: session.id,
        batch_key: batch.key.clone(),
        tier: batch.tier,
        batch_index: batch.index,
        finding_ids: batch.finding_ids(),
        finding_count: batch.len(),
        state,
        pull_request,
        failure_reason,
        created_at,
        finished_at: Utc::now(),
        poll_count,
        dry_run,
    }
}
