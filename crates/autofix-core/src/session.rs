//! Session states and recorded outcomes.
//!
//! A session is one remote fix job bound 1:1 to a batch. The live state
//! machine is driven by the engine; this module owns the state lattice and
//! the terminal outcome record that survives the session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::batch::Tier;

/// State of a remote fix session.
///
/// Transitions are monotone through a fixed lattice:
/// `Pending -> Running -> {Succeeded, Failed, TimedOut}`, with `Pending`
/// also allowed to fail or time out directly (create-call errors, deadline
/// elapsing before acknowledgement). Terminal states are never left.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Create call issued, remote job not yet acknowledged.
    Pending,
    /// Remote service acknowledged an in-progress job.
    Running,
    /// Remote job completed and produced an artifact reference.
    Succeeded,
    /// Create call errored or the remote job reported failure.
    Failed,
    /// Deadline elapsed while still pending/running.
    TimedOut,
}

impl SessionState {
    /// Whether this state is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionState::Succeeded | SessionState::Failed | SessionState::TimedOut
        )
    }

    /// Whether a transition from `self` to `next` is legal.
    pub fn can_transition(&self, next: SessionState) -> bool {
        match self {
            SessionState::Pending => matches!(
                next,
                SessionState::Running | SessionState::Failed | SessionState::TimedOut
            ),
            SessionState::Running => next.is_terminal(),
            _ => false,
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SessionState::Pending => "pending",
            SessionState::Running => "running",
            SessionState::Succeeded => "succeeded",
            SessionState::Failed => "failed",
            SessionState::TimedOut => "timed_out",
        };
        write!(f, "{s}")
    }
}

/// Terminal record of one session; the only artifact retained once the
/// session is over.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionOutcome {
    /// Session identifier.
    pub session_id: Uuid,

    /// Group key of the batch this session processed.
    pub batch_key: String,

    /// Bucket tier of the batch.
    pub tier: Tier,

    /// Sequence index of the batch within its target.
    pub batch_index: usize,

    /// Ids of the findings in the batch.
    pub finding_ids: Vec<String>,

    /// Number of findings in the batch.
    pub finding_count: usize,

    /// Final (terminal) state.
    pub state: SessionState,

    /// Pull-request reference, when the remote job produced one.
    pub pull_request: Option<String>,

    /// Failure reason, when the session failed or timed out.
    pub failure_reason: Option<String>,

    /// When the session was created.
    pub created_at: DateTime<Utc>,

    /// When the session reached its terminal state.
    pub finished_at: DateTime<Utc>,

    /// Number of poll calls issued.
    pub poll_count: u32,

    /// Whether this outcome was synthesized by a dry run (no remote calls).
    pub dry_run: bool,
}

impl SessionOutcome {
    /// Whether the session succeeded.
    pub fn succeeded(&self) -> bool {
        self.state == SessionState::Succeeded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [SessionState; 5] = [
        SessionState::Pending,
        SessionState::Running,
        SessionState::Succeeded,
        SessionState::Failed,
        SessionState::TimedOut,
    ];

    #[test]
    fn test_terminal_states() {
        assert!(!SessionState::Pending.is_terminal());
        assert!(!SessionState::Running.is_terminal());
        assert!(SessionState::Succeeded.is_terminal());
        assert!(SessionState::Failed.is_terminal());
        assert!(SessionState::TimedOut.is_terminal());
    }

    #[test]
    fn test_pending_transitions() {
        assert!(SessionState::Pending.can_transition(SessionState::Running));
        assert!(SessionState::Pending.can_transition(SessionState::Failed));
        assert!(SessionState::Pending.can_transition(SessionState::TimedOut));
        assert!(!SessionState::Pending.can_transition(SessionState::Succeeded));
        assert!(!SessionState::Pending.can_transition(SessionState::Pending));
    }

    #[test]
    fn test_running_transitions() {
        assert!(SessionState::Running.can_transition(SessionState::Succeeded));
        assert!(SessionState::Running.can_transition(SessionState::Failed));
        assert!(SessionState::Running.can_transition(SessionState::TimedOut));
        assert!(!SessionState::Running.can_transition(SessionState::Pending));
        assert!(!SessionState::Running.can_transition(SessionState::Running));
    }

    #[test]
    fn test_terminal_states_never_left() {
        for terminal in ALL.iter().filter(|s| s.is_terminal()) {
            for next in ALL {
                assert!(
                    !terminal.can_transition(next),
                    "{terminal} -> {next} must be illegal"
                );
            }
        }
    }

    #[test]
    fn test_state_serde() {
        for state in ALL {
            let json = serde_json::to_string(&state).expect("serialize");
            let back: SessionState = serde_json::from_str(&json).expect("deserialize");
            assert_eq!(state, back);
        }
    }
}
