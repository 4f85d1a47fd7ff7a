//! Autofix Engine - remote fix-session orchestration
//!
//! Drives planned batches through asynchronous remote fix sessions:
//! - A per-session finite state machine with timeout and best-effort
//!   cancellation
//! - A bounded scheduler across targets (semaphore-width pool) with an
//!   independent batch-level bound within each target
//! - Fail-safe aggregation: one batch's or target's failure never stops
//!   the rest of the run

pub mod config;
pub mod error;
pub mod remote;
pub mod scheduler;
pub mod session;
pub mod target;

// Re-export key types
pub use config::OrchestratorConfig;
pub use error::{EngineError, Result};
pub use remote::{BatchSummary, FixService, RemoteError, RemoteStatus, SessionHandle};
pub use scheduler::run_targets;
pub use session::run_session;
pub use target::{process_target, FindingsInput, TargetSpec};
