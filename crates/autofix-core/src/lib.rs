//! Autofix Core - domain model for remote autofix orchestration
//!
//! Provides the pure (non-async) half of the system:
//! - Normalized static-analysis findings and their ingestion from
//!   SARIF-shaped documents
//! - Deterministic three-tier batch planning
//! - Session outcome and per-target/cross-target report types

pub mod batch;
pub mod error;
pub mod finding;
pub mod ingest;
pub mod planner;
pub mod report;
pub mod session;

// Re-export key types
pub use batch::{Batch, BatchPlan, Tier};
pub use error::{AutofixError, Result};
pub use finding::{Finding, Severity};
pub use ingest::{load_findings, parse_findings};
pub use planner::plan;
pub use report::{AggregateReport, BatchManifest, BatchManifestEntry, TargetResult};
pub use session::{SessionOutcome, SessionState};
