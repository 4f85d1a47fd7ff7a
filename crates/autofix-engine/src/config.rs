//! Orchestrator configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{EngineError, Result};

/// Configuration for a full orchestration run.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Findings per batch (>= 1).
    pub batch_size: usize,

    /// Suppress all remote calls and synthesize outcomes for inspection.
    pub dry_run: bool,

    /// Cap on the number of batches dispatched per target.
    pub max_batches: Option<usize>,

    /// Concurrency width across targets (>= 1).
    pub max_parallel_targets: usize,

    /// Concurrency bound for batches within a single target (>= 1).
    /// The default of 1 processes a target's batches strictly in planner
    /// order, bounding remote load per target.
    pub max_parallel_batches: usize,

    /// Per-session deadline.
    pub session_timeout: Duration,

    /// Polling cadence while a session is running.
    pub poll_interval: Duration,

    /// Default branch for fix proposals; passed through opaquely to the
    /// remote service. Per-target branches take precedence.
    pub target_branch: Option<String>,

    /// Default findings document path for targets that do not carry their
    /// own findings source.
    pub findings_path: Option<PathBuf>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            batch_size: 4,
            dry_run: true,
            max_batches: None,
            max_parallel_targets: 3,
            max_parallel_batches: 1,
            session_timeout: Duration::from_secs(1800),
            poll_interval: Duration::from_secs(30),
            target_branch: None,
            findings_path: None,
        }
    }
}

impl OrchestratorConfig {
    /// Validate the configuration before any dispatch.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size < 1 {
            return Err(EngineError::Config("batch_size must be >= 1".to_string()));
        }
        if self.max_parallel_targets < 1 {
            return Err(EngineError::Config(
                "max_parallel_targets must be >= 1".to_string(),
            ));
        }
        if self.max_parallel_batches < 1 {
            return Err(EngineError::Config(
                "max_parallel_batches must be >= 1".to_string(),
            ));
        }
        if self.session_timeout.is_zero() {
            return Err(EngineError::Config(
                "session_timeout must be non-zero".to_string(),
            ));
        }
        if self.poll_interval.is_zero() {
            return Err(EngineError::Config(
                "poll_interval must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Set the batch size.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Enable or disable dry-run mode.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Cap the number of batches dispatched per target.
    pub fn with_max_batches(mut self, max_batches: usize) -> Self {
        self.max_batches = Some(max_batches);
        self
    }

    /// Set the cross-target concurrency width.
    pub fn with_max_parallel_targets(mut self, width: usize) -> Self {
        self.max_parallel_targets = width;
        self
    }

    /// Set the within-target batch concurrency bound.
    pub fn with_max_parallel_batches(mut self, width: usize) -> Self {
        self.max_parallel_batches = width;
        self
    }

    /// Set the per-session deadline.
    pub fn with_session_timeout(mut self, timeout: Duration) -> Self {
        self.session_timeout = timeout;
        self
    }

    /// Set the polling cadence.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the default target branch.
    pub fn with_target_branch(mut self, branch: impl Into<String>) -> Self {
        self.target_branch = Some(branch.into());
        self
    }

    /// Set the default findings document path.
    pub fn with_findings_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.findings_path = Some(path.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.batch_size, 4);
        assert!(config.dry_run);
        assert_eq!(config.max_batches, None);
        assert_eq!(config.max_parallel_targets, 3);
        assert_eq!(config.max_parallel_batches, 1);
        assert_eq!(config.session_timeout, Duration::from_secs(1800));
        assert_eq!(config.poll_interval, Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_batch_size() {
        let config = OrchestratorConfig::default().with_batch_size(0);
        assert!(matches!(config.validate(), Err(EngineError::Config(_))));
    }

    #[test]
    fn test_validate_parallelism() {
        let config = OrchestratorConfig::default().with_max_parallel_targets(0);
        assert!(config.validate().is_err());

        let config = OrchestratorConfig::default().with_max_parallel_batches(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_durations() {
        let config = OrchestratorConfig::default().with_session_timeout(Duration::ZERO);
        assert!(config.validate().is_err());

        let config = OrchestratorConfig::default().with_poll_interval(Duration::ZERO);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_builders() {
        let config = OrchestratorConfig::default()
            .with_dry_run(false)
            .with_max_batches(5)
            .with_target_branch("main")
            .with_findings_path("/tmp/findings.sarif");
        assert!(!config.dry_run);
        assert_eq!(config.max_batches, Some(5));
        assert_eq!(config.target_branch.as_deref(), Some("main"));
        assert!(config.findings_path.is_some());
    }
}
