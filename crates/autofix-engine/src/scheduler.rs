//! Bounded cross-target scheduling.
//!
//! Targets are dispatched into a `JoinSet` behind a semaphore of width
//! `max_parallel_targets`, so no more than that many targets ever have
//! in-flight work regardless of queue length. Aggregation starts only
//! after every target task has reported (join barrier), so the report
//! assembly needs no locking.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, instrument};

use autofix_core::{AggregateReport, TargetResult};

use crate::config::OrchestratorConfig;
use crate::error::{EngineError, Result};
use crate::remote::FixService;
use crate::target::{process_target, TargetSpec};

/// Run every target under the configured concurrency bounds and fold the
/// per-target results into an [`AggregateReport`].
///
/// The only hard failures are pre-dispatch configuration errors (invalid
/// config, empty target list) and join-barrier violations, which indicate
/// a programming error. Per-target and per-batch failures are recorded in
/// the report, never propagated.
#[instrument(skip(targets, config, service), fields(targets = targets.len()))]
pub async fn run_targets(
    targets: Vec<TargetSpec>,
    config: &OrchestratorConfig,
    service: Arc<dyn FixService>,
) -> Result<AggregateReport> {
    config.validate()?;
    if targets.is_empty() {
        return Err(EngineError::NoTargets);
    }

    let semaphore = Arc::new(Semaphore::new(config.max_parallel_targets));
    let mut join_set = JoinSet::new();
    let target_count = targets.len();

    for (idx, spec) in targets.into_iter().enumerate() {
        let semaphore = Arc::clone(&semaphore);
        let service = Arc::clone(&service);
        let config = config.clone();
        join_set.spawn(async move {
            let _permit = semaphore.acquire_owned().await.ok();
            (idx, process_target(spec, &config, service).await)
        });
    }

    // Join barrier: report assembly begins only after all targets quiesce.
    let mut slots: Vec<Option<TargetResult>> = vec![None; target_count];
    while let Some(joined) = join_set.join_next().await {
        let (idx, result) = joined
            .map_err(|e| EngineError::Aggregation(format!("target task join error: {e}")))?;
        slots[idx] = Some(result);
    }

    let mut results = Vec::with_capacity(target_count);
    for (idx, slot) in slots.into_iter().enumerate() {
        results.push(slot.ok_or_else(|| {
            EngineError::Aggregation(format!("missing result for target slot {idx}"))
        })?);
    }

    let report = AggregateReport::from_targets(results);
    info!(
        targets = report.targets.len(),
        batches = report.total_batches,
        succeeded = report.succeeded,
        failed = report.failed,
        timed_out = report.timed_out,
        "run complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::remote::{BatchSummary, RemoteError, RemoteStatus, SessionHandle};

    struct NullService;

    #[async_trait]
    impl FixService for NullService {
        async fn create_session(
            &self,
            _summary: &BatchSummary,
        ) -> std::result::Result<SessionHandle, RemoteError> {
            Err(RemoteError::Create("unexpected call".to_string()))
        }

        async fn poll_session(
            &self,
            _handle: &SessionHandle,
        ) -> std::result::Result<RemoteStatus, RemoteError> {
            Err(RemoteError::Poll("unexpected call".to_string()))
        }

        async fn cancel_session(
            &self,
            _handle: &SessionHandle,
        ) -> std::result::Result<(), RemoteError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_empty_target_list_is_a_hard_failure() {
        let config = OrchestratorConfig::default();
        let result = run_targets(Vec::new(), &config, Arc::new(NullService)).await;
        assert!(matches!(result, Err(EngineError::NoTargets)));
    }

    #[tokio::test]
    async fn test_invalid_config_rejected_before_dispatch() {
        let config = OrchestratorConfig::default().with_max_parallel_targets(0);
        let targets = vec![TargetSpec::from_document("org/app", "{}")];
        let result = run_targets(targets, &config, Arc::new(NullService)).await;
        assert!(matches!(result, Err(EngineError::Config(_))));
    }
}
