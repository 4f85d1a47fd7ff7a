//! Deterministic three-tier batch planning.
//!
//! Partitions findings into batches by progressively coarser group keys:
//! tier A (same file + same rule), tier B (same rule), tier C (same
//! containing directory). Tiers A and B only claim a group when it can fill
//! at least one full batch; tier C is the catch-all and consumes every
//! remaining finding. Output ordering is fully deterministic for a given
//! input ordering and configuration.

use std::collections::BTreeMap;

use tracing::debug;

use crate::batch::{Batch, BatchPlan, Tier};
use crate::error::{AutofixError, Result};
use crate::finding::Finding;

/// Partition `findings` into ordered batches of at most `batch_size`.
///
/// When `max_batches` is set, the batch sequence is truncated to the first
/// N batches after ordering is established; truncated findings are returned
/// in [`BatchPlan::unprocessed`] rather than dropped.
///
/// Fails with [`AutofixError::Planning`] only when `batch_size < 1`.
/// Zero findings yield an empty plan, not an error.
pub fn plan(
    findings: &[Finding],
    batch_size: usize,
    max_batches: Option<usize>,
) -> Result<BatchPlan> {
    if batch_size < 1 {
        return Err(AutofixError::Planning(
            "batch size must be >= 1".to_string(),
        ));
    }

    let mut pool: Vec<Finding> = findings.to_vec();
    let mut batches: Vec<Batch> = Vec::new();

    // Tier A: same file + same rule. Claims a group only when it fills at
    // least one batch; smaller groups fall through to coarser tiers.
    pool = emit_tier(
        pool,
        Tier::A,
        batch_size,
        false,
        |f| format!("{}::{}", f.file, f.rule_id),
        &mut batches,
    );

    // Tier B: same rule, any file.
    pool = emit_tier(
        pool,
        Tier::B,
        batch_size,
        false,
        |f| f.rule_id.clone(),
        &mut batches,
    );

    // Tier C: same directory. Catch-all: consumes everything remaining,
    // since a directory is always defined (root sentinel ".").
    pool = emit_tier(pool, Tier::C, batch_size, true, |f| f.directory(), &mut batches);
    debug_assert!(pool.is_empty(), "tier C must consume the remaining pool");

    // Assign sequence indexes over the established ordering, then truncate.
    for (idx, batch) in batches.iter_mut().enumerate() {
        batch.index = idx;
    }

    let mut unprocessed = Vec::new();
    if let Some(cap) = max_batches {
        for cut in batches.split_off(cap.min(batches.len())) {
            unprocessed.extend(cut.findings);
        }
    }

    debug!(
        batches = batches.len(),
        unprocessed = unprocessed.len(),
        "planned batches"
    );

    Ok(BatchPlan {
        batches,
        unprocessed,
    })
}

/// Group `pool` by `key_fn` and emit batches for qualifying groups.
///
/// A group qualifies when `catch_all` is set or when it holds at least
/// `batch_size` findings. Groups are visited in ascending key order;
/// members are sorted by the canonical key (file, rule, location) and
/// chunked into consecutive batches of at most `batch_size`, so only a
/// group's final batch may be smaller. Returns the unassigned remainder.
fn emit_tier<K>(
    pool: Vec<Finding>,
    tier: Tier,
    batch_size: usize,
    catch_all: bool,
    key_fn: K,
    batches: &mut Vec<Batch>,
) -> Vec<Finding>
where
    K: Fn(&Finding) -> String,
{
    let mut groups: BTreeMap<String, Vec<Finding>> = BTreeMap::new();
    for finding in pool {
        groups.entry(key_fn(&finding)).or_default().push(finding);
    }

    let mut remainder = Vec::new();
    for (key, mut members) in groups {
        if !catch_all && members.len() < batch_size {
            remainder.extend(members);
            continue;
        }

        members.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        for chunk in members.chunks(batch_size) {
            batches.push(Batch {
                key: key.clone(),
                tier,
                index: 0, // assigned after all tiers are emitted
                findings: chunk.to_vec(),
            });
        }
    }

    // Restore canonical order for the next tier's grouping.
    remainder.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    remainder
}
