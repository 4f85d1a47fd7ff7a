//! Batch types produced by the planner.

use serde::{Deserialize, Serialize};

use crate::finding::Finding;

/// Bucket tier: the grouping granularity that produced a batch.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Same file + same rule.
    A,
    /// Same rule, any file.
    B,
    /// Same containing directory (catch-all).
    C,
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::A => write!(f, "A"),
            Tier::B => write!(f, "B"),
            Tier::C => write!(f, "C"),
        }
    }
}

/// An ordered, non-empty group of findings dispatched together to one
/// remote fix session. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Batch {
    /// Group key: `file::rule` for tier A, rule id for tier B, directory
    /// for tier C.
    pub key: String,

    /// Bucket tier that produced this batch.
    pub tier: Tier,

    /// Sequence index within the target's batch plan.
    pub index: usize,

    /// Findings in this batch, in canonical order.
    pub findings: Vec<Finding>,
}

impl Batch {
    /// Number of findings in this batch.
    pub fn len(&self) -> usize {
        self.findings.len()
    }

    /// A batch is never empty by construction; provided for completeness.
    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    /// Ids of the findings in this batch.
    pub fn finding_ids(&self) -> Vec<String> {
        self.findings.iter().map(|f| f.id.clone()).collect()
    }
}

/// Output of the planner: ordered batches plus any findings truncated by
/// a batch-count cap (planned but not processed, never silently dropped).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BatchPlan {
    /// Batches in dispatch order: all tier A, then B, then C.
    pub batches: Vec<Batch>,

    /// Findings cut off by `max_batches` truncation.
    pub unprocessed: Vec<Finding>,
}

impl BatchPlan {
    /// Total findings covered by the plan (batched + unprocessed).
    pub fn total_findings(&self) -> usize {
        self.batches.iter().map(Batch::len).sum::<usize>() + self.unprocessed.len()
    }

    /// Whether the plan contains no batches at all.
    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }
}
