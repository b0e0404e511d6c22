//! Two-tier mutation outcomes. Primary records (contests, enrollments,
//! points overrides) are authoritative and their failures abort the request;
//! secondary writes (team cache field, player points mirror, stale logo
//! cleanup) are best-effort caches that may transiently lag. A failed
//! secondary write is recorded here instead of failing the operation, and the
//! facade logs it before responding with the primary value.

use tracing::warn;

use crate::dao::storage::StorageError;

/// A best-effort secondary write that did not land.
#[derive(Debug)]
pub struct DegradedWrite {
    /// What the write was meant to update, e.g. `team 1234 current_contest_id`.
    pub target: String,
    /// Why it failed.
    pub reason: String,
}

impl DegradedWrite {
    /// Record a failed secondary write against a storage error.
    pub fn new(target: impl Into<String>, error: &StorageError) -> Self {
        Self {
            target: target.into(),
            reason: error.message().to_owned(),
        }
    }
}

/// Primary value of a mutation plus the secondary writes that failed.
#[derive(Debug)]
pub struct MutationOutcome<T> {
    /// Authoritative result of the operation.
    pub value: T,
    /// Secondary writes dropped along the way.
    pub degraded: Vec<DegradedWrite>,
}

impl<T> MutationOutcome<T> {
    /// Outcome with no degraded writes.
    pub fn clean(value: T) -> Self {
        Self {
            value,
            degraded: Vec::new(),
        }
    }

    /// Log every degraded write and hand back the primary value.
    pub fn log_and_take(self, operation: &str) -> T {
        for write in &self.degraded {
            warn!(
                operation,
                target = %write.target,
                reason = %write.reason,
                "best-effort secondary write dropped"
            );
        }
        self.value
    }
}
