//! Diff-and-emit step run after every buffer mutation.

use kbstep_core::{NormalizedUpdate, StepId};
use kbstep_storage::{ConfigStore, StorageError};
use serde::Deserialize;

/// Whether a draft that fails validation may be written to the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftPolicy {
    /// Hold writes while any active field is invalid.
    #[default]
    ValidOnly,
    /// Write every change; for stores that accept provisional drafts.
    Provisional,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// An update was written; lists the keys that differed.
    Emitted { changed: Vec<String> },
    /// Nothing differs from the last written update.
    Unchanged,
    /// A change exists but the draft is invalid under [`DraftPolicy::ValidOnly`].
    Held,
}

impl SyncOutcome {
    pub fn emitted(&self) -> bool {
        matches!(self, SyncOutcome::Emitted { .. })
    }
}

/// Tracks the last update the store accepted and writes only real changes.
#[derive(Debug, Clone)]
pub struct ChangeSynchronizer {
    policy: DraftPolicy,
    last_emitted: NormalizedUpdate,
}

impl ChangeSynchronizer {
    /// `baseline` is the normalized form of what the store already holds.
    pub fn new(policy: DraftPolicy, baseline: NormalizedUpdate) -> Self {
        Self {
            policy,
            last_emitted: baseline,
        }
    }

    pub fn policy(&self) -> DraftPolicy {
        self.policy
    }

    pub fn last_emitted(&self) -> &NormalizedUpdate {
        &self.last_emitted
    }

    /// Compare `current` with the last emitted update and write it if it
    /// differs and the policy allows.
    ///
    /// Store errors are returned as-is and leave the snapshot untouched, so
    /// calling again with the same state retries the write.
    pub fn on_edit<S: ConfigStore + ?Sized>(
        &mut self,
        store: &mut S,
        step: StepId,
        current: NormalizedUpdate,
        valid: bool,
    ) -> Result<SyncOutcome, StorageError> {
        let changed = current.changed_fields(&self.last_emitted);
        if changed.is_empty() {
            return Ok(SyncOutcome::Unchanged);
        }
        if !valid && self.policy == DraftPolicy::ValidOnly {
            tracing::debug!(%step, ?changed, "draft invalid; update held");
            return Ok(SyncOutcome::Held);
        }

        if let Err(e) = store.apply_update(step, &current) {
            tracing::warn!(%step, error = %e, "update not accepted by store");
            return Err(e);
        }
        tracing::info!(%step, action = %current.action, ?changed, "update emitted");
        self.last_emitted = current;
        Ok(SyncOutcome::Emitted { changed })
    }
}
