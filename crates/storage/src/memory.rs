use std::collections::BTreeMap;

use kbstep_core::{NormalizedUpdate, RawConfig, StepId};

use crate::error::StorageError;
use crate::traits::ConfigStore;

/// In-process store. Keeps a log of every accepted update so callers can
/// assert on exactly what was written.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: BTreeMap<StepId, RawConfig>,
    applied: Vec<(StepId, NormalizedUpdate)>,
    fail_next: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `n` writes fail with [`StorageError::Unavailable`].
    pub fn fail_next_writes(&mut self, n: usize) {
        self.fail_next = n;
    }

    pub fn applied(&self) -> &[(StepId, NormalizedUpdate)] {
        &self.applied
    }

    pub fn applied_for(&self, step: StepId) -> Vec<&NormalizedUpdate> {
        self.applied
            .iter()
            .filter(|(s, _)| *s == step)
            .map(|(_, u)| u)
            .collect()
    }
}

impl ConfigStore for MemoryStore {
    fn load(&self, step: StepId) -> Result<Option<RawConfig>, StorageError> {
        Ok(self.records.get(&step).cloned())
    }

    fn apply_update(
        &mut self,
        step: StepId,
        update: &NormalizedUpdate,
    ) -> Result<(), StorageError> {
        if self.fail_next > 0 {
            self.fail_next -= 1;
            return Err(StorageError::Unavailable(format!("write to step {step} rejected")));
        }
        self.records.insert(step, update.to_record());
        self.applied.push((step, update.clone()));
        Ok(())
    }

    fn put_raw(&mut self, step: StepId, record: RawConfig) -> Result<(), StorageError> {
        self.records.insert(step, record);
        Ok(())
    }
}
