use kbstep_core::{NormalizedUpdate, RawConfig, StepId};

use crate::error::StorageError;

/// The external store holding one configuration record per workflow step.
///
/// Writes are whole-record replacements with last-write-wins semantics.
pub trait ConfigStore {
    /// Raw record for a step, as last written. `None` if the step has never
    /// been configured.
    fn load(&self, step: StepId) -> Result<Option<RawConfig>, StorageError>;

    fn apply_update(
        &mut self,
        step: StepId,
        update: &NormalizedUpdate,
    ) -> Result<(), StorageError>;

    /// Seed a step with a record verbatim, bypassing normalization. Used for
    /// imports and for records written by older editors.
    fn put_raw(&mut self, step: StepId, record: RawConfig) -> Result<(), StorageError>;

    /// Like [`ConfigStore::load`] but a missing step is an error.
    fn committed(&self, step: StepId) -> Result<RawConfig, StorageError> {
        self.load(step)?
            .ok_or_else(|| StorageError::NotFound(step.to_string()))
    }
}
