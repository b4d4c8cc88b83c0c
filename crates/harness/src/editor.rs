use kbstep_core::{FieldValue, RawConfig, StepId};
use kbstep_engine::{EditSession, EditorConfig, EngineError};
use kbstep_storage::{ConfigStore, MemoryStore, StorageError};

/// One workflow step backed by an in-memory store.
pub struct TestEditor {
    pub store: MemoryStore,
    pub step: StepId,
    pub config: EditorConfig,
}

impl Default for TestEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl TestEditor {
    pub fn new() -> Self {
        crate::init_tracing();
        Self {
            store: MemoryStore::new(),
            step: StepId::new(),
            config: EditorConfig::default(),
        }
    }

    pub fn with_config(config: EditorConfig) -> Self {
        Self {
            config,
            ..Self::new()
        }
    }

    /// Store a raw record for the step, as an older editor would have.
    pub fn seed(&mut self, pairs: Vec<(&str, FieldValue)>) -> Result<(), StorageError> {
        self.store.put_raw(self.step, record(pairs))
    }

    pub fn open(&mut self) -> Result<EditSession<'_, MemoryStore>, EngineError> {
        EditSession::open(&mut self.store, self.step, &self.config)
    }

    pub fn stored(&self) -> Result<Option<RawConfig>, StorageError> {
        self.store.load(self.step)
    }

    pub fn emitted_count(&self) -> usize {
        self.store.applied_for(self.step).len()
    }
}

pub fn record(pairs: Vec<(&str, FieldValue)>) -> RawConfig {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}
