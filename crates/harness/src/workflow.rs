use kbstep_core::{FieldValue, StepId};
use kbstep_engine::{EditSession, EditorConfig, EngineError};
use kbstep_storage::{ConfigStore, SqliteStore, StorageError};

use crate::editor::record;

/// Several steps sharing one SQLite store.
pub struct TestWorkflow {
    store: SqliteStore,
    steps: Vec<StepId>,
    pub config: EditorConfig,
}

impl TestWorkflow {
    pub fn new() -> Result<Self, StorageError> {
        crate::init_tracing();
        Ok(Self {
            store: SqliteStore::open_in_memory()?,
            steps: Vec::new(),
            config: EditorConfig::default(),
        })
    }

    pub fn add_step(&mut self, pairs: Vec<(&str, FieldValue)>) -> Result<usize, StorageError> {
        let step = StepId::new();
        self.store.put_raw(step, record(pairs))?;
        let index = self.steps.len();
        self.steps.push(step);
        Ok(index)
    }

    pub fn step(&self, index: usize) -> StepId {
        self.steps[index]
    }

    pub fn store(&self) -> &SqliteStore {
        &self.store
    }

    pub fn edit(&mut self, index: usize) -> Result<EditSession<'_, SqliteStore>, EngineError> {
        let step = self.steps[index];
        EditSession::open(&mut self.store, step, &self.config)
    }
}
