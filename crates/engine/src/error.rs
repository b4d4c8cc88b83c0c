use kbstep_core::CoreError;
use kbstep_storage::StorageError;
use thiserror::Error;

use crate::validate::ValidationErrors;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("core error: {0}")]
    Core(#[from] CoreError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("session already committed: {0}")]
    AlreadyCommitted(String),

    #[error("invalid editor config: {0}")]
    Config(#[from] toml::de::Error),
}

impl EngineError {
    /// Whether the whole configuration step must be rejected, as opposed to
    /// an error the operator can correct in place or the caller can retry.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            EngineError::Core(CoreError::UnknownAction(_) | CoreError::UnknownField(_))
        )
    }

    pub fn validation(&self) -> Option<&ValidationErrors> {
        match self {
            EngineError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}
