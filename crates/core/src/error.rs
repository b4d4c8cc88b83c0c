use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown action: {0}")]
    UnknownAction(String),

    #[error("unknown field: {0}")]
    UnknownField(String),
}
