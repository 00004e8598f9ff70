use thiserror::Error;

/// Errors reported during solver construction and input parsing.
///
/// Everything here is fatal at initialization: the training loop itself has
/// no recoverable failure modes (numeric underflow is handled in place and
/// invariant violations are programming errors).
#[derive(Error, Debug)]
pub enum SolverError {
    #[error("invalid card notation: {0}")]
    InvalidCard(String),

    #[error("invalid board notation: {0}")]
    InvalidBoard(String),

    #[error("invalid range syntax: {0}")]
    InvalidRange(String),

    #[error("duplicated combo in range: {0}")]
    DuplicateCombo(String),

    #[error("range is empty after removing board cards")]
    EmptyRange,

    #[error("unknown trainer: {0}")]
    UnknownTrainer(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type SolverResult<T> = Result<T, SolverError>;
