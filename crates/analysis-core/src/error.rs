use thiserror::Error;

/// Errors raised at the input-parsing boundary.
///
/// The scoring functions themselves are total: once an input has been parsed
/// into the typed structures, analysis never fails. Malformed fields inside an
/// otherwise well-formed input degrade to "no value" instead of erroring.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
