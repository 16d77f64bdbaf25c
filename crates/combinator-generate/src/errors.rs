use thiserror::Error;

use crate::model::GenerationReport;

/// Reasons a generation call produced no output.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("unknown method '{0}'")]
    UnknownMethod(String),
    #[error("required field '{field}' has no valid candidates")]
    RequiredField {
        field: String,
        report: Box<GenerationReport>,
    },
    #[error("{requested} variations exceed the limit of {limit}")]
    TooManyVariations {
        requested: u128,
        limit: u64,
        report: Box<GenerationReport>,
    },
    #[error("logging error: {0}")]
    Logging(String),
}

impl GenerationError {
    /// Diagnostics gathered before the call was suppressed, if any.
    pub fn report(&self) -> Option<&GenerationReport> {
        match self {
            GenerationError::RequiredField { report, .. }
            | GenerationError::TooManyVariations { report, .. } => Some(&**report),
            GenerationError::UnknownMethod(_) | GenerationError::Logging(_) => None,
        }
    }
}
