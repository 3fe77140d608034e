use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("Missing data: {0}")]
    MissingData(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Export error: {0}")]
    ExportError(String),

    #[error("Feature disabled: {0}")]
    Disabled(String),
}

impl AnalysisError {
    /// True when the failure means "this metrics request is unavailable" rather than a local fault.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            AnalysisError::MissingData(_) | AnalysisError::InsufficientData(_) | AnalysisError::ApiError(_)
        )
    }
}
