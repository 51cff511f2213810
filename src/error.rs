use thiserror::Error;

#[derive(Error, Debug)]
pub enum CvmError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Resource not found")]
    NotFound,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Invalid year: CVM bulk archives start in 2010")]
    InvalidYear,

    #[error("Unexpected archive shape in {entry}: {reason}")]
    UnexpectedShape { entry: String, reason: String },

    #[error("Invalid filter parameter `{param}`: {reason}")]
    InvalidFilter { param: &'static str, reason: String },

    #[error("A reload is already in progress")]
    ReloadInProgress,

    #[error("File error: {0}")]
    FileError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("ZIP error: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl CvmError {
    /// Whether the error originates in the fetch layer (network or local
    /// storage) rather than the parse or query layers. The orchestrator
    /// downgrades both families to per-archive partial failures; this only
    /// affects log wording.
    pub fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            CvmError::RequestError(_)
                | CvmError::NotFound
                | CvmError::InvalidResponse(_)
                | CvmError::RateLimitExceeded
                | CvmError::FileError(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, CvmError>;
