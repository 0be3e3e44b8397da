//! Error types for the selector-forge pipeline.

/// All errors that can occur outside the selector core.
#[derive(thiserror::Error, Debug)]
pub enum ForgeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Screenshot not found: {0}")]
    ScreenshotNotFound(String),

    #[error("Project error: {0}")]
    Project(String),

    #[error("Selector error: {0}")]
    Selector(String),

    #[error("Task failed: {0}")]
    Task(String),
}

impl From<selector_forge::SelectorError> for ForgeError {
    fn from(e: selector_forge::SelectorError) -> Self {
        ForgeError::Selector(e.to_string())
    }
}

impl From<tokio::task::JoinError> for ForgeError {
    fn from(e: tokio::task::JoinError) -> Self {
        ForgeError::Task(e.to_string())
    }
}

pub type ForgeResult<T> = Result<T, ForgeError>;
