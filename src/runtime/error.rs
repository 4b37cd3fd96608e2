use crate::platform::PlatformError;

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Platform(#[from] PlatformError),
    #[error("download error: {0}")]
    Download(#[from] reqwest::Error),
    #[error("telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),
    #[error("file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("task error: {0}")]
    TaskError(String),
    #[error("link is already being processed: {0}")]
    AlreadyProcessing(String),
}

impl From<tokio::task::JoinError> for RuntimeError {
    fn from(error: tokio::task::JoinError) -> Self {
        RuntimeError::TaskError(error.to_string())
    }
}
