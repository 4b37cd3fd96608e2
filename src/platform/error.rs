use super::instagram::InstagramError;

#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("parsing error: {0}")]
    ParsingError(String),
    #[error("{0}")]
    Instagram(#[from] InstagramError),
}
