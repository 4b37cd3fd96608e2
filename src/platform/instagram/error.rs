#[derive(Debug, thiserror::Error)]
pub enum InstagramError {
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
    #[error("Media not found or private: {0}")]
    NotFound(String),
    #[error("Instagram login required to view this content")]
    LoginRequired,
    #[error("Too many requests, try again later")]
    TooManyRequests,
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}
