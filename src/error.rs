use thiserror::Error;

#[derive(Error, Debug)]
pub enum StarHistoryError {
    #[error("request to {url} failed with status {status}")]
    RemoteFailure { url: String, status: u16 },

    #[error("pagination ceiling reached at {url}")]
    PaginationLimit { url: String },

    #[error("malformed star timestamp: {value}")]
    MalformedTimestamp { value: String },

    #[error("rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    #[error("invalid repository: {0}")]
    InvalidRepo(String),

    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StarHistoryError>;
