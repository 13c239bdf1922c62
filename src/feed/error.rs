use thiserror::Error;

/// Why a fetch from an [`ArticleSource`](super::ArticleSource) failed.
///
/// Every variant is retryable; callers log it and leave their state alone.
#[derive(Error, Debug)]
pub enum FeedError {
    /// The request never produced a response (DNS, connect, reset, ...).
    #[error("request failed: {0}")]
    Fetch(#[from] reqwest::Error),
    /// The server answered with a non-success status.
    #[error("unexpected status {0}")]
    Status(reqwest::StatusCode),
    /// The body was not a valid article payload.
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl FeedError {
    /// `true` for malformed bodies, `false` for transport and status failures.
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_))
    }
}

pub type FeedResult<T> = Result<T, FeedError>;
