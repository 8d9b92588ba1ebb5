//! Error taxonomy for result fetching.
//!
//! All three classes (transport, status, decode) take the same retry path
//! in the poll loop; none of them is fatal to a session.

use thiserror::Error;

/// Failure while fetching or decoding one page of results.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level failure (unreachable host, timeout, connection reset).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint answered with a non-success HTTP status.
    #[error("unexpected status {0}")]
    Status(reqwest::StatusCode),

    /// The response body was not valid JSON.
    #[error("undecodable response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl FetchError {
    /// Short classification label for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Transport(_) => "transport",
            FetchError::Status(_) => "status",
            FetchError::Decode(_) => "decode",
        }
    }
}
