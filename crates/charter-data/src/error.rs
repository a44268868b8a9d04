//! Error types for snapshot and stream I/O.

use thiserror::Error;

/// Result type alias for feed operations.
pub type Result<T> = std::result::Result<T, FeedError>;

/// Errors raised while fetching or streaming market data.
///
/// These never reach the render path; the session turns them into status
/// flags and keeps the last good series on screen.
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] Box<tokio_tungstenite::tungstenite::Error>),
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),
    #[error("snapshot for {0} contained no usable candles")]
    EmptySnapshot(String),
    #[error("no endpoints configured for {0}")]
    NoEndpoints(String),
    #[error("all {attempts} endpoints failed for {symbol}: {last}")]
    AllEndpointsFailed {
        symbol: String,
        attempts: usize,
        last: String,
    },
}

impl From<tokio_tungstenite::tungstenite::Error> for FeedError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        FeedError::WebSocket(Box::new(err))
    }
}

impl FeedError {
    /// Whether retrying the same request later may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            FeedError::NoEndpoints(_) | FeedError::Url(_) => false,
            FeedError::Status { status, .. } => *status >= 500 || *status == 429,
            _ => true,
        }
    }
}
