use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("upstream returned {0}")]
    Status(StatusCode),
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// The only telemetry failure that reaches callers.
#[derive(Debug, Error)]
#[error("{detail}")]
pub struct FutureFetchError {
    pub detail: String,
}

impl FutureFetchError {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

impl From<UpstreamError> for FutureFetchError {
    fn from(err: UpstreamError) -> Self {
        FutureFetchError::new(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum SampleLogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),
}
