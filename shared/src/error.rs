use thiserror::Error;

/// Everything that can go wrong between issuing a fractal request and
/// holding decoded pixels.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The `Image` field is not valid base64.
    #[error("bitmap decode error: {0}")]
    Decode(#[from] base64::DecodeError),
    /// The request never produced a response (offline, DNS, CORS, aborted).
    #[error("network error: {0}")]
    Network(String),
    /// The server answered, but not with a usable fractal payload.
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        Self::Protocol(format!("unexpected response body: {e}"))
    }
}
