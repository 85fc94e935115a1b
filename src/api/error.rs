/// Errors from the remote API.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Connection, timeout or protocol failure
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Non-success HTTP status
    #[error("Server returned status {status}: {body}")]
    Status { status: u16, body: String },
    /// Response body did not match the expected shape
    #[error("Unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
    /// Base URL missing or unusable
    #[error("API not configured: {0}")]
    NotConfigured(String),
}

impl ApiError {
    /// True for 404 responses, which callers may treat as "already gone".
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Status { status: 404, .. })
    }
}
