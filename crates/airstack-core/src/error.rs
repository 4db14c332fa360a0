/// Failures of a single HTTP exchange.
///
/// A non-success status code is not one of these: the transport hands it back
/// as an ordinary response for the client to interpret.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("request cancelled")]
    Cancelled,

    #[error("request deadline exceeded")]
    DeadlineExceeded,

    #[error("malformed error body for status {status}: {message}")]
    MalformedErrorBody { status: u16, message: String },
}

impl TransportError {
    /// True for cancellation and deadline expiry, as opposed to network faults.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled | Self::DeadlineExceeded)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),

    #[error("encode request: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("decode response: {0}")]
    Decode(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}
