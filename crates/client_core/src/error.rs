use thiserror::Error;

/// Uniform failure raised by every backend call.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The backend answered with a truthy `error` field.
    #[error("{0}")]
    Remote(String),
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("malformed response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{endpoint} returned status {status}")]
    Status { endpoint: String, status: u16 },
    #[error("invalid server url '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("failed to read upload '{path}': {source}")]
    ReadUpload {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ClientError {
    /// Text surfaced to the user; remote messages pass through verbatim.
    pub fn message(&self) -> String {
        self.to_string()
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, ClientError::Remote(_))
    }
}
