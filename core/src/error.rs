use thiserror::Error;

/// Failure of the remote call. Cloneable so one failed request can be
/// handed to every caller that was coalesced onto it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("unexpected HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("graphql errors: {}", .0.join("; "))]
    GraphQl(Vec<String>),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError::Request(err.to_string())
    }
}

impl From<tokio::task::JoinError> for TransportError {
    fn from(err: tokio::task::JoinError) -> Self {
        TransportError::Request(format!("remote call aborted: {err}"))
    }
}

#[derive(Debug, Error)]
pub enum IntelError {
    #[error("unexpected uri format: {0}")]
    MalformedUri(String),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl From<serde_json::Error> for IntelError {
    fn from(err: serde_json::Error) -> Self {
        IntelError::MalformedResponse(err.to_string())
    }
}

pub type IntelResult<T> = Result<T, IntelError>;
