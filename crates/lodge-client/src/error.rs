use lodge_shared::types::Capability;
use lodge_shared::validation::FormErrors;
use lodge_store::StoreError;
use thiserror::Error;

/// Failure of a single backend call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend answered with a non-success status.
    #[error("Request failed with status {status}{}", .detail.as_ref().map(|d| format!(": {d}")).unwrap_or_default())]
    Status { status: u16, detail: Option<String> },

    /// The request never produced a response (connection refused, timeout).
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body did not have the expected shape.
    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("Invalid endpoint URL: {0}")]
    Url(String),

    /// Session state could not be read while building the request.
    #[error("Session unavailable: {0}")]
    Session(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Server-provided `detail` (or `error`) message, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    pub fn is_forbidden(&self) -> bool {
        self.status() == Some(403)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// True when no HTTP response was received at all.
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }
}

/// Errors surfaced by views and the CLI.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid input: {0}")]
    Validation(FormErrors),

    #[error("Lock poisoned: {0}")]
    Lock(String),

    #[error("Not permitted: {0:?}")]
    NotPermitted(Capability),

    /// The control is disabled in the current state (already voted, closed,
    /// submission in flight, nothing selected).
    #[error("Action unavailable: {0}")]
    Unavailable(String),

    #[error("User data not found. Please log in.")]
    NoSessionUser,

    #[error("HTTP client setup failed: {0}")]
    Setup(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;
