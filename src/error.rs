//! Error types for the authstore library.

use thiserror::Error;

/// Result type alias for authstore operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Storage, session and credential-policy errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// Collection name was empty
    #[error("missing collection - no place to save record")]
    MissingCollection,

    /// Resource key was empty
    #[error("missing resource - unable to save record (no name)")]
    MissingResource,

    /// Resource does not exist in the collection
    #[error("resource not found")]
    NotFound,

    /// Stored bytes could not be deserialized into the requested shape
    #[error("corrupt document: {0}")]
    Corrupt(String),

    /// Collection or key name would escape the store root
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// Underlying filesystem failure
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Password failed the configured strength policy
    #[error("{0}")]
    WeakPassword(String),

    /// Session not found
    #[error("Session not found")]
    SessionNotFound,

    /// Session has expired
    #[error("Session has expired")]
    SessionExpired,

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Returns true for the expected "nothing stored here yet" outcome
    pub fn is_not_found(&self) -> bool {
        matches!(self, AuthError::NotFound | AuthError::SessionNotFound)
    }

    /// Returns true if the caller passed empty or unusable identifiers
    pub fn is_caller_bug(&self) -> bool {
        matches!(
            self,
            AuthError::MissingCollection
                | AuthError::MissingResource
                | AuthError::InvalidIdentifier(_)
        )
    }

    /// Returns true if this error is due to expiration
    pub fn is_expired(&self) -> bool {
        matches!(self, AuthError::SessionExpired)
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn http_status_code(&self) -> u16 {
        match self {
            AuthError::MissingCollection => 500,
            AuthError::MissingResource => 500,
            AuthError::NotFound => 404,
            AuthError::Corrupt(_) => 500,
            AuthError::InvalidIdentifier(_) => 400,
            AuthError::Io(_) => 500,
            AuthError::WeakPassword(_) => 400,
            AuthError::SessionNotFound => 401,
            AuthError::SessionExpired => 401,
            AuthError::Internal(_) => 500,
        }
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(err: serde_json::Error) -> Self {
        AuthError::Corrupt(err.to_string())
    }
}
