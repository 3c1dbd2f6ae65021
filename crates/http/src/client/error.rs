//! Client error types

use collab_core::CoreError;
use thiserror::Error;

/// Client error types
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or request error
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server returned an error status
    #[error("Server error {status}: {message}")]
    ServerError { status: u16, message: String },

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Bad request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Forbidden
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Request payload failed validation
    #[error("Validation failed: {0}")]
    Unprocessable(String),

    /// Operation needs an access token and none is stored
    #[error("Not signed in")]
    MissingToken,

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Token storage failed
    #[error("Session storage error: {0}")]
    Storage(#[from] CoreError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl ClientError {
    /// Create error from HTTP status code
    #[must_use]
    pub fn from_status(status: reqwest::StatusCode, message: String) -> Self {
        match status.as_u16() {
            400 => Self::BadRequest(message),
            401 => Self::AuthenticationFailed(message),
            403 => Self::Forbidden(message),
            404 => Self::NotFound(message),
            422 => Self::Unprocessable(message),
            _ => Self::ServerError {
                status: status.as_u16(),
                message,
            },
        }
    }

    /// HTTP status the server answered with, if any
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::BadRequest(_) => Some(400),
            Self::AuthenticationFailed(_) => Some(401),
            Self::Forbidden(_) => Some(403),
            Self::NotFound(_) => Some(404),
            Self::Unprocessable(_) => Some(422),
            Self::ServerError { status, .. } => Some(*status),
            Self::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether the credentials were rejected and the session must be renewed
    #[must_use]
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::AuthenticationFailed(_))
    }
}

/// Why a token refresh did not produce a new pair
///
/// Shared between every request waiting on the same refresh, hence `Clone`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Token refresh failed: {0}")]
pub struct RefreshFailure(pub String);
