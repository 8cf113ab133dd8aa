//! Client error types

use crate::types::ErrorBody;
use thiserror::Error;

fn describe(message: &Option<String>) -> &str {
    message.as_deref().unwrap_or("no message")
}

/// Client error types
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or request error
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server returned an error status
    #[error("Server error {status}: {}", describe(.message))]
    ServerError {
        status: u16,
        message: Option<String>,
    },

    /// Authentication failed (401)
    #[error("Authentication failed: {}", describe(.0))]
    AuthenticationFailed(Option<String>),

    /// Resource not found
    #[error("Resource not found: {}", describe(.0))]
    NotFound(Option<String>),

    /// Bad request
    #[error("Bad request: {}", describe(.0))]
    BadRequest(Option<String>),

    /// Forbidden (403)
    #[error("Forbidden: {}", describe(.0))]
    Forbidden(Option<String>),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Response parsed but violates the API contract
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Protected request attempted without an access token
    #[error("No access token available")]
    MissingToken,
}

impl ClientError {
    /// Create error from HTTP status code and raw response body
    ///
    /// Only the JSON `message` field counts as a server-supplied message.
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|body| body.message)
            .filter(|message| !message.trim().is_empty());

        match status.as_u16() {
            400 => Self::BadRequest(message),
            401 => Self::AuthenticationFailed(message),
            403 => Self::Forbidden(message),
            404 => Self::NotFound(message),
            _ => Self::ServerError {
                status: status.as_u16(),
                message,
            },
        }
    }

    /// True for 401 and 403 responses
    pub const fn is_auth_expired(&self) -> bool {
        matches!(self, Self::AuthenticationFailed(_) | Self::Forbidden(_))
    }

    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::AuthenticationFailed(_) => Some(401),
            Self::Forbidden(_) => Some(403),
            Self::NotFound(_) => Some(404),
            Self::BadRequest(_) => Some(400),
            Self::ServerError { status, .. } => Some(*status),
            Self::Request(error) => error.status().map(|status| status.as_u16()),
            _ => None,
        }
    }

    /// Message supplied by the server in the error body
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::AuthenticationFailed(message)
            | Self::Forbidden(message)
            | Self::NotFound(message)
            | Self::BadRequest(message)
            | Self::ServerError { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}
