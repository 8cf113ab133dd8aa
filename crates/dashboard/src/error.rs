//! Dashboard error types and user-facing messages

use authdash_core::ValidationError;
use authdash_http::ClientError;
use std::fmt;
use thiserror::Error;

/// User action a failure is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Login,
    Register,
    SendOtp,
    VerifyOtp,
    Refresh,
    FetchSessions,
    RevokeSession,
    RevokeAllSessions,
    Logout,
    RegenerateAvatar,
    UpdateAvatarStyle,
}

impl Action {
    /// Message shown when the server did not supply one
    pub const fn fallback_message(self) -> &'static str {
        match self {
            Self::Login => "Login failed",
            Self::Register => "Registration failed",
            Self::SendOtp => "Failed to send OTP",
            Self::VerifyOtp => "Invalid OTP",
            Self::Refresh => "Session expired. Please log in again.",
            Self::FetchSessions => "Failed to fetch sessions",
            Self::RevokeSession => "Failed to revoke session",
            Self::RevokeAllSessions => "Failed to revoke all sessions",
            Self::Logout => "Logout failed",
            Self::RegenerateAvatar => "Failed to regenerate avatar",
            Self::UpdateAvatarStyle => "Failed to update avatar style",
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Register => "register",
            Self::SendOtp => "send_otp",
            Self::VerifyOtp => "verify_otp",
            Self::Refresh => "refresh",
            Self::FetchSessions => "fetch_sessions",
            Self::RevokeSession => "revoke_session",
            Self::RevokeAllSessions => "revoke_all_sessions",
            Self::Logout => "logout",
            Self::RegenerateAvatar => "regenerate_avatar",
            Self::UpdateAvatarStyle => "update_avatar_style",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by [`crate::SessionController`] operations
#[derive(Debug, Error)]
pub enum DashboardError {
    /// Input rejected before any request was sent
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A protected action was attempted without an access token
    #[error("Not logged in")]
    NotAuthenticated,

    /// OTP verification without a prior send to the same number
    #[error("No OTP has been sent to {0}")]
    OtpNotRequested(String),

    /// A destructive action was declined
    #[error("Confirmation required")]
    ConfirmationRequired,

    /// The request reached the network and failed
    #[error("{action} failed: {source}")]
    Client {
        action: Action,
        #[source]
        source: ClientError,
    },
}

impl DashboardError {
    pub const fn client(action: Action, source: ClientError) -> Self {
        Self::Client { action, source }
    }

    /// Message to show the user
    ///
    /// Network failures surface the server's message when it sent one and the
    /// action's fallback otherwise. Local failures describe themselves.
    pub fn user_message(&self) -> String {
        match self {
            Self::Client { action, source } => source
                .server_message()
                .unwrap_or(action.fallback_message())
                .to_string(),
            other => other.to_string(),
        }
    }

    /// Whether the failure happened without a network round trip
    pub const fn is_local(&self) -> bool {
        !matches!(self, Self::Client { .. })
    }

    /// HTTP status of a network failure, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Client { source, .. } => source.status(),
            _ => None,
        }
    }
}
