//! Success notices shown after an action completes

use std::fmt;

/// Outcome of a successful dashboard action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    LoggedIn,
    Registered,
    OtpSent { phone_number: String },
    PhoneLoggedIn,
    SessionRestored,
    SessionRevoked { session_id: String },
    AllSessionsRevoked,
    LoggedOut,
    AvatarUpdated,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LoggedIn => f.write_str("Login successful"),
            Self::Registered => f.write_str("Registration successful"),
            Self::OtpSent { phone_number } => write!(f, "OTP sent to {phone_number}"),
            Self::PhoneLoggedIn => f.write_str("Phone Login successful"),
            Self::SessionRestored => f.write_str("Session restored"),
            Self::SessionRevoked { session_id } => write!(f, "Session {session_id} revoked"),
            Self::AllSessionsRevoked => f.write_str("All sessions revoked"),
            Self::LoggedOut => f.write_str("Logged out"),
            Self::AvatarUpdated => f.write_str("Avatar updated"),
        }
    }
}
