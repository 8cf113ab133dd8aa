//! Authentication state and its reducer
//!
//! [`AuthState::apply`] is the only way state changes. It is pure: it takes
//! the current state and an [`AuthAction`] and returns the next state plus an
//! [`Effect`] the controller must run. Keeping network calls out of the
//! reducer lets the controller hold its lock only for the state swap.

use authdash_core::{Session, User};
use std::fmt;

/// Authentication state
///
/// An empty access token means unauthenticated. Whenever the token is empty,
/// the user and the session list are empty too.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    access_token: String,
    user: Option<User>,
    sessions: Vec<Session>,
    pending_otp: Option<String>,
    epoch: u64,
    sessions_seq: u64,
    applied_seq: u64,
}

/// Identifies one session-list request
///
/// A response is applied only when its ticket belongs to the current epoch and
/// is newer than the last applied one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionsTicket {
    epoch: u64,
    seq: u64,
}

/// State transitions
#[derive(Debug, Clone)]
pub enum AuthAction {
    /// A new access token was obtained by login, register, OTP or refresh
    Authenticated {
        access_token: String,
        user: Option<User>,
    },
    /// A refresh started in `epoch` renewed the access token
    ///
    /// Ignored unless the state is still authenticated in that epoch, so a
    /// refresh that outlives a logout cannot log the user back in.
    Refreshed {
        epoch: u64,
        access_token: String,
        user: Option<User>,
    },
    /// The server returned an updated profile
    UserUpdated(User),
    /// A session list response arrived
    SessionsLoaded {
        ticket: SessionsTicket,
        sessions: Vec<Session>,
    },
    /// An OTP was sent to this phone number
    OtpRequested(String),
    /// Drop all auth state
    Cleared,
}

/// Work the controller must do after a transition
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    /// The token went from empty to non-empty; load the session list once
    FetchSessions,
}

impl AuthState {
    /// Compute the next state
    pub fn apply(mut self, action: AuthAction) -> (Self, Effect) {
        match action {
            AuthAction::Authenticated { access_token, user } => {
                if access_token.is_empty() {
                    return self.apply(AuthAction::Cleared);
                }

                let was_authenticated = self.is_authenticated();
                self.access_token = access_token;
                self.pending_otp = None;

                if was_authenticated {
                    // Refresh responses may omit the profile
                    if user.is_some() {
                        self.user = user;
                    }
                    return (self, Effect::None);
                }

                self.user = user;
                self.sessions.clear();
                self.applied_seq = 0;
                self.epoch += 1;
                (self, Effect::FetchSessions)
            }
            AuthAction::Refreshed {
                epoch,
                access_token,
                user,
            } => {
                if !self.is_authenticated() || epoch != self.epoch {
                    return (self, Effect::None);
                }
                if access_token.is_empty() {
                    return self.apply(AuthAction::Cleared);
                }

                self.access_token = access_token;
                if user.is_some() {
                    self.user = user;
                }
                (self, Effect::None)
            }
            AuthAction::UserUpdated(user) => {
                if self.is_authenticated() {
                    self.user = Some(user);
                }
                (self, Effect::None)
            }
            AuthAction::SessionsLoaded { ticket, sessions } => {
                if self.accepts(ticket) {
                    self.sessions = sessions;
                    self.applied_seq = ticket.seq;
                }
                (self, Effect::None)
            }
            AuthAction::OtpRequested(phone_number) => {
                self.pending_otp = Some(phone_number);
                (self, Effect::None)
            }
            AuthAction::Cleared => {
                self.access_token.clear();
                self.user = None;
                self.sessions.clear();
                self.applied_seq = 0;
                self.epoch += 1;
                (self, Effect::None)
            }
        }
    }

    /// Reserve a ticket for a session-list request about to be sent
    pub fn issue_ticket(&mut self) -> SessionsTicket {
        self.sessions_seq += 1;
        SessionsTicket {
            epoch: self.epoch,
            seq: self.sessions_seq,
        }
    }

    fn accepts(&self, ticket: SessionsTicket) -> bool {
        self.is_authenticated() && ticket.epoch == self.epoch && ticket.seq > self.applied_seq
    }

    pub fn is_authenticated(&self) -> bool {
        !self.access_token.is_empty()
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub const fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    /// Phone number the last OTP was sent to, until a login succeeds
    pub fn pending_otp(&self) -> Option<&str> {
        self.pending_otp.as_deref()
    }

    /// Incremented on every login from the unauthenticated state and on every clear
    pub const fn epoch(&self) -> u64 {
        self.epoch
    }
}

impl fmt::Debug for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthState")
            .field("authenticated", &self.is_authenticated())
            .field("user", &self.user)
            .field("sessions", &self.sessions.len())
            .field("pending_otp", &self.pending_otp)
            .field("epoch", &self.epoch)
            .finish_non_exhaustive()
    }
}
