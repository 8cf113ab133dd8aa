//! Session controller for the auth dashboard
//!
//! [`SessionController`] owns the authentication state, talks to the auth
//! service through `authdash-http`, and keeps the session list in step with
//! the server after every mutating action. State changes go through the pure
//! reducer in [`state`].

pub mod controller;
pub mod error;
pub mod notice;
pub mod state;

pub use controller::{Confirmation, SessionController};
pub use error::{Action, DashboardError};
pub use notice::Notice;
pub use state::{AuthAction, AuthState, Effect, SessionsTicket};
