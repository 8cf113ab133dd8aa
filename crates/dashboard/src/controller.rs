//! Session controller
//!
//! Owns the [`AuthState`] and drives every dashboard action against the auth
//! service. Protected calls go through a [`RetryingClient`] backed by the
//! controller itself, so an expired access token is refreshed once and the
//! request replayed without the caller noticing.

use crate::error::{Action, DashboardError};
use crate::notice::Notice;
use crate::state::{AuthAction, AuthState, Effect};
use async_trait::async_trait;
use authdash_core::validation::{validate_registration, validate_required};
use authdash_core::{ApiConfig, Session, User};
use authdash_http::types::{
    AuthResponse, LoginRequest, RegisterRequest, SendOtpRequest, VerifyOtpRequest,
};
use authdash_http::{ClientError, PublicClient, RetryingClient, TokenSource};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Explicit answer to a destructive prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
}

impl From<bool> for Confirmation {
    fn from(confirmed: bool) -> Self {
        if confirmed {
            Self::Confirmed
        } else {
            Self::Declined
        }
    }
}

/// Drives authentication and session management for one user
///
/// The state lock is only held to read or swap state, never across a request.
/// The refresh lock serializes calls to the refresh endpoint, since the
/// service may rotate the refresh cookie on every use.
pub struct SessionController {
    client: PublicClient,
    state: Mutex<AuthState>,
    refresh_lock: Mutex<()>,
}

impl SessionController {
    pub fn new(client: PublicClient) -> Self {
        Self {
            client,
            state: Mutex::new(AuthState::default()),
            refresh_lock: Mutex::new(()),
        }
    }

    /// Build a controller and its HTTP client from configuration
    pub fn from_config(config: &ApiConfig) -> Result<Self, ClientError> {
        let mut builder = PublicClient::builder()
            .base_url(config.base_url.as_str())
            .user_agent(config.user_agent.as_str());
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        Ok(Self::new(builder.build()?))
    }

    pub const fn client(&self) -> &PublicClient {
        &self.client
    }

    /// Copy of the current state
    pub async fn snapshot(&self) -> AuthState {
        self.state.lock().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.lock().await.is_authenticated()
    }

    pub async fn user(&self) -> Option<User> {
        self.state.lock().await.user().cloned()
    }

    pub async fn sessions(&self) -> Vec<Session> {
        self.state.lock().await.sessions().to_vec()
    }

    /// Try to resume a previous login with the stored refresh credential
    ///
    /// Returns whether the controller ended up authenticated.
    pub async fn restore(&self) -> bool {
        match self.refresh_access_token().await {
            Ok(_) => true,
            Err(error) => {
                debug!(error = %error, "No session to restore");
                false
            }
        }
    }

    /// Log in with email and password
    pub async fn login(&self, email: &str, password: &str) -> Result<Notice, DashboardError> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self
            .client
            .login(&request)
            .await
            .map_err(|e| fail(Action::Login, e))?;

        info!("Logged in with email");
        self.authenticate(response).await;
        Ok(Notice::LoggedIn)
    }

    /// Create an account and log in
    ///
    /// Email format, password strength and confirmation are checked locally,
    /// in that order, before anything is sent.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<Notice, DashboardError> {
        validate_registration(email, password, confirm_password)?;

        let request = RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self
            .client
            .register(&request)
            .await
            .map_err(|e| fail(Action::Register, e))?;

        info!("Registered new account");
        self.authenticate(response).await;
        Ok(Notice::Registered)
    }

    /// Ask the service to text a one-time code to a phone number
    pub async fn send_otp(&self, phone_number: &str) -> Result<Notice, DashboardError> {
        validate_required(phone_number, "Phone number")?;

        let request = SendOtpRequest {
            phone_number: phone_number.to_string(),
        };
        self.client
            .send_otp(&request)
            .await
            .map_err(|e| fail(Action::SendOtp, e))?;

        self.update(AuthAction::OtpRequested(phone_number.to_string()))
            .await;
        Ok(Notice::OtpSent {
            phone_number: phone_number.to_string(),
        })
    }

    /// Log in with the code sent by [`Self::send_otp`]
    pub async fn verify_otp(&self, phone_number: &str, otp: &str) -> Result<Notice, DashboardError> {
        validate_required(phone_number, "Phone number")?;
        validate_required(otp, "OTP")?;

        let requested = self.state.lock().await.pending_otp() == Some(phone_number);
        if !requested {
            return Err(DashboardError::OtpNotRequested(phone_number.to_string()));
        }

        let request = VerifyOtpRequest {
            phone_number: phone_number.to_string(),
            otp: otp.to_string(),
        };
        let response = self
            .client
            .verify_otp(&request)
            .await
            .map_err(|e| fail(Action::VerifyOtp, e))?;

        info!("Logged in with phone OTP");
        self.authenticate(response).await;
        Ok(Notice::PhoneLoggedIn)
    }

    /// Load the session list
    ///
    /// Returns the list held after the response was applied. A response that
    /// arrives after a newer fetch, or after a logout, is dropped.
    pub async fn fetch_sessions(&self) -> Result<Vec<Session>, DashboardError> {
        let ticket = {
            let mut state = self.state.lock().await;
            if !state.is_authenticated() {
                return Err(DashboardError::NotAuthenticated);
            }
            state.issue_ticket()
        };

        let result = self.authorized().list_sessions().await;
        let sessions = self.settle(Action::FetchSessions, result).await?;
        debug!(count = sessions.len(), "Fetched sessions");

        self.update(AuthAction::SessionsLoaded { ticket, sessions })
            .await;
        Ok(self.sessions().await)
    }

    /// Revoke one session, then reload the list
    ///
    /// The list is reloaded even when the revoke failed, as long as the
    /// controller is still authenticated.
    pub async fn revoke_session(&self, session_id: &str) -> Result<Notice, DashboardError> {
        validate_required(session_id, "Session id")?;

        let result = self.authorized().revoke_session(session_id).await;
        let outcome = self.settle(Action::RevokeSession, result).await;
        self.refetch_sessions().await;
        outcome?;

        info!(session_id, "Revoked session");
        Ok(Notice::SessionRevoked {
            session_id: session_id.to_string(),
        })
    }

    /// Revoke every session of the user, then reload the list
    pub async fn revoke_all_sessions(
        &self,
        confirmation: Confirmation,
    ) -> Result<Notice, DashboardError> {
        if confirmation == Confirmation::Declined {
            return Err(DashboardError::ConfirmationRequired);
        }

        let result = self.authorized().revoke_all_sessions().await;
        let outcome = self.settle(Action::RevokeAllSessions, result).await;
        self.refetch_sessions().await;
        outcome?;

        info!("Revoked all sessions");
        Ok(Notice::AllSessionsRevoked)
    }

    /// Log out
    ///
    /// The server is told on a best-effort basis. Local state is cleared no
    /// matter how that request ends.
    pub async fn logout(&self) -> Notice {
        if self.is_authenticated().await {
            if let Err(error) = self.authorized().logout().await {
                warn!(error = %error, "Logout request failed, clearing local state anyway");
            }
        }

        self.update(AuthAction::Cleared).await;
        info!("Logged out");
        Notice::LoggedOut
    }

    /// Exchange the refresh credential for a new access token
    ///
    /// Loads the session list when this authenticates a logged-out
    /// controller. On failure the auth state is cleared.
    pub async fn refresh_access_token(&self) -> Result<Notice, DashboardError> {
        let result = {
            let _refreshing = self.refresh_lock.lock().await;
            self.client.refresh().await
        };

        match result {
            Ok(response) => {
                debug!("Access token refreshed");
                self.authenticate(response).await;
                Ok(Notice::SessionRestored)
            }
            Err(error) => {
                self.update(AuthAction::Cleared).await;
                Err(fail(Action::Refresh, error))
            }
        }
    }

    /// Pick a new random avatar
    pub async fn regenerate_avatar(&self) -> Result<Notice, DashboardError> {
        let result = self.authorized().regenerate_avatar().await;
        let response = self.settle(Action::RegenerateAvatar, result).await?;

        self.update(AuthAction::UserUpdated(response.user)).await;
        Ok(Notice::AvatarUpdated)
    }

    /// Change the avatar style
    pub async fn set_avatar_style(&self, style: &str) -> Result<Notice, DashboardError> {
        validate_required(style, "Avatar style")?;

        let result = self.authorized().update_avatar_style(style).await;
        let response = self.settle(Action::UpdateAvatarStyle, result).await?;

        self.update(AuthAction::UserUpdated(response.user)).await;
        Ok(Notice::AvatarUpdated)
    }

    fn authorized(&self) -> RetryingClient<'_, Self> {
        RetryingClient::new(&self.client, self)
    }

    async fn dispatch(&self, action: AuthAction) -> Effect {
        let mut state = self.state.lock().await;
        let (next, effect) = std::mem::take(&mut *state).apply(action);
        *state = next;
        effect
    }

    /// Apply an action that never produces an effect
    async fn update(&self, action: AuthAction) {
        let _ = self.dispatch(action).await;
    }

    async fn authenticate(&self, response: AuthResponse) {
        let effect = self
            .dispatch(AuthAction::Authenticated {
                access_token: response.access_token,
                user: response.user,
            })
            .await;
        self.run(effect).await;
    }

    async fn run(&self, effect: Effect) {
        match effect {
            Effect::None => {}
            Effect::FetchSessions => {
                if let Err(error) = self.fetch_sessions().await {
                    warn!(error = %error, "Automatic session fetch failed");
                }
            }
        }
    }

    async fn refetch_sessions(&self) {
        if !self.is_authenticated().await {
            return;
        }
        if let Err(error) = self.fetch_sessions().await {
            warn!(error = %error, "Failed to reload sessions");
        }
    }

    /// Map the final result of a protected call
    ///
    /// A 401 or 403 that survived the interceptor means the session is gone,
    /// so local state is cleared.
    async fn settle<T>(
        &self,
        action: Action,
        result: Result<T, ClientError>,
    ) -> Result<T, DashboardError> {
        match result {
            Ok(value) => Ok(value),
            Err(ClientError::MissingToken) => Err(DashboardError::NotAuthenticated),
            Err(error) => {
                if error.is_auth_expired() {
                    warn!(%action, "Authorization still rejected, clearing auth state");
                    self.update(AuthAction::Cleared).await;
                }
                Err(fail(action, error))
            }
        }
    }
}

fn fail(action: Action, error: ClientError) -> DashboardError {
    error!(%action, error = %error, "Request failed");
    DashboardError::client(action, error)
}

#[async_trait]
impl TokenSource for SessionController {
    async fn access_token(&self) -> Option<String> {
        let state = self.state.lock().await;
        state
            .is_authenticated()
            .then(|| state.access_token().to_string())
    }

    async fn refresh(&self, rejected: &str) -> Result<String, ClientError> {
        let _refreshing = self.refresh_lock.lock().await;

        let epoch = {
            let state = self.state.lock().await;
            if !state.is_authenticated() {
                return Err(ClientError::MissingToken);
            }
            if state.access_token() != rejected {
                debug!("Access token already renewed by another request");
                return Ok(state.access_token().to_string());
            }
            state.epoch()
        };

        let response = self.client.refresh().await?;
        let access_token = response.access_token.clone();

        let mut state = self.state.lock().await;
        let (next, _) = std::mem::take(&mut *state).apply(AuthAction::Refreshed {
            epoch,
            access_token: response.access_token,
            user: response.user,
        });
        *state = next;

        if state.epoch() == epoch && state.access_token() == access_token {
            debug!("Access token refreshed");
            Ok(access_token)
        } else {
            debug!("Auth state changed while refreshing, discarding new token");
            Err(ClientError::MissingToken)
        }
    }

    async fn invalidate(&self) {
        self.update(AuthAction::Cleared).await;
    }
}
