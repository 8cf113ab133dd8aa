//! Single refresh-and-retry on authorization failure
//!
//! Every protected request goes through [`RetryingClient`]. When the service
//! answers 401 or 403, the client asks its [`TokenSource`] for a fresh access
//! token and resubmits the same request once with the new bearer header. The
//! retry budget travels with the request as an explicit [`Attempt`] value, so a
//! request that has already been retried is never refreshed again.

use super::{ClientError, PublicClient, REFRESH_PATH, decode_json};
use async_trait::async_trait;
use reqwest::{Method, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Supplies and renews the access token used by [`RetryingClient`]
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Current access token, `None` when unauthenticated
    async fn access_token(&self) -> Option<String>;

    /// Exchange the ambient refresh credential for a new access token
    ///
    /// `rejected` is the token the service just refused. Returning
    /// [`ClientError::MissingToken`] means the auth state was dropped while
    /// the request was in flight; the caller then stops without invalidating.
    async fn refresh(&self, rejected: &str) -> Result<String, ClientError>;

    /// Drop all auth state after a failed refresh
    async fn invalidate(&self);
}

/// How many times a request has been resubmitted after a refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attempt(u8);

impl Attempt {
    /// Resubmissions allowed per request
    pub const MAX_RETRIES: u8 = 1;

    /// The original submission
    pub const fn first() -> Self {
        Self(0)
    }

    /// The attempt after this one
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    pub const fn retries(self) -> u8 {
        self.0
    }

    pub const fn is_retry(self) -> bool {
        self.0 > 0
    }

    pub const fn can_retry(self) -> bool {
        self.0 < Self::MAX_RETRIES
    }
}

impl Default for Attempt {
    fn default() -> Self {
        Self::first()
    }
}

/// Description of a protected request that can be rebuilt with a different token
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attach a JSON body
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, ClientError> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    pub const fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub const fn body(&self) -> Option<&serde_json::Value> {
        self.body.as_ref()
    }

    /// Whether this request targets the refresh endpoint itself
    pub fn is_refresh(&self) -> bool {
        self.path == REFRESH_PATH
    }
}

/// Authorized client that performs at most one refresh-and-retry per request
pub struct RetryingClient<'a, S: TokenSource + ?Sized> {
    client: &'a PublicClient,
    tokens: &'a S,
}

impl<'a, S: TokenSource + ?Sized> RetryingClient<'a, S> {
    pub const fn new(client: &'a PublicClient, tokens: &'a S) -> Self {
        Self { client, tokens }
    }

    /// Send a request and decode the JSON body
    pub async fn execute<T: DeserializeOwned>(
        &self,
        request: &ApiRequest,
    ) -> Result<T, ClientError> {
        let response = self.send(request, Attempt::first()).await?;
        decode_json(response).await
    }

    /// Send a request whose successful body carries nothing of interest
    pub async fn execute_ack(&self, request: &ApiRequest) -> Result<(), ClientError> {
        self.send(request, Attempt::first()).await.map(drop)
    }

    /// Send a request starting from the given attempt
    ///
    /// Fails with [`ClientError::MissingToken`] before touching the network when
    /// the token source has no access token.
    pub async fn send(
        &self,
        request: &ApiRequest,
        attempt: Attempt,
    ) -> Result<Response, ClientError> {
        let token = self
            .tokens
            .access_token()
            .await
            .ok_or(ClientError::MissingToken)?;

        self.send_with_token(request, token, attempt).await
    }

    async fn send_with_token(
        &self,
        request: &ApiRequest,
        mut token: String,
        mut attempt: Attempt,
    ) -> Result<Response, ClientError> {
        loop {
            trace!(
                method = %request.method(),
                path = request.path(),
                attempt = attempt.retries(),
                "Sending authorized request"
            );

            let result = self.client.authenticate(&token).send(request).await;

            match result {
                Err(error) if Self::should_refresh(request, &error, attempt) => {
                    warn!(
                        method = %request.method(),
                        path = request.path(),
                        status = ?error.status(),
                        "Authorization rejected, refreshing access token"
                    );
                    attempt = attempt.next();

                    match self.tokens.refresh(&token).await {
                        Ok(fresh) => token = fresh,
                        Err(ClientError::MissingToken) => {
                            debug!("Auth state cleared during refresh, dropping request");
                            return Err(ClientError::MissingToken);
                        }
                        Err(refresh_error) => {
                            warn!(error = %refresh_error, "Token refresh failed, invalidating auth state");
                            self.tokens.invalidate().await;
                            return Err(error);
                        }
                    }
                }
                other => return other,
            }
        }
    }

    fn should_refresh(request: &ApiRequest, error: &ClientError, attempt: Attempt) -> bool {
        error.is_auth_expired() && !request.is_refresh() && attempt.can_retry()
    }
}
