//! Auth service HTTP client

pub mod auth;
pub mod error;
pub mod interceptor;
pub mod sessions;
pub mod typed;

pub use error::ClientError;
pub use interceptor::{ApiRequest, Attempt, RetryingClient, TokenSource};
pub use typed::AuthenticatedClient;

use reqwest::cookie::{CookieStore, Jar};
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

/// Path of the refresh endpoint, relative to the base URL
pub const REFRESH_PATH: &str = "/auth/refresh";

/// Client for public endpoints that don't require an access token
///
/// The client owns a cookie jar shared by all clones. The auth service sets the
/// long-lived refresh credential as a cookie on login, and the jar replays it on
/// [`PublicClient::refresh`]; no request ever carries it explicitly.
#[derive(Clone)]
pub struct PublicClient {
    client: Client,
    base_url: String,
    refresh_url: Url,
    jar: Arc<Jar>,
}

impl PublicClient {
    /// Create a new client with default configuration
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::builder().base_url(base_url).build()
    }

    /// Create a new client builder
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Create a request builder without authentication
    pub fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client.request(method, url)
    }

    /// Execute a request and decode the JSON body
    pub async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = check_status(request.send().await?).await?;
        decode_json(response).await
    }

    /// Execute a request whose successful body carries nothing of interest
    pub async fn execute_ack(&self, request: reqwest::RequestBuilder) -> Result<(), ClientError> {
        check_status(request.send().await?).await.map(drop)
    }

    /// Get an authenticated view of this client that shares its connection pool and cookies
    pub fn authenticate(&self, access_token: impl Into<String>) -> AuthenticatedClient {
        AuthenticatedClient::new(self.clone(), access_token.into())
    }

    /// Store a refresh credential cookie (`name=value; attributes`) in the jar
    pub fn seed_credential(&self, cookie: &str) {
        self.jar.add_cookie_str(cookie, &self.refresh_url);
    }

    /// Whether the jar holds any cookie that would accompany a refresh call
    pub fn has_credential(&self) -> bool {
        self.jar.cookies(&self.refresh_url).is_some()
    }

    pub(crate) fn http(&self) -> &Client {
        &self.client
    }
}

/// Builder for [`PublicClient`]
#[derive(Default)]
pub struct ClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    refresh_credential: Option<String>,
}

impl ClientBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Seed the cookie jar with a refresh credential
    pub fn refresh_credential(mut self, cookie: impl Into<String>) -> Self {
        self.refresh_credential = Some(cookie.into());
        self
    }

    /// Build the client
    pub fn build(self) -> Result<PublicClient, ClientError> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::Configuration("base_url is required".into()))?;

        // Ensure base_url ends without a trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();

        let refresh_url = Url::parse(&format!("{base_url}{REFRESH_PATH}"))
            .map_err(|e| ClientError::Configuration(format!("invalid base_url: {e}")))?;

        let jar = Arc::new(Jar::default());

        let mut client_builder = Client::builder().cookie_provider(Arc::clone(&jar));

        if let Some(timeout) = self.timeout {
            client_builder = client_builder.timeout(timeout);
        }

        if let Some(user_agent) = self.user_agent {
            client_builder = client_builder.user_agent(user_agent);
        } else {
            client_builder =
                client_builder.user_agent(concat!("authdash-client/", env!("CARGO_PKG_VERSION")));
        }

        let client = PublicClient {
            client: client_builder.build()?,
            base_url,
            refresh_url,
            jar,
        };

        if let Some(cookie) = self.refresh_credential {
            client.seed_credential(&cookie);
        }

        Ok(client)
    }
}

/// Turn a non-success response into the matching [`ClientError`]
pub(crate) async fn check_status(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    debug!(status = status.as_u16(), "Auth service returned an error status");
    Err(ClientError::from_status(status, &body))
}

pub(crate) async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}
