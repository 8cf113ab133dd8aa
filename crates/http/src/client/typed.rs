//! Client for endpoints that require a bearer access token

use super::{ApiRequest, ClientError, PublicClient, check_status, decode_json};
use reqwest::{Response, header};
use serde::de::DeserializeOwned;

/// Client for authenticated endpoints that require a valid access token
///
/// Cheap to build: it shares the connection pool and cookie jar of the
/// [`PublicClient`] it came from. The interceptor builds a fresh one whenever
/// the access token changes.
#[derive(Clone)]
pub struct AuthenticatedClient {
    inner: PublicClient,
    access_token: String,
}

impl AuthenticatedClient {
    pub(crate) const fn new(inner: PublicClient, access_token: String) -> Self {
        Self {
            inner,
            access_token,
        }
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        self.inner.base_url()
    }

    /// Create a request builder with authentication
    pub fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.inner.base_url(), path);
        self.inner
            .http()
            .request(method, url)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.access_token))
    }

    /// Send a described request and return the successful response
    pub async fn send(&self, request: &ApiRequest) -> Result<Response, ClientError> {
        let mut builder = self.request(request.method().clone(), request.path());
        if let Some(body) = request.body() {
            builder = builder.json(body);
        }
        check_status(builder.send().await?).await
    }

    /// Execute a request and decode the JSON body
    pub async fn execute<T: DeserializeOwned>(
        &self,
        request: &ApiRequest,
    ) -> Result<T, ClientError> {
        decode_json(self.send(request).await?).await
    }
}
