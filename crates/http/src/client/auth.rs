//! Public authentication endpoints

use super::{ClientError, PublicClient, REFRESH_PATH};
use crate::types::{
    AuthResponse, LoginRequest, RegisterRequest, SendOtpRequest, VerifyOtpRequest,
};
use reqwest::Method;

impl PublicClient {
    /// Log in with email and password
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ClientError> {
        let req = self.request(Method::POST, "/auth/login").json(request);
        self.execute(req).await.and_then(require_token)
    }

    /// Create an account and log in
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ClientError> {
        let req = self.request(Method::POST, "/auth/register").json(request);
        self.execute(req).await.and_then(require_token)
    }

    /// Ask the service to deliver a one-time code to a phone number
    pub async fn send_otp(&self, request: &SendOtpRequest) -> Result<(), ClientError> {
        let req = self.request(Method::POST, "/auth/send-otp").json(request);
        self.execute_ack(req).await
    }

    /// Exchange a phone number and one-time code for an access token
    pub async fn verify_otp(&self, request: &VerifyOtpRequest) -> Result<AuthResponse, ClientError> {
        let req = self.request(Method::POST, "/auth/verify-otp").json(request);
        self.execute(req).await.and_then(require_token)
    }

    /// Exchange the refresh cookie held in the jar for a new access token
    pub async fn refresh(&self) -> Result<AuthResponse, ClientError> {
        let req = self.request(Method::POST, REFRESH_PATH);
        self.execute(req).await.and_then(require_token)
    }
}

fn require_token(response: AuthResponse) -> Result<AuthResponse, ClientError> {
    if response.access_token.is_empty() {
        return Err(ClientError::InvalidResponse(
            "response did not include an access token".into(),
        ));
    }
    Ok(response)
}
