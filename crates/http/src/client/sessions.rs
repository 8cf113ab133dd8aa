//! Protected session and profile endpoints

use super::{ApiRequest, ClientError, RetryingClient, TokenSource};
use crate::types::{AvatarStyleRequest, EmptyRequest, UserResponse};
use authdash_core::Session;

impl<S: TokenSource + ?Sized> RetryingClient<'_, S> {
    /// List all sessions of the current user
    pub async fn list_sessions(&self) -> Result<Vec<Session>, ClientError> {
        self.execute(&ApiRequest::get("/auth/sessions")).await
    }

    /// Revoke one session
    pub async fn revoke_session(&self, session_id: &str) -> Result<(), ClientError> {
        self.execute_ack(&ApiRequest::delete(format!("/auth/sessions/{session_id}")))
            .await
    }

    /// Revoke every session of the current user
    pub async fn revoke_all_sessions(&self) -> Result<(), ClientError> {
        self.execute_ack(&ApiRequest::delete("/auth/sessions")).await
    }

    /// Tell the service to invalidate the current session
    pub async fn logout(&self) -> Result<(), ClientError> {
        let request = ApiRequest::post("/auth/logout").json(&EmptyRequest {})?;
        self.execute_ack(&request).await
    }

    /// Pick a new random avatar seed
    pub async fn regenerate_avatar(&self) -> Result<UserResponse, ClientError> {
        let request = ApiRequest::patch("/users/avatar/regenerate").json(&EmptyRequest {})?;
        self.execute(&request).await
    }

    /// Change the avatar style
    pub async fn update_avatar_style(&self, style: &str) -> Result<UserResponse, ClientError> {
        let request = ApiRequest::patch("/users/avatar/style").json(&AvatarStyleRequest {
            style: style.to_string(),
        })?;
        self.execute(&request).await
    }
}
