//! Auth dashboard HTTP module
//!
//! Typed clients for the auth service REST API. Public endpoints go through
//! [`client::PublicClient`]; protected endpoints go through
//! [`client::RetryingClient`], which refreshes the access token once when the
//! service rejects a request with 401 or 403.

#[macro_use]
extern crate tracing;

pub mod client;
pub mod types;

pub use client::{
    ApiRequest, Attempt, AuthenticatedClient, ClientBuilder, ClientError, PublicClient,
    RetryingClient, TokenSource,
};
