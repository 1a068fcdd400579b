//! REST endpoint helpers for the auth and profile API.
//!
//! Every call goes through [`Transport`], so credentials, timeouts, and
//! 401 handling apply uniformly. Paths are relative to the API base URL.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use reqwest::Method;

use super::transport::Transport;
use super::types::{LoginRequest, LoginResponse, RegisterRequest, TransportError, User, UserPatch};

pub const LOGIN_ENDPOINT: &str = "/auth/test-login";
pub const REGISTER_ENDPOINT: &str = "/auth/register";
pub const CURRENT_USER_ENDPOINT: &str = "/auth/me";
pub const PROFILE_ENDPOINT: &str = "/v1/users/me";

/// Exchange credentials for a bearer token and identity summary.
///
/// # Errors
///
/// Returns the transport error for rejected credentials or network failure.
pub async fn login(transport: &Transport, email: &str, password: &str) -> Result<LoginResponse, TransportError> {
    transport.post(LOGIN_ENDPOINT, &LoginRequest { email, password }).await
}

/// Create an account. Success is signaled by status alone.
///
/// # Errors
///
/// Returns the transport error if the backend rejects the registration.
pub async fn register(transport: &Transport, request: &RegisterRequest<'_>) -> Result<(), TransportError> {
    transport.send(Method::POST, REGISTER_ENDPOINT, Some(request)).await?;
    Ok(())
}

/// Fetch the identity behind the current token.
///
/// # Errors
///
/// Returns the transport error, including `Unauthorized` for a dead token.
pub async fn fetch_current_user(transport: &Transport) -> Result<User, TransportError> {
    transport.get(CURRENT_USER_ENDPOINT).await
}

/// Send partial profile fields; the backend answers with the updated record.
///
/// # Errors
///
/// Returns the transport error if the update is rejected.
pub async fn update_profile(transport: &Transport, patch: &UserPatch) -> Result<UserPatch, TransportError> {
    transport.put(PROFILE_ENDPOINT, patch).await
}
