//! Auth actions for the current client user.
//!
//! SYSTEM CONTEXT
//! ==============
//! UI-facing entry points for login, registration, profile edits, and
//! logout. Transport failures stop here: each action logs the error and
//! reports a plain success flag, so callers only decide what to show.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use std::sync::Arc;

use crate::net::api;
use crate::net::transport::Transport;
use crate::net::types::{RegisterRequest, User, UserPatch};

use super::session::SessionStore;

pub struct Auth {
    store: Arc<SessionStore>,
    transport: Arc<Transport>,
}

impl Auth {
    pub fn new(store: Arc<SessionStore>, transport: Arc<Transport>) -> Self {
        Self { store, transport }
    }

    #[must_use]
    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    #[must_use]
    pub fn transport(&self) -> &Arc<Transport> {
        &self.transport
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.store.is_authenticated()
    }

    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.store.user()
    }

    /// Exchange credentials and establish a session on success.
    pub async fn login(&self, email: &str, password: &str) -> bool {
        let response = match api::login(&self.transport, email, password).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, %email, "login failed");
                return false;
            }
        };
        if response.access_token.trim().is_empty() {
            tracing::warn!(%email, "login response carried an empty token");
            return false;
        }
        let user = response.to_user();
        self.store.set_session(user, response.access_token);
        true
    }

    /// Create an account. Does not sign the new user in.
    pub async fn register(&self, email: &str, password: &str, confirm_password: &str, full_name: Option<&str>) -> bool {
        let request = RegisterRequest { email, password, confirm_password, full_name };
        match api::register(&self.transport, &request).await {
            Ok(()) => {
                tracing::info!(%email, "registration accepted");
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, %email, "registration failed");
                false
            }
        }
    }

    /// Push partial profile fields and merge the server's answer locally.
    pub async fn update_profile(&self, patch: &UserPatch) -> bool {
        match api::update_profile(&self.transport, patch).await {
            Ok(updated) => {
                self.store.merge_user(updated);
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "profile update failed");
                false
            }
        }
    }

    /// Re-read the identity behind the current token from `/auth/me`.
    pub async fn refresh_user(&self) -> bool {
        if !self.store.is_authenticated() {
            return false;
        }
        match api::fetch_current_user(&self.transport).await {
            Ok(user) => {
                self.store.merge_user(UserPatch::from(user));
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "current user refresh failed");
                false
            }
        }
    }

    /// Drop the session. Same as [`SessionStore::clear_session`].
    pub fn logout(&self) -> bool {
        self.store.clear_session()
    }
}
