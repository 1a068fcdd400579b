//! Authenticated HTTP transport for every backend API call.
//!
//! ARCHITECTURE
//! ============
//! Token attachment is an explicit per-request step (`authorize`) that reads
//! the session store at send time; there is no shared default header to keep
//! in sync. A store that has not been hydrated yields no token.
//!
//! ERROR HANDLING
//! ==============
//! A 401 expires the session for the exact token that was sent and, if that
//! removed a live session, forces navigation to the login route. A 401 on a
//! request that carried no token clears whatever is stored and redirects to
//! login unless already there. The 401 is still returned to the caller.
//! Other failures pass through untouched; this layer never retries.

use std::sync::Arc;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::types::TransportError;
use crate::config::ClientConfig;
use crate::router::Navigator;
use crate::router::routes::LOGIN_PATH;
use crate::state::session::SessionStore;

pub struct Transport {
    http: reqwest::Client,
    config: ClientConfig,
    store: Arc<SessionStore>,
    navigator: Arc<dyn Navigator>,
}

impl Transport {
    /// Build a transport bound to `store` for credentials and `navigator` for
    /// forced redirects.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(
        config: ClientConfig,
        store: Arc<SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, TransportError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeouts.request)
            .connect_timeout(config.timeouts.connect)
            .build()
            .map_err(|e| TransportError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, config, store, navigator })
    }

    #[must_use]
    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Attach the current bearer token, returning the token that was used.
    pub fn authorize(&self, request: RequestBuilder) -> (RequestBuilder, Option<String>) {
        match self.store.token() {
            Some(token) => (request.bearer_auth(&token), Some(token)),
            None => (request, None),
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, TransportError> {
        self.request_json(Method::GET, path, None::<&()>).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, TransportError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request_json(Method::POST, path, Some(body)).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, TransportError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request_json(Method::PUT, path, Some(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, TransportError> {
        self.request_json(Method::DELETE, path, None::<&()>).await
    }

    /// Send a request and deserialize a success body. An empty body reads as
    /// JSON `null`.
    ///
    /// # Errors
    ///
    /// See [`Transport::send`]; additionally [`TransportError::Parse`] when
    /// the success body does not match `T`.
    pub async fn request_json<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T, TransportError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let text = self.send(method, path, body).await?;
        let text = if text.trim().is_empty() { "null" } else { text.as_str() };
        serde_json::from_str(text).map_err(|e| TransportError::Parse(e.to_string()))
    }

    /// Send a request and return the raw success body.
    ///
    /// # Errors
    ///
    /// - [`TransportError::Timeout`] when the request exceeds the ceiling;
    /// - [`TransportError::Unauthorized`] on 401, after invalidating the session;
    /// - [`TransportError::Status`] on any other non-2xx status;
    /// - [`TransportError::Request`] on connection or body-read failure.
    pub async fn send<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<String, TransportError>
    where
        B: Serialize + ?Sized,
    {
        let url = self.config.endpoint(path);
        let request = self.http.request(method.clone(), &url);
        let request = match body {
            Some(body) => request.json(body),
            None => request,
        };
        let (request, token) = self.authorize(request);

        let response = request.send().await.map_err(|e| {
            let err = TransportError::from_reqwest(&e);
            tracing::warn!(error = %err, %method, %path, "request failed");
            err
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| TransportError::from_reqwest(&e))?;

        if status == StatusCode::UNAUTHORIZED {
            self.handle_unauthorized(token.as_deref(), &method, path);
            return Err(TransportError::Unauthorized { body: text });
        }
        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), %method, %path, "request rejected");
            return Err(TransportError::Status { status: status.as_u16(), body: text });
        }
        Ok(text)
    }

    fn handle_unauthorized(&self, token: Option<&str>, method: &Method, path: &str) {
        match token {
            Some(token) => {
                if self.store.expire(token) {
                    tracing::warn!(%method, %path, "credential rejected; session invalidated");
                    self.navigator.redirect(LOGIN_PATH);
                }
            }
            None => {
                // Also erases a mirror that was never hydrated.
                self.store.clear_session();
                if self.navigator.current_path() != LOGIN_PATH {
                    tracing::warn!(%method, %path, "unauthorized without credential; returning to login");
                    self.navigator.redirect(LOGIN_PATH);
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "transport_test.rs"]
mod tests;
