//! Application shell: wires the session store, router, transport, and auth
//! actions together.
//!
//! The store is hydrated here, before the router or transport exists, so
//! no navigation decision or outbound request can observe unread storage.

#[cfg(test)]
#[path = "app_test.rs"]
mod app_test;

use std::sync::Arc;

use crate::config::ClientConfig;
use crate::net::transport::Transport;
use crate::net::types::TransportError;
use crate::router::Router;
use crate::state::auth::Auth;
use crate::state::session::{SessionStore, StorageKeys};
use crate::state::storage::{FileStorage, KeyValueStorage};

pub struct App {
    pub store: Arc<SessionStore>,
    pub router: Arc<Router>,
    pub auth: Auth,
}

impl App {
    /// Build the shell with a file-backed session mirror under
    /// `config.state_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: ClientConfig) -> Result<Self, TransportError> {
        let storage = Arc::new(FileStorage::new(&config.state_dir));
        Self::with_storage(config, storage)
    }

    /// Build the shell over an arbitrary storage backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn with_storage(config: ClientConfig, storage: Arc<dyn KeyValueStorage>) -> Result<Self, TransportError> {
        let store = Arc::new(SessionStore::new(storage, StorageKeys::with_prefix(&config.storage_prefix)));
        let restored = store.hydrate();
        tracing::debug!(restored, "session store hydrated");

        let router = Arc::new(Router::new(store.clone()));
        let transport = Arc::new(Transport::new(config, store.clone(), router.clone())?);
        let auth = Auth::new(store.clone(), transport);
        Ok(Self { store, router, auth })
    }

    #[must_use]
    pub fn transport(&self) -> &Arc<Transport> {
        self.auth.transport()
    }
}
