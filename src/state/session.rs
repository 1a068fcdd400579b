//! Session store: the single owner of the signed-in identity and its token.
//!
//! DESIGN
//! ======
//! The user and the bearer token live together in one `Session` value, so a
//! token without a user (or the reverse) cannot be represented. Every
//! mutation holds the write lock across both the in-memory change and the
//! storage mirror update; readers never see a half-applied transition.
//!
//! The durable mirror is best-effort: a failed write is logged and the
//! in-memory state stays authoritative for the rest of the process.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::net::types::{User, UserPatch};

use super::storage::KeyValueStorage;

/// An authenticated identity plus the credential that proves it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub user: User,
    pub token: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SessionState {
    /// Process start; durable storage has not been read yet.
    #[default]
    Unhydrated,
    Anonymous,
    Authenticated(Session),
}

/// Names of the two persisted entries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageKeys {
    pub token: String,
    pub user: String,
}

impl StorageKeys {
    #[must_use]
    pub fn with_prefix(prefix: &str) -> Self {
        Self { token: format!("{prefix}_token"), user: format!("{prefix}_user") }
    }
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self::with_prefix(crate::config::DEFAULT_STORAGE_PREFIX)
    }
}

/// Shared, synchronous session owner.
///
/// Every method blocks: mutations run the storage mirror (file I/O for
/// `FileStorage`) while holding the lock. Call it from async code only for
/// short, local work and never keep a value borrowed from it across an
/// `.await`.
pub struct SessionStore {
    state: RwLock<SessionState>,
    storage: Arc<dyn KeyValueStorage>,
    keys: StorageKeys,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn KeyValueStorage>, keys: StorageKeys) -> Self {
        Self { state: RwLock::new(SessionState::Unhydrated), storage, keys }
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(*self.read(), SessionState::Authenticated(_))
    }

    #[must_use]
    pub fn is_hydrated(&self) -> bool {
        !matches!(*self.read(), SessionState::Unhydrated)
    }

    /// Current bearer token. `None` while logged out or not yet hydrated.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        match &*self.read() {
            SessionState::Authenticated(session) => Some(session.token.clone()),
            _ => None,
        }
    }

    #[must_use]
    pub fn user(&self) -> Option<User> {
        match &*self.read() {
            SessionState::Authenticated(session) => Some(session.user.clone()),
            _ => None,
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionState {
        self.read().clone()
    }

    /// Restore the session from durable storage.
    ///
    /// Only the first call reads storage; later calls return the current
    /// authentication status unchanged. A corrupt identity record or a lone
    /// half of the pair is erased and the store comes up logged out.
    pub fn hydrate(&self) -> bool {
        let mut state = self.write();
        if !matches!(*state, SessionState::Unhydrated) {
            return matches!(*state, SessionState::Authenticated(_));
        }

        let token = self
            .storage
            .get(&self.keys.token)
            .map(|t| t.trim().to_owned())
            .filter(|t| !t.is_empty());
        let raw_user = self.storage.get(&self.keys.user);

        *state = match (token, raw_user) {
            (Some(token), Some(raw_user)) => match serde_json::from_str::<User>(&raw_user) {
                Ok(user) => {
                    tracing::debug!(user_id = user.id, "session restored from storage");
                    SessionState::Authenticated(Session { user, token })
                }
                Err(e) => {
                    tracing::warn!(error = %e, "stored user record is corrupt; discarding session");
                    self.erase();
                    SessionState::Anonymous
                }
            },
            (None, None) => SessionState::Anonymous,
            _ => {
                tracing::warn!("stored session is incomplete; discarding");
                self.erase();
                SessionState::Anonymous
            }
        };
        matches!(*state, SessionState::Authenticated(_))
    }

    /// Replace the session with `(user, token)` and persist the pair.
    pub fn set_session(&self, user: User, token: String) {
        let mut state = self.write();
        self.persist(&user, &token);
        tracing::info!(user_id = user.id, "session established");
        *state = SessionState::Authenticated(Session { user, token });
    }

    /// Log out: drop the session and erase the persisted pair.
    ///
    /// Returns `true` if a session was actually removed; repeated calls are
    /// no-ops.
    pub fn clear_session(&self) -> bool {
        let mut state = self.write();
        self.clear_locked(&mut state)
    }

    /// Clear the session only if it still holds `token`.
    ///
    /// Used on authorization failures: concurrent failures for the same
    /// credential clear once, and a failure for a superseded credential
    /// leaves the newer session intact.
    pub fn expire(&self, token: &str) -> bool {
        let mut state = self.write();
        let holds_token = matches!(&*state, SessionState::Authenticated(session) if session.token == token);
        if !holds_token {
            return false;
        }
        self.clear_locked(&mut state)
    }

    /// Merge profile fields into the signed-in user and persist the result.
    ///
    /// Returns the updated user, or `None` when nobody is signed in.
    pub fn merge_user(&self, patch: UserPatch) -> Option<User> {
        let mut state = self.write();
        let SessionState::Authenticated(session) = &mut *state else {
            return None;
        };
        session.user.merge(patch);
        self.persist_user(&session.user);
        Some(session.user.clone())
    }

    fn clear_locked(&self, state: &mut SessionState) -> bool {
        let had_session = matches!(*state, SessionState::Authenticated(_));
        let was_unhydrated = matches!(*state, SessionState::Unhydrated);
        if had_session || was_unhydrated {
            self.erase();
        }
        if had_session {
            tracing::info!("session cleared");
        }
        *state = SessionState::Anonymous;
        had_session
    }

    fn persist(&self, user: &User, token: &str) {
        if let Err(e) = self.storage.set(&self.keys.token, token) {
            tracing::warn!(error = %e, "failed to persist session token");
        }
        self.persist_user(user);
    }

    fn persist_user(&self, user: &User) {
        let raw = match serde_json::to_string(user) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize session user");
                return;
            }
        };
        if let Err(e) = self.storage.set(&self.keys.user, &raw) {
            tracing::warn!(error = %e, "failed to persist session user");
        }
    }

    fn erase(&self) {
        for key in [&self.keys.token, &self.keys.user] {
            if let Err(e) = self.storage.remove(key) {
                tracing::warn!(error = %e, %key, "failed to erase stored session entry");
            }
        }
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
