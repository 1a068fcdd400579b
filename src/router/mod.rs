//! Client-side routing: route table, navigation guard, and the router that
//! applies guard decisions to transitions.
//!
//! SYSTEM CONTEXT
//! ==============
//! The guard is a pure function; `Router` is the boundary that reads the
//! session store, follows redirects, and tracks the current location. The
//! transport reaches the router only through the `Navigator` trait.

pub mod guard;
pub mod routes;

use std::sync::{Arc, Mutex, PoisonError};

use crate::state::session::SessionStore;
use guard::Decision;
use routes::{AccessPolicy, Route};

/// Redirect hops followed before a transition is abandoned.
const MAX_REDIRECTS: usize = 4;

/// Forced navigation, used by the transport after an authorization failure.
pub trait Navigator: Send + Sync {
    fn redirect(&self, path: &str);

    /// Location the navigator currently shows.
    fn current_path(&self) -> String;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The requested location was entered as-is.
    Proceeded,
    /// The guard sent the transition somewhere else.
    Redirected,
    /// The redirect chain did not settle; the current location is unchanged.
    Blocked,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Navigation {
    pub from: String,
    pub to: String,
    pub outcome: Outcome,
}

pub struct Router {
    store: Arc<SessionStore>,
    current: Mutex<String>,
}

impl Router {
    pub fn new(store: Arc<SessionStore>) -> Self {
        Self { store, current: Mutex::new("/".to_owned()) }
    }

    /// Current normalized location.
    #[must_use]
    pub fn current_path(&self) -> String {
        self.current.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    #[must_use]
    pub fn current_route(&self) -> Option<&'static Route> {
        routes::resolve(&self.current_path()).map(|m| m.route)
    }

    /// Attempt a transition to `path`, applying the guard to every hop.
    ///
    /// Hydrates the session store first if nothing has yet, so no decision
    /// is ever made against storage that has not been read.
    pub fn navigate(&self, path: &str) -> Navigation {
        if !self.store.is_hydrated() {
            self.store.hydrate();
        }

        let from = self.current_path();
        let mut target = routes::normalize_path(path);
        let mut redirected = false;

        for _ in 0..=MAX_REDIRECTS {
            let matched = routes::resolve(&target);
            let policy = matched.as_ref().map_or(AccessPolicy::PUBLIC, |m| m.route.access);
            let name = matched.as_ref().map(|m| m.route.name);

            match guard::decide(policy, name, self.store.is_authenticated()) {
                Decision::Allow => {
                    tracing::debug!(%from, to = %target, redirected, "navigation allowed");
                    *self.current.lock().unwrap_or_else(PoisonError::into_inner) = target.clone();
                    let outcome = if redirected { Outcome::Redirected } else { Outcome::Proceeded };
                    return Navigation { from, to: target, outcome };
                }
                Decision::Redirect(next) => {
                    tracing::debug!(requested = %target, %next, "navigation redirected by guard");
                    target = next.to_owned();
                    redirected = true;
                }
            }
        }

        tracing::warn!(%from, requested = %path, "redirect chain did not settle; navigation blocked");
        Navigation { to: from.clone(), from, outcome: Outcome::Blocked }
    }
}

impl Navigator for Router {
    fn redirect(&self, path: &str) {
        let nav = self.navigate(path);
        tracing::info!(to = %nav.to, "forced navigation");
    }

    fn current_path(&self) -> String {
        Router::current_path(self)
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
