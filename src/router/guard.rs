//! Navigation guard.
//!
//! A pure decision over the target route's policy, its name, and the current
//! authentication status. The router adapts the result to its own
//! transition mechanics.

use super::routes::{AccessPolicy, DASHBOARD_PATH, LOGIN, LOGIN_PATH, REGISTER};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Redirect(&'static str),
}

/// Decide whether a transition may proceed. First matching rule wins:
///
/// 1. protected target while logged out: go to login;
/// 2. login or register while logged in: go to the dashboard;
/// 3. anything else proceeds.
#[must_use]
pub fn decide(policy: AccessPolicy, target_name: Option<&str>, is_authenticated: bool) -> Decision {
    if policy.requires_auth && !is_authenticated {
        return Decision::Redirect(LOGIN_PATH);
    }
    if is_authenticated && matches!(target_name, Some(LOGIN | REGISTER)) {
        return Decision::Redirect(DASHBOARD_PATH);
    }
    Decision::Allow
}

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;
