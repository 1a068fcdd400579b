//! # eduagent-client
//!
//! Client-side shell for the EduAgent learning assistant: the route table,
//! the session store with its durable mirror, the navigation guard, and the
//! authenticated HTTP transport that ties them together.
//!
//! The three pieces form a closed loop. Navigation consults the store
//! through the guard, outbound requests read the store's token, and a
//! rejected token writes back into the store and forces navigation to the
//! login route. `App` wires the loop with explicit handles; nothing here is
//! a global.

pub mod app;
pub mod config;
pub mod net;
pub mod router;
pub mod state;

#[cfg(test)]
pub(crate) mod test_support;
