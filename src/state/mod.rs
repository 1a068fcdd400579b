//! Client-side session state.
//!
//! DESIGN
//! ======
//! `session` owns the in-memory pair and its durable mirror, `storage`
//! abstracts the mirror's medium, and `auth` layers the network-backed
//! actions on top of both.

pub mod auth;
pub mod session;
pub mod storage;
