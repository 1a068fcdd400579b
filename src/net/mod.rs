//! Networking modules for the backend REST API.
//!
//! SYSTEM CONTEXT
//! ==============
//! `transport` owns the HTTP client and credential handling, `api` names the
//! endpoints, and `types` defines the shared wire schema.

pub mod api;
pub mod transport;
pub mod types;
