//! agentstream - streaming client and conversation store for agent backends
//!
//! Bytes from a streaming POST are split into frames, parsed tolerantly into
//! typed events and reduced into an immutable, nested conversation store.
//!
//! This library exposes modules for use by UIs and integration tests.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod models;
pub mod registry;
pub mod sse;
pub mod store;
pub mod traits;
pub mod transport;
