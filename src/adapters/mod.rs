//! Production implementations of the traits in [`crate::traits`].
//!
//! - [`ReqwestHttpClient`] - reqwest-backed streaming POST
//! - [`mock`] - scripted implementations for tests

pub mod mock;
mod reqwest_http;

pub use reqwest_http::ReqwestHttpClient;
