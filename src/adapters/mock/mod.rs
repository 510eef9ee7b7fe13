//! Mock implementations for testing.
//!
//! These let the transport and controller be exercised without network
//! access, including handshakes that never complete and bodies whose chunks
//! arrive only when the test pushes them.
//!
//! # Available Mocks
//!
//! - [`MockHttpClient`] - HTTP client with scripted streaming responses

pub mod http;

pub use http::{MockBody, MockHttpClient, MockResponse, RecordedRequest};
