//! reqwest-backed [`HttpClient`].

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;

use crate::error::HttpError;
use crate::traits::{Headers, HttpClient, StreamingResponse};

/// HTTP client for the agent backend.
#[derive(Debug, Clone, Default)]
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reuse an existing client (connection pool, proxy settings, TLS roots).
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn post_stream(
        &self,
        url: &str,
        body: String,
        headers: &Headers,
    ) -> Result<StreamingResponse, HttpError> {
        let mut request = self.client.post(url).body(body);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request
            .send()
            .await
            .map_err(|e| HttpError::from_reqwest(&e))?;

        let status = response.status().as_u16();
        if response.content_length() == Some(0) {
            return Ok(StreamingResponse::without_body(status));
        }

        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| HttpError::from_reqwest(&e)));
        Ok(StreamingResponse::new(status, Box::pin(body)))
    }
}
