//! HTTP transport capability.
//!
//! The SDK never opens sockets itself; callers inject an [`HttpClient`]
//! backed by whatever HTTP stack the host application uses.

use async_trait::async_trait;
use sol_core::SolError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get(&self, url: &str) -> Result<HttpResponse, SolError>;

    /// POST `body` with `Content-Type: application/json`.
    async fn post_json(&self, url: &str, body: &str) -> Result<HttpResponse, SolError>;
}
