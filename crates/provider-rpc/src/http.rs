//! JSON-RPC over HTTP provider.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, trace};

use crate::types::{JsonRpcRequest, JsonRpcResponse};
use crate::{Eip1193Provider, ProviderError, ProviderResult};

/// Provider that posts JSON-RPC 2.0 requests to a single HTTP endpoint.
///
/// Works against any wallet daemon or node that speaks the standard
/// `eth_*` methods. No timeout is applied here beyond what the endpoint
/// itself enforces.
#[derive(Debug)]
pub struct HttpProvider {
    url: String,
    client: Client,
    next_id: AtomicU64,
}

impl HttpProvider {
    /// Create a provider for the given endpoint URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(url, Client::new())
    }

    /// Create a provider that reuses an existing HTTP client.
    pub fn with_client(url: impl Into<String>, client: Client) -> Self {
        Self {
            url: url.into(),
            client,
            next_id: AtomicU64::new(1),
        }
    }

    /// The endpoint this provider posts to.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Eip1193Provider for HttpProvider {
    async fn request(&self, method: &str, params: Value) -> ProviderResult<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = JsonRpcRequest::new(id, method, &params);

        trace!(url = %self.url, id, method, "Sending JSON-RPC request");

        let response = self.client.post(&self.url).json(&request).send().await?;

        let status = response.status();
        let body = response.text().await?;

        // Some endpoints put a JSON-RPC error body behind a non-2xx status.
        let parsed: Result<JsonRpcResponse, _> = serde_json::from_str(&body);
        match parsed {
            Ok(envelope) => {
                let result = envelope.into_result();
                if let Err(err) = &result {
                    debug!(method, error = %err, "JSON-RPC request failed");
                }
                result
            }
            Err(_) if !status.is_success() => Err(ProviderError::Transport(format!(
                "HTTP {}: {}",
                status, body
            ))),
            Err(e) => Err(ProviderError::InvalidResponse(format!(
                "malformed JSON-RPC response: {e}"
            ))),
        }
    }
}
