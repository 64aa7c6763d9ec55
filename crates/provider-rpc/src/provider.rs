//! The provider trait every wallet/ledger adapter talks through.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::ProviderResult;

/// An EIP-1193 style request/response provider.
///
/// Implementations own the transport (HTTP, IPC, in-memory) and must map a
/// provider-side JSON-RPC error into [`ProviderError::Rpc`](crate::ProviderError::Rpc)
/// with its original code, so callers can detect user rejection.
#[async_trait]
pub trait Eip1193Provider: Send + Sync {
    /// Issues a single request and returns the raw JSON result.
    async fn request(&self, method: &str, params: Value) -> ProviderResult<Value>;
}

/// Shared, dynamically dispatched provider handle.
pub type SharedProvider = Arc<dyn Eip1193Provider>;

#[async_trait]
impl<P: Eip1193Provider + ?Sized> Eip1193Provider for Arc<P> {
    async fn request(&self, method: &str, params: Value) -> ProviderResult<Value> {
        (**self).request(method, params).await
    }
}
