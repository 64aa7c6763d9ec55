//! Scripted in-memory provider for tests.
//!
//! Answers each method from a per-method script: queued one-shot responses
//! first, then a sticky default. Every call is recorded. A method can be gated
//! so that callers stay suspended until the test releases them, which is how a
//! pending wallet prompt is simulated.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use crate::error::UNSUPPORTED_METHOD_CODE;
use crate::{Eip1193Provider, ProviderError, ProviderResult};

/// A canned answer for one request.
#[derive(Debug, Clone)]
pub enum ScriptedResponse {
    /// Successful result value.
    Result(Value),
    /// JSON-RPC error object with code and message.
    RpcError { code: i64, message: String },
    /// Transport-level failure.
    Transport(String),
}

impl ScriptedResponse {
    fn into_result(self) -> ProviderResult<Value> {
        match self {
            ScriptedResponse::Result(value) => Ok(value),
            ScriptedResponse::RpcError { code, message } => {
                Err(ProviderError::Rpc { code, message })
            }
            ScriptedResponse::Transport(message) => Err(ProviderError::Transport(message)),
        }
    }
}

type Responder = Arc<dyn Fn(&Value) -> ScriptedResponse + Send + Sync>;

#[derive(Default)]
struct MethodScript {
    queued: VecDeque<ScriptedResponse>,
    sticky: Option<Responder>,
    gate: Option<Arc<Notify>>,
}

/// In-memory [`Eip1193Provider`] driven by per-method scripts.
#[derive(Default)]
pub struct ScriptedProvider {
    scripts: Mutex<HashMap<String, MethodScript>>,
    calls: Mutex<Vec<(String, Value)>>,
}

impl ScriptedProvider {
    /// Creates a provider with no scripted methods.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the sticky result for a method.
    pub fn respond(&self, method: &str, value: Value) {
        self.respond_with(method, move |_| ScriptedResponse::Result(value.clone()));
    }

    /// Sets a sticky responder that can look at the request params.
    pub fn respond_with<F>(&self, method: &str, responder: F)
    where
        F: Fn(&Value) -> ScriptedResponse + Send + Sync + 'static,
    {
        let mut scripts = self.scripts.lock().expect("lock poisoned");
        scripts.entry(method.to_string()).or_default().sticky = Some(Arc::new(responder));
    }

    /// Sets a sticky JSON-RPC error for a method.
    pub fn fail(&self, method: &str, code: i64, message: &str) {
        let message = message.to_string();
        self.respond_with(method, move |_| ScriptedResponse::RpcError {
            code,
            message: message.clone(),
        });
    }

    /// Queues a one-shot response, consumed before the sticky one.
    pub fn push(&self, method: &str, response: ScriptedResponse) {
        let mut scripts = self.scripts.lock().expect("lock poisoned");
        scripts
            .entry(method.to_string())
            .or_default()
            .queued
            .push_back(response);
    }

    /// Holds every call to `method` until the returned notifier is signalled.
    ///
    /// Each `notify_one()` releases one waiting (or the next) call.
    pub fn gate(&self, method: &str) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        let mut scripts = self.scripts.lock().expect("lock poisoned");
        scripts.entry(method.to_string()).or_default().gate = Some(notify.clone());
        notify
    }

    /// Returns every recorded call in order.
    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().expect("lock poisoned").clone()
    }

    /// Returns how many times a method was requested.
    pub fn call_count(&self, method: &str) -> usize {
        self.calls
            .lock()
            .expect("lock poisoned")
            .iter()
            .filter(|(m, _)| m == method)
            .count()
    }
}

#[async_trait]
impl Eip1193Provider for ScriptedProvider {
    async fn request(&self, method: &str, params: Value) -> ProviderResult<Value> {
        self.calls
            .lock()
            .expect("lock poisoned")
            .push((method.to_string(), params.clone()));

        let gate = {
            let scripts = self.scripts.lock().expect("lock poisoned");
            scripts.get(method).and_then(|s| s.gate.clone())
        };
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let response = {
            let mut scripts = self.scripts.lock().expect("lock poisoned");
            match scripts.get_mut(method) {
                Some(script) => match script.queued.pop_front() {
                    Some(response) => Some(response),
                    None => script.sticky.as_ref().map(|responder| responder(&params)),
                },
                None => None,
            }
        };

        match response {
            Some(response) => response.into_result(),
            None => Err(ProviderError::Rpc {
                code: UNSUPPORTED_METHOD_CODE,
                message: format!("unscripted method {method}"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_queued_before_sticky() {
        let provider = ScriptedProvider::new();
        provider.respond("eth_blockNumber", json!("0x2"));
        provider.push("eth_blockNumber", ScriptedResponse::Result(json!("0x1")));

        assert_eq!(provider.request("eth_blockNumber", json!([])).await.unwrap(), json!("0x1"));
        assert_eq!(provider.request("eth_blockNumber", json!([])).await.unwrap(), json!("0x2"));
        assert_eq!(provider.call_count("eth_blockNumber"), 2);
    }

    #[tokio::test]
    async fn test_unscripted_method_is_unsupported() {
        let provider = ScriptedProvider::new();
        let err = provider.request("eth_chainId", json!([])).await.unwrap_err();
        assert!(matches!(err, ProviderError::Rpc { code, .. } if code == UNSUPPORTED_METHOD_CODE));
    }

    #[tokio::test]
    async fn test_gate_holds_call() {
        let provider = Arc::new(ScriptedProvider::new());
        provider.respond("eth_requestAccounts", json!([]));
        let gate = provider.gate("eth_requestAccounts");

        let task = {
            let provider = provider.clone();
            tokio::spawn(async move { provider.request("eth_requestAccounts", json!([])).await })
        };

        tokio::task::yield_now().await;
        assert!(!task.is_finished());

        gate.notify_one();
        assert!(task.await.unwrap().is_ok());
    }
}
