//! Provider error types.
//!
//! Mirrors the EIP-1193 error taxonomy so callers can tell a user declining a
//! wallet prompt apart from a transport failure.

use thiserror::Error;

/// The user rejected the request.
pub const USER_REJECTED_CODE: i64 = 4001;
/// The requested method and/or account has not been authorized by the user.
pub const UNAUTHORIZED_CODE: i64 = 4100;
/// The provider does not support the requested method.
pub const UNSUPPORTED_METHOD_CODE: i64 = 4200;
/// The provider is disconnected from all chains.
pub const DISCONNECTED_CODE: i64 = 4900;

/// Error returned by an [`Eip1193Provider`](crate::Eip1193Provider).
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network or transport-level failure (connection refused, TLS, non-2xx).
    #[error("transport error: {0}")]
    Transport(String),

    /// The provider answered with a JSON-RPC error object.
    #[error("rpc error {code}: {message}")]
    Rpc {
        /// JSON-RPC / EIP-1193 error code.
        code: i64,
        /// Human readable message from the provider.
        message: String,
    },

    /// The response was well-formed JSON but not a usable JSON-RPC response.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// JSON (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ProviderError {
    /// Returns true if the user declined the request (EIP-1193 code 4001).
    pub fn is_user_rejected(&self) -> bool {
        matches!(self, ProviderError::Rpc { code, .. } if *code == USER_REJECTED_CODE)
    }

    /// Returns true if the account or method is not authorized (code 4100).
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ProviderError::Rpc { code, .. } if *code == UNAUTHORIZED_CODE)
    }

    /// Shorthand for a user-rejection error, as a wallet would report it.
    pub fn user_rejected() -> Self {
        ProviderError::Rpc {
            code: USER_REJECTED_CODE,
            message: "User rejected the request.".to_string(),
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        ProviderError::Transport(err.to_string())
    }
}

/// Result type alias using ProviderError.
pub type ProviderResult<T> = Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_rejected_code() {
        assert!(ProviderError::user_rejected().is_user_rejected());
        assert!(!ProviderError::user_rejected().is_unauthorized());
    }

    #[test]
    fn test_unauthorized_code() {
        let err = ProviderError::Rpc {
            code: UNAUTHORIZED_CODE,
            message: "unauthorized".to_string(),
        };
        assert!(err.is_unauthorized());
        assert!(!err.is_user_rejected());
    }

    #[test]
    fn test_transport_is_not_rejection() {
        let err = ProviderError::Transport("connection refused".to_string());
        assert!(!err.is_user_rejected());
        assert_eq!(err.to_string(), "transport error: connection refused");
    }
}
