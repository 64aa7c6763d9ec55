//! Wire-level types shared by every crate that talks to the provider.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::{ProviderError, ProviderResult};

/// Length of a ledger address in bytes.
pub const ADDRESS_LEN: usize = 20;

/// A 20-byte ledger address.
///
/// Parses from `0x`-prefixed hex in any case and always displays as
/// lowercase hex, so two spellings of the same account compare equal.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    /// Wraps raw address bytes.
    pub const fn new(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// Returns the raw address bytes.
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    /// Reads an address out of a 32-byte ABI word (right-aligned).
    ///
    /// Returns None if any of the 12 leading padding bytes is non-zero.
    pub fn from_word(word: &[u8; 32]) -> Option<Self> {
        if word[..32 - ADDRESS_LEN].iter().any(|b| *b != 0) {
            return None;
        }
        let mut bytes = [0u8; ADDRESS_LEN];
        bytes.copy_from_slice(&word[32 - ADDRESS_LEN..]);
        Some(Self(bytes))
    }
}

impl FromStr for Address {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let stripped = strip_hex_prefix(s);
        let decoded = hex::decode(stripped)
            .map_err(|e| ProviderError::InvalidResponse(format!("invalid address {s:?}: {e}")))?;
        let bytes: [u8; ADDRESS_LEN] = decoded.try_into().map_err(|_| {
            ProviderError::InvalidResponse(format!("address {s:?} is not {ADDRESS_LEN} bytes"))
        })?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Strips an optional `0x` / `0X` prefix.
pub fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

/// Encodes a number as a JSON-RPC quantity (`0x`-prefixed, no leading zeros).
pub fn to_quantity(value: u64) -> String {
    format!("{value:#x}")
}

/// Parses a JSON-RPC quantity such as `"0x1a"`.
pub fn parse_quantity(raw: &str) -> ProviderResult<u64> {
    let digits = strip_hex_prefix(raw);
    if digits.is_empty() {
        return Err(ProviderError::InvalidResponse(format!(
            "empty quantity {raw:?}"
        )));
    }
    u64::from_str_radix(digits, 16)
        .map_err(|e| ProviderError::InvalidResponse(format!("invalid quantity {raw:?}: {e}")))
}

/// Decodes `0x`-prefixed hex data into bytes.
pub fn decode_data(raw: &str) -> ProviderResult<Vec<u8>> {
    hex::decode(strip_hex_prefix(raw))
        .map_err(|e| ProviderError::InvalidResponse(format!("invalid hex data: {e}")))
}

/// Encodes bytes as `0x`-prefixed hex data.
pub fn encode_data(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Outgoing JSON-RPC 2.0 request envelope.
#[derive(Debug, Serialize)]
pub struct JsonRpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'a str,
    pub params: &'a serde_json::Value,
}

impl<'a> JsonRpcRequest<'a> {
    pub fn new(id: u64, method: &'a str, params: &'a serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            method,
            params,
        }
    }
}

/// Error object inside a JSON-RPC response.
#[derive(Debug, Deserialize)]
pub struct JsonRpcErrorObject {
    pub code: i64,
    pub message: String,
}

/// Incoming JSON-RPC 2.0 response envelope.
#[derive(Debug, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default, deserialize_with = "present")]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<JsonRpcErrorObject>,
}

/// Keeps an explicit `null` result distinct from a missing one.
fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<serde_json::Value>, D::Error> {
    serde_json::Value::deserialize(deserializer).map(Some)
}

impl JsonRpcResponse {
    /// Converts the envelope into the result value or a provider error.
    ///
    /// A present `error` wins over `result`. A `null` result is a valid
    /// answer (e.g. a receipt that is not mined yet).
    pub fn into_result(self) -> ProviderResult<serde_json::Value> {
        if let Some(err) = self.error {
            return Err(ProviderError::Rpc {
                code: err.code,
                message: err.message,
            });
        }
        self.result.ok_or_else(|| {
            ProviderError::InvalidResponse("response has neither result nor error".to_string())
        })
    }
}
