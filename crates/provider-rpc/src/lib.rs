//! # Provider RPC
//!
//! The boundary between the portal and the user's wallet / ledger node.
//!
//! Everything outside this crate talks to the outside world through the
//! [`Eip1193Provider`] trait: one `request(method, params)` call that returns a
//! raw JSON value or a [`ProviderError`] carrying the EIP-1193 error code.
//!
//! ## Crate Structure
//!
//! - [`provider`] - The provider trait
//! - [`http`] - JSON-RPC over HTTP implementation
//! - [`types`] - Addresses, quantities, JSON-RPC envelopes
//! - `testing` - Scripted provider (feature `testing`)

mod error;
pub mod http;
pub mod provider;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod types;

pub use error::{
    ProviderError, ProviderResult, DISCONNECTED_CODE, UNAUTHORIZED_CODE,
    UNSUPPORTED_METHOD_CODE, USER_REJECTED_CODE,
};
pub use http::HttpProvider;
pub use provider::{Eip1193Provider, SharedProvider};
pub use types::{
    decode_data, encode_data, parse_quantity, strip_hex_prefix, to_quantity, Address,
    ADDRESS_LEN,
};
