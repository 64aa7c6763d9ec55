//! In-memory registry for tests.
//!
//! [`ScriptedRegistry`] installs responders for `eth_call`, `eth_blockNumber`
//! and `eth_getLogs` on a [`ScriptedProvider`], backed by a tiny simulated
//! chain: mining a record bumps the head, appends to history and emits the
//! matching `RecordAdded` log in the new block.

use std::sync::Arc;

use parking_lot::Mutex;
use provider_rpc::testing::{ScriptedProvider, ScriptedResponse};
use provider_rpc::{decode_data, encode_data, parse_quantity, to_quantity, Address};
use serde_json::{json, Value};

use crate::abi;
use crate::{RawRecord, RegistryBinding};

/// Address whose last byte is `n`; handy for distinct authors.
pub fn author(n: u8) -> Address {
    let mut bytes = [0u8; provider_rpc::ADDRESS_LEN];
    bytes[provider_rpc::ADDRESS_LEN - 1] = n;
    Address::new(bytes)
}

/// Shorthand constructor for a raw record.
pub fn raw_record(author_n: u8, epoch_seconds: u64, message: &str) -> RawRecord {
    RawRecord {
        author: author(author_n),
        epoch_seconds,
        message: message.to_string(),
    }
}

/// A `RecordAdded` log as `eth_getLogs` returns it, with the author indexed.
pub fn record_added_log(binding: &RegistryBinding, record: &RawRecord, block: u64) -> Value {
    json!({
        "address": binding.address.to_string(),
        "topics": [
            binding.interface.record_added_topic(),
            encode_data(&abi::address_word(&record.author)),
        ],
        "data": encode_data(&abi::encode_event_data(record.epoch_seconds, &record.message)),
        "blockNumber": to_quantity(block),
        "logIndex": "0x0",
        "removed": false,
    })
}

#[derive(Default)]
struct Chain {
    head: u64,
    history: Vec<RawRecord>,
    logs: Vec<(u64, Value)>,
}

/// Simulated registry deployment behind a scripted provider.
#[derive(Clone)]
pub struct ScriptedRegistry {
    binding: RegistryBinding,
    chain: Arc<Mutex<Chain>>,
}

impl ScriptedRegistry {
    /// Installs the registry responders on `provider`.
    pub fn install(provider: &ScriptedProvider, binding: RegistryBinding) -> Self {
        let registry = Self {
            binding,
            chain: Arc::new(Mutex::new(Chain {
                head: 100,
                ..Chain::default()
            })),
        };

        let chain = registry.chain.clone();
        provider.respond_with("eth_blockNumber", move |_| {
            ScriptedResponse::Result(json!(to_quantity(chain.lock().head)))
        });

        let chain = registry.chain.clone();
        provider.respond_with("eth_call", move |params| {
            let data = params[0]["data"]
                .as_str()
                .and_then(|d| decode_data(d).ok())
                .unwrap_or_default();
            let chain = chain.lock();
            if data.starts_with(&binding.interface.get_all_records()) {
                ScriptedResponse::Result(json!(encode_data(&abi::encode_records(&chain.history))))
            } else if data.starts_with(&binding.interface.get_record_count()) {
                let count = chain.history.len() as u64;
                ScriptedResponse::Result(json!(encode_data(&abi::uint_word(count))))
            } else {
                ScriptedResponse::RpcError {
                    code: -32000,
                    message: "execution reverted".to_string(),
                }
            }
        });

        let chain = registry.chain.clone();
        provider.respond_with("eth_getLogs", move |params| {
            let bound = |key: &str| {
                params[0][key]
                    .as_str()
                    .and_then(|q| parse_quantity(q).ok())
                    .unwrap_or(0)
            };
            let (from, to) = (bound("fromBlock"), bound("toBlock"));
            let logs: Vec<Value> = chain
                .lock()
                .logs
                .iter()
                .filter(|(block, _)| *block >= from && *block <= to)
                .map(|(_, log)| log.clone())
                .collect();
            ScriptedResponse::Result(Value::Array(logs))
        });

        registry
    }

    /// Sets pre-existing history without emitting logs.
    pub fn seed_history(&self, records: Vec<RawRecord>) {
        self.chain.lock().history = records;
    }

    /// Mines a block containing `record`: history grows and a log is emitted.
    pub fn mine(&self, record: RawRecord) -> u64 {
        let mut chain = self.chain.lock();
        chain.head += 1;
        let block = chain.head;
        let log = record_added_log(&self.binding, &record, block);
        chain.history.push(record);
        chain.logs.push((block, log));
        block
    }

    /// Mines a block containing an arbitrary log and no state change.
    pub fn mine_log(&self, log: Value) -> u64 {
        let mut chain = self.chain.lock();
        chain.head += 1;
        let block = chain.head;
        chain.logs.push((block, log));
        block
    }

    /// Mines an empty block.
    pub fn advance(&self) -> u64 {
        let mut chain = self.chain.lock();
        chain.head += 1;
        chain.head
    }

    pub fn head(&self) -> u64 {
        self.chain.lock().head
    }

    pub fn history(&self) -> Vec<RawRecord> {
        self.chain.lock().history.clone()
    }

    pub fn binding(&self) -> RegistryBinding {
        self.binding
    }
}
