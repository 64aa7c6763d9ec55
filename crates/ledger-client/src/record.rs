//! Ledger-side record representation and `RecordAdded` log decoding.

use provider_rpc::{decode_data, Address};
use record_store::Record;
use serde_json::Value;

use crate::abi;
use crate::binding::RegistryInterface;
use crate::ListenerError;

/// A record as the ledger stores and emits it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub author: Address,
    pub epoch_seconds: u64,
    pub message: String,
}

impl RawRecord {
    /// Converts into the domain record, or None if the timestamp is out of range.
    pub fn into_record(self) -> Option<Record> {
        Record::from_epoch_seconds(self.author, self.epoch_seconds, self.message)
    }
}

/// Decodes one `eth_getLogs` entry into a raw record.
///
/// Returns `Ok(None)` for logs the node marks as `removed` (reorged out).
/// The author is read from topic 1 when the event indexes it, otherwise from
/// the first data word.
pub fn decode_record_added(
    log: &Value,
    interface: RegistryInterface,
) -> Result<Option<RawRecord>, ListenerError> {
    if log.get("removed").and_then(Value::as_bool).unwrap_or(false) {
        return Ok(None);
    }

    let topics = log
        .get("topics")
        .and_then(Value::as_array)
        .ok_or_else(|| ListenerError::MalformedLog("missing topics".to_string()))?;

    let topic0 = topics
        .first()
        .and_then(Value::as_str)
        .ok_or_else(|| ListenerError::MalformedLog("missing topic 0".to_string()))?;
    if !topic0.eq_ignore_ascii_case(interface.record_added_topic()) {
        return Err(ListenerError::UnexpectedTopic(topic0.to_string()));
    }

    let data = log
        .get("data")
        .and_then(Value::as_str)
        .ok_or_else(|| ListenerError::MalformedLog("missing data".to_string()))?;
    let data = decode_data(data).map_err(|e| ListenerError::MalformedLog(e.to_string()))?;

    let record = match topics.get(1) {
        Some(author_topic) => {
            let raw = author_topic
                .as_str()
                .ok_or_else(|| ListenerError::MalformedLog("topic 1 is not a string".to_string()))?;
            let bytes =
                decode_data(raw).map_err(|e| ListenerError::MalformedLog(e.to_string()))?;
            let word: [u8; abi::WORD] = bytes
                .try_into()
                .map_err(|_| ListenerError::MalformedLog("topic 1 is not 32 bytes".to_string()))?;
            let author = Address::from_word(&word)
                .ok_or_else(|| ListenerError::MalformedLog("topic 1 is not an address".to_string()))?;
            let (epoch_seconds, message) = abi::decode_event_data(&data)?;
            RawRecord {
                author,
                epoch_seconds,
                message,
            }
        }
        None => abi::decode_event_data_with_author(&data)?,
    };

    Ok(Some(record))
}
