//! Minimal ABI codec for the registry's call interface.
//!
//! Only the shapes the registry uses are supported: a single `string`
//! argument, `uint64` results, a dynamic array of `(address, uint64, string)`
//! tuples, and the `RecordAdded` log payload.

use provider_rpc::Address;
use thiserror::Error;

use crate::RawRecord;

/// Size of one ABI word.
pub const WORD: usize = 32;

/// Every array element needs at least one head word, so a declared length
/// larger than the payload can hold is rejected before allocating.
const MIN_TUPLE_HEAD: usize = WORD;

/// ABI decoding error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AbiError {
    /// A read went past the end of the payload.
    #[error("read of {len} bytes at offset {offset} exceeds payload of {size} bytes")]
    OutOfBounds {
        offset: usize,
        len: usize,
        size: usize,
    },

    /// A numeric word does not fit the target integer type.
    #[error("value at offset {0} overflows the target integer")]
    Overflow(usize),

    /// An address word has non-zero padding.
    #[error("invalid address word at offset {0}")]
    InvalidAddress(usize),

    /// String bytes are not valid UTF-8.
    #[error("string at offset {0} is not valid UTF-8")]
    InvalidUtf8(usize),
}

/// Result type alias using AbiError.
pub type AbiResult<T> = Result<T, AbiError>;

/// Bounds-checked reader over an ABI payload.
pub struct AbiReader<'a> {
    data: &'a [u8],
}

impl<'a> AbiReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    fn slice(&self, offset: usize, len: usize) -> AbiResult<&'a [u8]> {
        let end = offset.checked_add(len).ok_or(AbiError::OutOfBounds {
            offset,
            len,
            size: self.data.len(),
        })?;
        self.data.get(offset..end).ok_or(AbiError::OutOfBounds {
            offset,
            len,
            size: self.data.len(),
        })
    }

    /// Reads the 32-byte word at `offset`.
    pub fn word(&self, offset: usize) -> AbiResult<&'a [u8; WORD]> {
        self.slice(offset, WORD)?
            .try_into()
            .map_err(|_| AbiError::OutOfBounds {
                offset,
                len: WORD,
                size: self.data.len(),
            })
    }

    /// Reads a `uint` word as u64.
    pub fn u64_at(&self, offset: usize) -> AbiResult<u64> {
        let word = self.word(offset)?;
        if word[..WORD - 8].iter().any(|b| *b != 0) {
            return Err(AbiError::Overflow(offset));
        }
        let mut tail = [0u8; 8];
        tail.copy_from_slice(&word[WORD - 8..]);
        Ok(u64::from_be_bytes(tail))
    }

    /// Reads a `uint` word used as an offset or length.
    pub fn usize_at(&self, offset: usize) -> AbiResult<usize> {
        let value = self.u64_at(offset)?;
        usize::try_from(value).map_err(|_| AbiError::Overflow(offset))
    }

    /// Reads an `address` word.
    pub fn address_at(&self, offset: usize) -> AbiResult<Address> {
        Address::from_word(self.word(offset)?).ok_or(AbiError::InvalidAddress(offset))
    }

    /// Reads a `string` whose length word sits at `offset`.
    pub fn string_at(&self, offset: usize) -> AbiResult<String> {
        let len = self.usize_at(offset)?;
        let bytes = self.slice(offset + WORD, len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| AbiError::InvalidUtf8(offset))
    }

    /// Reads a `(address, uint64, string)` tuple whose head starts at `base`.
    fn record_at(&self, base: usize) -> AbiResult<RawRecord> {
        let author = self.address_at(base)?;
        let epoch_seconds = self.u64_at(base + WORD)?;
        let message_offset = self.usize_at(base + 2 * WORD)?;
        let message = self.string_at(checked_add(base, message_offset)?)?;
        Ok(RawRecord {
            author,
            epoch_seconds,
            message,
        })
    }
}

fn checked_add(base: usize, offset: usize) -> AbiResult<usize> {
    base.checked_add(offset).ok_or(AbiError::Overflow(base))
}

/// Decodes the return data of `getAllRecords()`.
pub fn decode_records(data: &[u8]) -> AbiResult<Vec<RawRecord>> {
    let reader = AbiReader::new(data);
    let array_offset = reader.usize_at(0)?;
    let len = reader.usize_at(array_offset)?;

    let heads = checked_add(array_offset, WORD)?;
    if len > data.len() / MIN_TUPLE_HEAD {
        return Err(AbiError::OutOfBounds {
            offset: heads,
            len: len.saturating_mul(WORD),
            size: data.len(),
        });
    }

    let mut records = Vec::with_capacity(len);
    for i in 0..len {
        let tuple_offset = reader.usize_at(heads + i * WORD)?;
        records.push(reader.record_at(checked_add(heads, tuple_offset)?)?);
    }
    Ok(records)
}

/// Decodes a single `uint64` return value.
pub fn decode_u64(data: &[u8]) -> AbiResult<u64> {
    AbiReader::new(data).u64_at(0)
}

/// Decodes the non-indexed `(uint64, string)` part of a `RecordAdded` log.
pub fn decode_event_data(data: &[u8]) -> AbiResult<(u64, String)> {
    let reader = AbiReader::new(data);
    let epoch_seconds = reader.u64_at(0)?;
    let message_offset = reader.usize_at(WORD)?;
    Ok((epoch_seconds, reader.string_at(message_offset)?))
}

/// Decodes a `RecordAdded` log whose author is not indexed.
pub fn decode_event_data_with_author(data: &[u8]) -> AbiResult<RawRecord> {
    AbiReader::new(data).record_at(0)
}

/// Encodes a call with a single `string` argument.
pub fn encode_string_call(selector: [u8; 4], value: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(4 + 2 * WORD + padded_len(value.len()));
    out.extend_from_slice(&selector);
    out.extend_from_slice(&uint_word(WORD as u64));
    push_bytes(&mut out, value.as_bytes());
    out
}

/// Encodes a call without arguments.
pub fn encode_call(selector: [u8; 4]) -> Vec<u8> {
    selector.to_vec()
}

/// Encodes a u64 as a big-endian ABI word.
pub fn uint_word(value: u64) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[WORD - 8..].copy_from_slice(&value.to_be_bytes());
    word
}

/// Encodes an address as a left-padded ABI word.
pub fn address_word(address: &Address) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[WORD - 20..].copy_from_slice(address.as_bytes());
    word
}

fn padded_len(len: usize) -> usize {
    len.div_ceil(WORD) * WORD
}

/// Appends a length word followed by the zero-padded bytes.
fn push_bytes(out: &mut Vec<u8>, bytes: &[u8]) {
    out.extend_from_slice(&uint_word(bytes.len() as u64));
    out.extend_from_slice(bytes);
    out.resize(out.len() + padded_len(bytes.len()) - bytes.len(), 0);
}

/// Encodes records the way `getAllRecords()` returns them.
pub fn encode_records(records: &[RawRecord]) -> Vec<u8> {
    let tails: Vec<Vec<u8>> = records.iter().map(encode_record_tuple).collect();

    let mut out = Vec::new();
    out.extend_from_slice(&uint_word(WORD as u64));
    out.extend_from_slice(&uint_word(records.len() as u64));

    let mut offset = records.len() * WORD;
    for tail in &tails {
        out.extend_from_slice(&uint_word(offset as u64));
        offset += tail.len();
    }
    for tail in tails {
        out.extend_from_slice(&tail);
    }
    out
}

fn encode_record_tuple(record: &RawRecord) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&address_word(&record.author));
    out.extend_from_slice(&uint_word(record.epoch_seconds));
    out.extend_from_slice(&uint_word(3 * WORD as u64));
    push_bytes(&mut out, record.message.as_bytes());
    out
}

/// Encodes the non-indexed `(uint64, string)` data of a `RecordAdded` log.
pub fn encode_event_data(epoch_seconds: u64, message: &str) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&uint_word(epoch_seconds));
    out.extend_from_slice(&uint_word(2 * WORD as u64));
    push_bytes(&mut out, message.as_bytes());
    out
}
