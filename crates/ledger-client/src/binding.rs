//! The registry's fixed address and versioned call interface.

use provider_rpc::Address;

/// Versioned call interface of the registry contract.
///
/// Selectors and the event topic are the first 4 / all 32 bytes of the
/// keccak-256 hash of the canonical signatures listed on each accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryInterface {
    /// `getAllRecords()`, `submitRecord(string)`, `getRecordCount()`,
    /// `RecordAdded(address,uint64,string)`.
    V1,
}

impl RegistryInterface {
    /// Selector of `getAllRecords()`.
    pub fn get_all_records(&self) -> [u8; 4] {
        match self {
            RegistryInterface::V1 => [0xa7, 0xf9, 0xfe, 0x72],
        }
    }

    /// Selector of `submitRecord(string)`.
    pub fn submit_record(&self) -> [u8; 4] {
        match self {
            RegistryInterface::V1 => [0x22, 0xa9, 0x03, 0xf7],
        }
    }

    /// Selector of `getRecordCount()`.
    pub fn get_record_count(&self) -> [u8; 4] {
        match self {
            RegistryInterface::V1 => [0xca, 0x26, 0x7f, 0x28],
        }
    }

    /// Topic 0 of `RecordAdded(address,uint64,string)`.
    pub fn record_added_topic(&self) -> &'static str {
        match self {
            RegistryInterface::V1 => {
                "0x1db65dbfd30731639a9a96077481a0488255519884b507fd6b8ae97928abce45"
            }
        }
    }
}

/// A registry deployment: where it lives and how to talk to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryBinding {
    pub address: Address,
    pub interface: RegistryInterface,
}

impl RegistryBinding {
    /// Binds the V1 interface at `address`.
    pub fn v1(address: Address) -> Self {
        Self {
            address,
            interface: RegistryInterface::V1,
        }
    }
}
