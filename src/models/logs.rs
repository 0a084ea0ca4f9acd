use std::collections::BTreeMap;

use alloy_dyn_abi::DynSolValue;
use alloy_primitives::{Address, B256, U256};

/// A decoded event log entry.
///
/// Entries produced by the scanner are ordered ascending by
/// `(block_number, log_index)`; the aggregation folds rely on that order
/// for latest-wins semantics.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub block_number: u64,
    pub log_index: u64,
    pub tx_hash: B256,
    /// Decoded argument values keyed by the event's parameter names.
    pub args: BTreeMap<String, DynSolValue>,
}

impl LogEntry {
    pub fn arg(&self, name: &str) -> Option<&DynSolValue> {
        self.args.get(name)
    }

    pub fn address_arg(&self, name: &str) -> Option<Address> {
        self.arg(name)?.as_address()
    }

    pub fn uint_arg(&self, name: &str) -> Option<U256> {
        self.arg(name)?.as_uint().map(|(value, _)| value)
    }

    pub fn word_arg(&self, name: &str) -> Option<B256> {
        self.arg(name)?.as_word()
    }

    /// Chain position, the sort key for everything downstream.
    pub fn ordinal(&self) -> (u64, u64) {
        (self.block_number, self.log_index)
    }
}
