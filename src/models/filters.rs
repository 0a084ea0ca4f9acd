use std::collections::BTreeMap;

use alloy_dyn_abi::{DynSolValue, EventExt};
use alloy_json_abi::Event;
use alloy_primitives::{Address, B256};

use crate::models::errors::{SchemaError, SourceError};
use crate::models::logs::LogEntry;

/// EAS `Attested` event, emitted once per attestation.
pub const ATTESTED_SIGNATURE: &str = "event Attested(address indexed recipient, address indexed attester, bytes32 uid, bytes32 indexed schemaUID)";

/// ERC-1155 single transfer event; also covers mints and burns via the
/// zero address.
pub const TRANSFER_SINGLE_SIGNATURE: &str = "event TransferSingle(address indexed operator, address indexed from, address indexed to, uint256 id, uint256 value)";

/// A parsed event definition: selector plus argument layout.
#[derive(Debug, Clone)]
pub struct EventSchema {
    event: Event,
    selector: B256,
}

impl EventSchema {
    /// Parse a human-readable signature, with or without the leading
    /// `event` keyword.
    pub fn parse(signature: &str) -> Result<Self, SchemaError> {
        let trimmed = signature.trim();
        let stripped = trimmed.strip_prefix("event ").unwrap_or(trimmed);
        let event = Event::parse(stripped).map_err(|e| SchemaError::Parse {
            signature: signature.to_string(),
            reason: e.to_string(),
        })?;
        let selector = event.selector();
        Ok(Self { event, selector })
    }

    pub fn name(&self) -> &str {
        &self.event.name
    }

    /// keccak256 of the canonical signature, i.e. topic0.
    pub fn selector(&self) -> B256 {
        self.selector
    }

    /// Position of `name` among the indexed inputs. Topic slot is this
    /// plus one, topic0 being the selector.
    pub fn indexed_position(&self, name: &str) -> Option<usize> {
        self.event
            .inputs
            .iter()
            .filter(|input| input.indexed)
            .position(|input| input.name == name)
    }

    pub fn has_arg(&self, name: &str) -> bool {
        self.event.inputs.iter().any(|input| input.name == name)
    }

    /// Decode a raw log's topics and data into named argument values.
    pub fn decode(
        &self,
        topics: &[B256],
        data: &[u8],
    ) -> Result<BTreeMap<String, DynSolValue>, SourceError> {
        let decoded = self
            .event
            .decode_log_parts(topics.iter().copied(), data)
            .map_err(|e| SourceError::Decode(format!("{}: {e}", self.event.name)))?;

        let mut indexed = decoded.indexed.into_iter();
        let mut body = decoded.body.into_iter();
        let mut args = BTreeMap::new();
        for input in &self.event.inputs {
            let value = if input.indexed {
                indexed.next()
            } else {
                body.next()
            };
            let value = value.ok_or_else(|| {
                SourceError::Decode(format!(
                    "{}: missing decoded value for `{}`",
                    self.event.name, input.name
                ))
            })?;
            args.insert(input.name.clone(), value);
        }
        Ok(args)
    }
}

/// Selects the logs to fetch: one contract, one event, optional named
/// argument constraints, and an inclusive block range.
#[derive(Debug, Clone)]
pub struct LogFilter {
    pub address: Address,
    pub event: EventSchema,
    pub arg_filters: BTreeMap<String, DynSolValue>,
    pub from_block: u64,
    /// Inclusive upper bound; `None` means the chain head, resolved once
    /// per fetch.
    pub to_block: Option<u64>,
}

impl LogFilter {
    pub fn new(address: Address, signature: &str) -> Result<Self, SchemaError> {
        Ok(Self {
            address,
            event: EventSchema::parse(signature)?,
            arg_filters: BTreeMap::new(),
            from_block: 0,
            to_block: None,
        })
    }

    /// Require `name` to equal `value`. Indexed arguments are pushed down
    /// as topic constraints; all constraints are re-checked client-side.
    pub fn arg(mut self, name: &str, value: DynSolValue) -> Self {
        self.arg_filters.insert(name.to_string(), value);
        self
    }

    pub fn from_block(mut self, block: u64) -> Self {
        self.from_block = block;
        self
    }

    pub fn to_block(mut self, block: u64) -> Self {
        self.to_block = Some(block);
        self
    }

    /// Check every named constraint against decoded values, so a source
    /// that cannot filter server-side still yields correct results.
    pub fn matches(&self, entry: &LogEntry) -> bool {
        self.arg_filters
            .iter()
            .all(|(name, want)| entry.arg(name) == Some(want))
    }
}

/// Encode an argument value as a 32-byte topic word, per the event topic
/// encoding for value types. Dynamic types are not supported as filters.
pub(crate) fn topic_word(value: &DynSolValue) -> Option<B256> {
    match value {
        DynSolValue::Address(address) => Some(B256::left_padding_from(address.as_slice())),
        DynSolValue::Uint(value, _) => Some(B256::from(value.to_be_bytes::<32>())),
        DynSolValue::Int(value, _) => Some(B256::from(value.to_be_bytes::<32>())),
        DynSolValue::FixedBytes(word, _) => Some(*word),
        DynSolValue::Bool(flag) => Some(B256::with_last_byte(*flag as u8)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{U256, b256};

    #[test]
    fn parses_signature_and_selector() {
        let schema = EventSchema::parse(TRANSFER_SINGLE_SIGNATURE).unwrap();
        assert_eq!(schema.name(), "TransferSingle");
        // Canonical ERC-1155 TransferSingle topic0.
        assert_eq!(
            schema.selector(),
            b256!("c3d58168c5ae7397731d063d5bbf3d657854427343f4c083240f7aacaa2d0f62")
        );
    }

    #[test]
    fn keyword_prefix_is_optional() {
        let with = EventSchema::parse(TRANSFER_SINGLE_SIGNATURE).unwrap();
        let without = EventSchema::parse(TRANSFER_SINGLE_SIGNATURE.trim_start_matches("event "))
            .unwrap();
        assert_eq!(with.selector(), without.selector());
    }

    #[test]
    fn indexed_positions_follow_declaration_order() {
        let schema = EventSchema::parse(TRANSFER_SINGLE_SIGNATURE).unwrap();
        assert_eq!(schema.indexed_position("operator"), Some(0));
        assert_eq!(schema.indexed_position("from"), Some(1));
        assert_eq!(schema.indexed_position("to"), Some(2));
        assert_eq!(schema.indexed_position("id"), None);
        assert!(schema.has_arg("value"));
        assert!(!schema.has_arg("amount"));
    }

    #[test]
    fn decodes_topics_and_data() {
        let schema = EventSchema::parse(TRANSFER_SINGLE_SIGNATURE).unwrap();
        let operator = Address::repeat_byte(0x11);
        let from = Address::repeat_byte(0x22);
        let to = Address::repeat_byte(0x33);

        let topics = [
            schema.selector(),
            B256::left_padding_from(operator.as_slice()),
            B256::left_padding_from(from.as_slice()),
            B256::left_padding_from(to.as_slice()),
        ];
        let mut data = [0u8; 64];
        data[..32].copy_from_slice(&U256::from(7u64).to_be_bytes::<32>());
        data[32..].copy_from_slice(&U256::from(100u64).to_be_bytes::<32>());

        let args = schema.decode(&topics, &data).unwrap();
        assert_eq!(args["from"].as_address(), Some(from));
        assert_eq!(args["to"].as_address(), Some(to));
        assert_eq!(args["id"].as_uint().map(|(v, _)| v), Some(U256::from(7u64)));
        assert_eq!(
            args["value"].as_uint().map(|(v, _)| v),
            Some(U256::from(100u64))
        );
    }
}
