use alloy_primitives::{Address, U256};

/// Per-recipient attestation rollup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttestationRecord {
    pub recipient: Address,
    pub count: u64,
    /// Unix seconds of the newest attestation seen for this recipient.
    pub latest_timestamp: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttestationSummary {
    /// Sorted descending by latest activity.
    pub recipients: Vec<AttestationRecord>,
    pub total_attestations: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenBalance {
    pub token_id: U256,
    pub balance: U256,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HolderRecord {
    pub address: Address,
    /// Only tokens with a strictly positive net balance.
    pub tokens: Vec<TokenBalance>,
}

impl HolderRecord {
    pub fn total(&self) -> U256 {
        self.tokens
            .iter()
            .fold(U256::ZERO, |total, token| total + token.balance)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HolderSummary {
    /// Sorted descending by total held balance.
    pub holders: Vec<HolderRecord>,
    /// Sum of every positive balance, i.e. the circulating supply.
    pub total_minted: U256,
}
