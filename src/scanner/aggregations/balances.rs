use std::collections::HashMap;

use alloy_primitives::{Address, I256, U256};

use crate::models::logs::LogEntry;
use crate::models::records::{HolderRecord, HolderSummary, TokenBalance};

/// Argument names carrying a transfer's participants and amount.
/// Defaults to the ERC-1155 `TransferSingle` layout.
#[derive(Debug, Clone)]
pub struct TransferShape {
    pub from_arg: String,
    pub to_arg: String,
    pub token_id_arg: String,
    pub amount_arg: String,
}

impl Default for TransferShape {
    fn default() -> Self {
        Self {
            from_arg: "from".to_string(),
            to_arg: "to".to_string(),
            token_id_arg: "id".to_string(),
            amount_arg: "value".to_string(),
        }
    }
}

// Per-holder running balances, in first-seen order for both the holder
// and its tokens.
struct Ledger {
    address: Address,
    token_index: HashMap<U256, usize>,
    balances: Vec<(U256, I256)>,
}

fn apply(
    index: &mut HashMap<Address, usize>,
    ledgers: &mut Vec<Ledger>,
    address: Address,
    token_id: U256,
    delta: I256,
) {
    let at = *index.entry(address).or_insert_with(|| {
        ledgers.push(Ledger {
            address,
            token_index: HashMap::new(),
            balances: Vec::new(),
        });
        ledgers.len() - 1
    });
    let ledger = &mut ledgers[at];
    let slot = *ledger.token_index.entry(token_id).or_insert_with(|| {
        ledger.balances.push((token_id, I256::ZERO));
        ledger.balances.len() - 1
    });
    ledger.balances[slot].1 += delta;
}

/// Fold transfer entries into per-holder balances, largest holder first.
///
/// Balances are running signed sums over the ordered entry stream, so an
/// address appearing on both sides nets correctly. Transfers from or to
/// the zero address touch only one side of the ledger (mint/burn), and
/// the zero address itself is never a holder. Only strictly positive
/// final balances are reported.
pub fn aggregate_balances(entries: &[LogEntry], shape: &TransferShape) -> HolderSummary {
    let mut index: HashMap<Address, usize> = HashMap::new();
    let mut ledgers: Vec<Ledger> = Vec::new();

    for entry in entries {
        let from = entry
            .address_arg(&shape.from_arg)
            .expect("transfer entry missing sender argument");
        let to = entry
            .address_arg(&shape.to_arg)
            .expect("transfer entry missing recipient argument");
        let token_id = entry
            .uint_arg(&shape.token_id_arg)
            .expect("transfer entry missing token id argument");
        let amount: I256 = entry
            .uint_arg(&shape.amount_arg)
            .expect("transfer entry missing amount argument")
            .try_into()
            .expect("transfer amount exceeds signed 256-bit range");

        if from != Address::ZERO {
            apply(&mut index, &mut ledgers, from, token_id, -amount);
        }
        if to != Address::ZERO {
            apply(&mut index, &mut ledgers, to, token_id, amount);
        }
    }

    let mut total_minted = U256::ZERO;
    let mut holders: Vec<HolderRecord> = Vec::new();
    for ledger in ledgers {
        let tokens: Vec<TokenBalance> = ledger
            .balances
            .iter()
            .filter(|(_, balance)| balance.is_positive())
            .map(|(token_id, balance)| TokenBalance {
                token_id: *token_id,
                balance: balance.unsigned_abs(),
            })
            .collect();
        if tokens.is_empty() {
            continue;
        }
        for token in &tokens {
            total_minted += token.balance;
        }
        holders.push(HolderRecord {
            address: ledger.address,
            tokens,
        });
    }

    holders.sort_by(|a, b| b.total().cmp(&a.total()));

    HolderSummary {
        holders,
        total_minted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_dyn_abi::DynSolValue;
    use alloy_primitives::B256;
    use std::collections::BTreeMap;

    fn transfer(
        block_number: u64,
        from: Address,
        to: Address,
        token_id: u64,
        amount: u64,
    ) -> LogEntry {
        let mut args = BTreeMap::new();
        args.insert("from".to_string(), DynSolValue::Address(from));
        args.insert("to".to_string(), DynSolValue::Address(to));
        args.insert(
            "id".to_string(),
            DynSolValue::Uint(U256::from(token_id), 256),
        );
        args.insert(
            "value".to_string(),
            DynSolValue::Uint(U256::from(amount), 256),
        );
        LogEntry {
            block_number,
            log_index: 0,
            tx_hash: B256::repeat_byte(block_number as u8),
            args,
        }
    }

    #[test]
    fn balances_net_across_directions() {
        let a = Address::repeat_byte(0xaa);
        let b = Address::repeat_byte(0xbb);
        let entries = vec![
            transfer(1, Address::ZERO, a, 1, 100),
            transfer(2, a, b, 1, 40),
            transfer(3, b, a, 1, 10),
        ];

        let summary = aggregate_balances(&entries, &TransferShape::default());

        assert_eq!(summary.holders.len(), 2);
        assert_eq!(summary.holders[0].address, a);
        assert_eq!(summary.holders[0].tokens[0].balance, U256::from(70u64));
        assert_eq!(summary.holders[1].address, b);
        assert_eq!(summary.holders[1].tokens[0].balance, U256::from(30u64));
        assert_eq!(summary.total_minted, U256::from(100u64));
        assert!(
            summary
                .holders
                .iter()
                .all(|holder| holder.address != Address::ZERO)
        );
    }

    #[test]
    fn fully_burned_token_is_omitted_but_holder_survives() {
        let a = Address::repeat_byte(0xaa);
        let entries = vec![
            transfer(1, Address::ZERO, a, 1, 5),
            transfer(2, Address::ZERO, a, 2, 3),
            transfer(3, a, Address::ZERO, 1, 5),
        ];

        let summary = aggregate_balances(&entries, &TransferShape::default());

        assert_eq!(summary.holders.len(), 1);
        assert_eq!(summary.holders[0].tokens.len(), 1);
        assert_eq!(summary.holders[0].tokens[0].token_id, U256::from(2u64));
        assert_eq!(summary.total_minted, U256::from(3u64));
    }

    #[test]
    fn holder_with_no_positive_balance_is_excluded() {
        let a = Address::repeat_byte(0xaa);
        let b = Address::repeat_byte(0xbb);
        let entries = vec![
            transfer(1, Address::ZERO, a, 1, 8),
            transfer(2, a, b, 1, 8),
        ];

        let summary = aggregate_balances(&entries, &TransferShape::default());

        assert_eq!(summary.holders.len(), 1);
        assert_eq!(summary.holders[0].address, b);
    }

    #[test]
    fn holders_sort_by_total_descending() {
        let a = Address::repeat_byte(0xaa);
        let b = Address::repeat_byte(0xbb);
        let entries = vec![
            transfer(1, Address::ZERO, a, 1, 2),
            transfer(2, Address::ZERO, b, 1, 5),
            transfer(3, Address::ZERO, b, 2, 1),
        ];

        let summary = aggregate_balances(&entries, &TransferShape::default());

        assert_eq!(summary.holders[0].address, b);
        assert_eq!(summary.holders[0].total(), U256::from(6u64));
        assert_eq!(summary.holders[1].total(), U256::from(2u64));
    }

    #[test]
    fn fold_is_idempotent() {
        let a = Address::repeat_byte(0xaa);
        let b = Address::repeat_byte(0xbb);
        let entries = vec![
            transfer(1, Address::ZERO, a, 1, 100),
            transfer(2, a, b, 1, 60),
            transfer(3, b, a, 1, 25),
            transfer(4, Address::ZERO, b, 2, 7),
        ];

        let first = aggregate_balances(&entries, &TransferShape::default());
        let second = aggregate_balances(&entries, &TransferShape::default());
        assert_eq!(first, second);
    }
}
