use std::collections::{BTreeMap, HashMap};

use alloy_primitives::Address;

use crate::models::logs::LogEntry;
use crate::models::records::{AttestationRecord, AttestationSummary};

/// Fold attestation entries into one record per recipient, newest
/// activity first. Entries must already be in chain order.
///
/// A block missing from `timestamps` folds as 0. Recipients tied on
/// latest timestamp keep first-seen order (the sort is stable).
pub fn aggregate_attestations(
    entries: &[LogEntry],
    timestamps: &BTreeMap<u64, u64>,
    recipient_arg: &str,
) -> AttestationSummary {
    let mut index: HashMap<Address, usize> = HashMap::new();
    let mut records: Vec<AttestationRecord> = Vec::new();

    for entry in entries {
        let recipient = entry
            .address_arg(recipient_arg)
            .expect("attestation entry missing recipient argument");
        let timestamp = timestamps.get(&entry.block_number).copied().unwrap_or(0);

        match index.get(&recipient) {
            Some(&at) => {
                let record = &mut records[at];
                record.count += 1;
                if timestamp > record.latest_timestamp {
                    record.latest_timestamp = timestamp;
                }
            }
            None => {
                index.insert(recipient, records.len());
                records.push(AttestationRecord {
                    recipient,
                    count: 1,
                    latest_timestamp: timestamp,
                });
            }
        }
    }

    records.sort_by(|a, b| b.latest_timestamp.cmp(&a.latest_timestamp));

    AttestationSummary {
        total_attestations: entries.len(),
        recipients: records,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_dyn_abi::DynSolValue;
    use alloy_primitives::B256;

    fn entry(block_number: u64, log_index: u64, recipient: Address) -> LogEntry {
        let mut args = BTreeMap::new();
        args.insert("recipient".to_string(), DynSolValue::Address(recipient));
        LogEntry {
            block_number,
            log_index,
            tx_hash: B256::repeat_byte(block_number as u8),
            args,
        }
    }

    #[test]
    fn counts_and_latest_timestamps_per_recipient() {
        let x = Address::repeat_byte(0xaa);
        let y = Address::repeat_byte(0xbb);
        let entries = vec![entry(1, 0, x), entry(2, 0, y), entry(3, 0, x), entry(4, 0, x)];
        let timestamps = BTreeMap::from([(1, 10), (2, 15), (3, 30), (4, 20)]);

        let summary = aggregate_attestations(&entries, &timestamps, "recipient");

        assert_eq!(summary.total_attestations, 4);
        assert_eq!(summary.recipients.len(), 2);
        assert_eq!(
            summary.recipients[0],
            AttestationRecord {
                recipient: x,
                count: 3,
                latest_timestamp: 30
            }
        );
        assert_eq!(
            summary.recipients[1],
            AttestationRecord {
                recipient: y,
                count: 1,
                latest_timestamp: 15
            }
        );
    }

    #[test]
    fn missing_block_timestamp_folds_as_zero() {
        let x = Address::repeat_byte(0xaa);
        let summary = aggregate_attestations(&[entry(9, 0, x)], &BTreeMap::new(), "recipient");
        assert_eq!(summary.recipients[0].latest_timestamp, 0);
    }

    #[test]
    fn fold_is_idempotent() {
        let entries: Vec<LogEntry> = (0..20)
            .map(|i| entry(i, 0, Address::repeat_byte((i % 3) as u8 + 1)))
            .collect();
        let timestamps: BTreeMap<u64, u64> = (0..20).map(|i| (i, 100 + i)).collect();

        let first = aggregate_attestations(&entries, &timestamps, "recipient");
        let second = aggregate_attestations(&entries, &timestamps, "recipient");
        assert_eq!(first, second);
    }
}
