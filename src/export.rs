//! CSV renditions of the report tables.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::DateTime;

use crate::models::records::{AttestationSummary, HolderSummary};

/// `address,attestation_count,last_active`, newest first.
pub fn write_attestations_csv(path: &Path, summary: &AttestationSummary) -> Result<()> {
    let mut out = String::from("address,attestation_count,last_active\n");
    for record in &summary.recipients {
        out.push_str(&format!(
            "{:#x},{},\"{}\"\n",
            record.recipient,
            record.count,
            format_timestamp(record.latest_timestamp)
        ));
    }
    fs::write(path, out).with_context(|| format!("failed to write {}", path.display()))
}

/// One `address,token_id,balance` row per held token, largest holder
/// first.
pub fn write_holders_csv(path: &Path, summary: &HolderSummary) -> Result<()> {
    let mut out = String::from("address,token_id,balance\n");
    for holder in &summary.holders {
        for token in &holder.tokens {
            out.push_str(&format!(
                "{:#x},{},{}\n",
                holder.address, token.token_id, token.balance
            ));
        }
    }
    fs::write(path, out).with_context(|| format!("failed to write {}", path.display()))
}

fn format_timestamp(timestamp: u64) -> String {
    if timestamp == 0 {
        return "—".to_string();
    }
    DateTime::from_timestamp(timestamp as i64, 0)
        .map(|time| time.format("%b %-d, %Y").to_string())
        .unwrap_or_else(|| "—".to_string())
}
