use serde::Deserialize;

use crate::utils::retry::RetryConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    Attestations,
    Holders,
}

/// Scan policy knobs. Everything lives here, passed at construction, so
/// two scanners with different policies can coexist in one process.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Widest block span requested from the source in a single call.
    /// Chosen conservatively below known provider ceilings.
    pub max_block_span: u64,
    /// Halving floor; a range-limit rejection at or below this width
    /// surfaces to the caller.
    pub min_block_span: u64,
    /// In-flight timestamp lookups.
    pub timestamp_concurrency: usize,
    pub retry: RetryConfig,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_block_span: 200_000,
            min_block_span: 1_024,
            timestamp_concurrency: 8,
            retry: RetryConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub rpc_url: String,
    pub report: ReportKind,
    pub contract_address: String,
    /// Human-readable event signature; defaults per report kind.
    pub event_signature: Option<String>,
    /// bytes32 schema UID constraint for attestation reports.
    pub schema_uid: Option<String>,
    #[serde(default)]
    pub from_block: u64,
    pub to_block: Option<u64>,
    /// CSV output path; summary is only logged when absent.
    pub output: Option<String>,
    #[serde(default)]
    pub scan: ScanConfig,
}
