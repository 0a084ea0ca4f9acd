use alloy_primitives::{Address, B256};

use crate::models::errors::SourceError;
use crate::models::filters::EventSchema;
use crate::models::logs::LogEntry;

/// One prepared `get_logs` request: a single contract and event over one
/// bounded block range, with whatever argument constraints could be
/// expressed as topics.
#[derive(Debug, Clone)]
pub struct LogQuery<'a> {
    pub address: Address,
    pub schema: &'a EventSchema,
    /// Constraints for topic slots 1..=3. `None` matches anything.
    pub topics: [Option<B256>; 3],
    pub from_block: u64,
    pub to_block: u64,
}

/// The RPC capability the scanner consumes. Implementations must report
/// provider range/size rejections as [`SourceError::RangeLimit`] so the
/// paginator shrinks and retries instead of aborting.
#[allow(async_fn_in_trait)]
pub trait LogSource {
    async fn latest_block_number(&self) -> Result<u64, SourceError>;

    /// Decoded logs for `query`, in any order; the scanner sorts.
    async fn get_logs(&self, query: &LogQuery<'_>) -> Result<Vec<LogEntry>, SourceError>;

    /// Unix timestamp of the given block.
    async fn block_timestamp(&self, block_number: u64) -> Result<u64, SourceError>;
}

impl<S: LogSource> LogSource for &S {
    async fn latest_block_number(&self) -> Result<u64, SourceError> {
        (**self).latest_block_number().await
    }

    async fn get_logs(&self, query: &LogQuery<'_>) -> Result<Vec<LogEntry>, SourceError> {
        (**self).get_logs(query).await
    }

    async fn block_timestamp(&self, block_number: u64) -> Result<u64, SourceError> {
        (**self).block_timestamp(block_number).await
    }
}
