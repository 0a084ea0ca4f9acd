use alloy_eips::BlockNumberOrTag;
use alloy_provider::Provider;
use alloy_rpc_types_eth::{Filter, Log};
use alloy_transport::{RpcError, TransportErrorKind};
use tracing::debug;

use crate::models::errors::SourceError;
use crate::models::logs::LogEntry;
use crate::scanner::source::{LogQuery, LogSource};

/// [`LogSource`] backed by an alloy provider.
pub struct RpcSource<P> {
    provider: P,
}

impl<P: Provider> RpcSource<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }
}

impl<P: Provider> LogSource for RpcSource<P> {
    async fn latest_block_number(&self) -> Result<u64, SourceError> {
        self.provider.get_block_number().await.map_err(classify)
    }

    async fn get_logs(&self, query: &LogQuery<'_>) -> Result<Vec<LogEntry>, SourceError> {
        let mut filter = Filter::new()
            .address(query.address)
            .event_signature(query.schema.selector())
            .from_block(query.from_block)
            .to_block(query.to_block);
        if let Some(topic) = query.topics[0] {
            filter = filter.topic1(topic);
        }
        if let Some(topic) = query.topics[1] {
            filter = filter.topic2(topic);
        }
        if let Some(topic) = query.topics[2] {
            filter = filter.topic3(topic);
        }

        let logs = self.provider.get_logs(&filter).await.map_err(classify)?;
        debug!(
            "{} logs in blocks [{}, {}]",
            logs.len(),
            query.from_block,
            query.to_block
        );
        logs.iter().map(|log| decode_log(query, log)).collect()
    }

    async fn block_timestamp(&self, block_number: u64) -> Result<u64, SourceError> {
        let block = self
            .provider
            .get_block_by_number(BlockNumberOrTag::Number(block_number))
            .await
            .map_err(classify)?
            .ok_or_else(|| {
                SourceError::Transient(format!("provider returned no block {block_number}"))
            })?;
        Ok(block.header.inner.timestamp)
    }
}

fn decode_log(query: &LogQuery<'_>, log: &Log) -> Result<LogEntry, SourceError> {
    let block_number = log
        .block_number
        .ok_or_else(|| SourceError::Decode("log missing block_number".into()))?;
    let log_index = log
        .log_index
        .ok_or_else(|| SourceError::Decode("log missing log_index".into()))?;
    let tx_hash = log
        .transaction_hash
        .ok_or_else(|| SourceError::Decode("log missing transaction_hash".into()))?;
    let args = query.schema.decode(log.topics(), log.data().data.as_ref())?;

    Ok(LogEntry {
        block_number,
        log_index,
        tx_hash,
        args,
    })
}

/// Provider phrases that mean "the requested range or response was too
/// large". Everything not recognized here is treated as transient.
const RANGE_LIMIT_PHRASES: [&str; 4] = [
    "block range",
    "too many logs",
    "response size",
    "returned more than",
];

/// -32005 is the de-facto "limit exceeded" code (EIP-1474 / Infura).
const LIMIT_EXCEEDED_CODE: i64 = -32005;

fn classify(error: RpcError<TransportErrorKind>) -> SourceError {
    if let RpcError::ErrorResp(payload) = &error {
        let message = payload.message.to_lowercase();
        if payload.code == LIMIT_EXCEEDED_CODE
            || RANGE_LIMIT_PHRASES
                .iter()
                .any(|phrase| message.contains(phrase))
        {
            return SourceError::RangeLimit;
        }
    }
    SourceError::Transient(error.to_string())
}
