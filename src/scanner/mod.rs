pub mod aggregations;
pub mod rpc;
pub mod source;

use std::collections::{BTreeMap, VecDeque};

use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, warn};

use crate::models::common::ScanConfig;
use crate::models::errors::{FetchError, ResolutionError, SourceError};
use crate::models::filters::{LogFilter, topic_word};
use crate::models::logs::LogEntry;
use crate::scanner::source::{LogQuery, LogSource};
use crate::utils::retry::retry_transient;

/// Fetches complete log histories from a [`LogSource`], working around
/// per-request range and result-size ceilings, and resolves the block
/// timestamps the aggregation folds need.
pub struct Scanner<S> {
    source: S,
    config: ScanConfig,
}

impl<S: LogSource> Scanner<S> {
    /// The configuration is normalized once here: spans are clamped to at
    /// least one block, the halving floor to at most `max_block_span`,
    /// and the lookup window to at least one in-flight request.
    pub fn new(source: S, config: ScanConfig) -> Self {
        let mut config = config;
        config.max_block_span = config.max_block_span.max(1);
        config.min_block_span = config.min_block_span.clamp(1, config.max_block_span);
        config.timestamp_concurrency = config.timestamp_concurrency.max(1);
        Self { source, config }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Every matching entry across the filter's whole block range, as if
    /// the source had no per-request limits.
    ///
    /// Output is ascending by (block_number, log_index) with exact
    /// duplicates dropped. All-or-nothing: on any surfaced error no
    /// entries are returned at all.
    pub async fn fetch_all_logs(&self, filter: &LogFilter) -> Result<Vec<LogEntry>, FetchError> {
        let to_block = match filter.to_block {
            Some(block) => block,
            None => retry_transient(
                || self.source.latest_block_number(),
                &self.config.retry,
                "latest_block_number",
            )
            .await
            .map_err(|e| self.fetch_error(e))?,
        };
        if filter.from_block > to_block {
            return Ok(Vec::new());
        }

        let mut pending = partition(filter.from_block, to_block, self.config.max_block_span);
        let mut entries = Vec::new();

        while let Some((from, to)) = pending.pop_front() {
            let query = self.query_for(filter, from, to);
            match retry_transient(
                || self.source.get_logs(&query),
                &self.config.retry,
                "get_logs",
            )
            .await
            {
                Ok(batch) => entries.extend(batch),
                Err(SourceError::RangeLimit) => {
                    let width = to - from + 1;
                    if width <= self.config.min_block_span {
                        return Err(FetchError::RangeFloor { start: from, width });
                    }
                    // Retry the same starting block at half the width.
                    let mid = from + width / 2 - 1;
                    warn!(
                        "Range limit hit for blocks [{}, {}], splitting at {}",
                        from, to, mid
                    );
                    pending.push_front((mid + 1, to));
                    pending.push_front((from, mid));
                }
                Err(e) => return Err(self.fetch_error(e)),
            }
        }

        entries.retain(|entry| filter.matches(entry));

        // Provider-native ordering varies; ascending (block, log index)
        // order is load-bearing for the folds, so enforce it here.
        entries.sort_by_key(LogEntry::ordinal);
        entries.dedup_by(|a, b| a.ordinal() == b.ordinal() && a.tx_hash == b.tx_hash);
        Ok(entries)
    }

    /// Timestamps for exactly the distinct block numbers in `entries`:
    /// one lookup per block, `timestamp_concurrency` in flight. Any
    /// lookup failure fails the whole resolution.
    pub async fn resolve_timestamps(
        &self,
        entries: &[LogEntry],
    ) -> Result<BTreeMap<u64, u64>, ResolutionError> {
        let mut blocks: Vec<u64> = entries.iter().map(|entry| entry.block_number).collect();
        blocks.sort_unstable();
        blocks.dedup();
        debug!("Resolving timestamps for {} distinct blocks", blocks.len());

        let source = &self.source;
        let retry = &self.config.retry;
        stream::iter(blocks)
            .map(move |number| async move {
                retry_transient(|| source.block_timestamp(number), retry, "block_timestamp")
                    .await
                    .map(|timestamp| (number, timestamp))
                    .map_err(|e| ResolutionError::Lookup {
                        block: number,
                        reason: e.to_string(),
                    })
            })
            .buffer_unordered(self.config.timestamp_concurrency)
            .try_collect()
            .await
    }

    fn query_for<'a>(&self, filter: &'a LogFilter, from: u64, to: u64) -> LogQuery<'a> {
        let mut topics = [None; 3];
        for (name, value) in &filter.arg_filters {
            if let Some(position) = filter.event.indexed_position(name) {
                if position < topics.len() {
                    topics[position] = topic_word(value);
                }
            }
        }
        LogQuery {
            address: filter.address,
            schema: &filter.event,
            topics,
            from_block: from,
            to_block: to,
        }
    }

    fn fetch_error(&self, error: SourceError) -> FetchError {
        match error {
            SourceError::Decode(message) => FetchError::Decode(message),
            other => FetchError::Exhausted {
                attempts: self.config.retry.max_attempts,
                last_error: other.to_string(),
            },
        }
    }
}

/// Consecutive inclusive sub-ranges covering [from, to], each at most
/// `span` blocks wide, in ascending order.
fn partition(from: u64, to: u64, span: u64) -> VecDeque<(u64, u64)> {
    let mut ranges = VecDeque::new();
    let mut current = from;
    while current <= to {
        let end = current.saturating_add(span - 1).min(to);
        ranges.push_back((current, end));
        match end.checked_add(1) {
            Some(next) => current = next,
            None => break,
        }
    }
    ranges
}
