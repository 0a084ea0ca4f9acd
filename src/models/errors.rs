use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("invalid event signature `{signature}`: {reason}")]
    Parse { signature: String, reason: String },
}

/// Errors a log source can produce. The distinction matters: range-limit
/// rejections are recovered by shrinking the requested span, transient
/// failures by retrying, decode failures not at all.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("provider rejected the block range as too wide or the response as too large")]
    RangeLimit,
    #[error("transient rpc failure: {0}")]
    Transient(String),
    #[error("malformed log entry: {0}")]
    Decode(String),
}

impl SourceError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("log fetch failed after {attempts} attempts: {last_error}")]
    Exhausted { attempts: u32, last_error: String },
    #[error("provider range limit persisted at the minimum span of {width} blocks starting at block {start}")]
    RangeFloor { start: u64, width: u64 },
    #[error("log decode failed: {0}")]
    Decode(String),
}

#[derive(Error, Debug)]
pub enum ResolutionError {
    #[error("timestamp lookup for block {block} failed: {reason}")]
    Lookup { block: u64, reason: String },
}
