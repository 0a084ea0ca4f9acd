//! Paginated on-chain event log retrieval and aggregation.
//!
//! [`Scanner`] pulls complete log histories from a [`LogSource`] by
//! splitting wide block ranges into provider-sized requests (shrinking
//! further when a provider rejects a range), resolves block timestamps
//! with bounded concurrency, and the [`scanner::aggregations`] folds
//! turn the ordered entry stream into recipient and holder reports.

pub mod export;
pub mod models;
pub mod scanner;
pub mod utils;

pub use models::errors::{FetchError, ResolutionError, SchemaError, SourceError};
pub use models::filters::{EventSchema, LogFilter};
pub use models::logs::LogEntry;
pub use scanner::Scanner;
pub use scanner::source::{LogQuery, LogSource};
