//! Repository events
//!
//! Every log line the crate writes names one of these events.

use std::fmt;

use super::logger::Severity;

/// Observable repository events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Filter, sort and projection compiled for a query
    QueryCompiled,
    /// Query rejected before reaching the engine
    QueryRejected,
    /// Query executed against the engine
    QueryExecuted,
    /// Documents inserted or updated
    WriteCommitted,
    /// Bulk write reported no upserts; missing documents inserted again
    BulkWriteRetry,
    /// Collection dropped
    CollectionDropped,
    /// Operation inside `transactional` failed
    TransactionFailed,
    /// Repository configuration loaded
    ConfigLoaded,
    /// Mapping file loaded
    MappingLoaded,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::QueryCompiled => "QUERY_COMPILED",
            Event::QueryRejected => "QUERY_REJECTED",
            Event::QueryExecuted => "QUERY_EXECUTED",
            Event::WriteCommitted => "WRITE_COMMITTED",
            Event::BulkWriteRetry => "BULK_WRITE_RETRY",
            Event::CollectionDropped => "COLLECTION_DROPPED",
            Event::TransactionFailed => "TRANSACTION_FAILED",
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::MappingLoaded => "MAPPING_LOADED",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::QueryCompiled | Event::QueryExecuted => Severity::Trace,
            Event::QueryRejected | Event::BulkWriteRetry => Severity::Warn,
            Event::TransactionFailed => Severity::Error,
            Event::WriteCommitted
            | Event::CollectionDropped
            | Event::ConfigLoaded
            | Event::MappingLoaded => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
