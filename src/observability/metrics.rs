//! Repository counters
//!
//! Counters only, monotonic, reset when the repository is created.

use std::sync::atomic::{AtomicU64, Ordering};

/// Per-repository operation counters.
///
/// Relaxed ordering; values are exact once the counting threads are done.
#[derive(Debug, Default)]
pub struct RepositoryMetrics {
    queries_executed: AtomicU64,
    queries_rejected: AtomicU64,
    documents_written: AtomicU64,
    documents_removed: AtomicU64,
    bulk_retries: AtomicU64,
}

impl RepositoryMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_queries_executed(&self) {
        self.queries_executed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_queries_rejected(&self) {
        self.queries_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_documents_written(&self, count: u64) {
        self.documents_written.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_documents_removed(&self, count: u64) {
        self.documents_removed.fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_bulk_retries(&self) {
        self.bulk_retries.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of every counter
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            queries_executed: self.queries_executed.load(Ordering::Relaxed),
            queries_rejected: self.queries_rejected.load(Ordering::Relaxed),
            documents_written: self.documents_written.load(Ordering::Relaxed),
            documents_removed: self.documents_removed.load(Ordering::Relaxed),
            bulk_retries: self.bulk_retries.load(Ordering::Relaxed),
        }
    }
}

/// Counter values at one instant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub queries_executed: u64,
    pub queries_rejected: u64,
    pub documents_written: u64,
    pub documents_removed: u64,
    pub bulk_retries: u64,
}
