//! Observability subsystem
//!
//! Structured JSON logging, typed events and per-repository counters.
//! Observability never changes the outcome of an operation: log writes
//! that fail are ignored.
//!
//! ```ignore
//! use aerorepo::observability::{log_event, Event};
//!
//! log_event(Event::CollectionDropped, &[("collection", "customers")]);
//! ```

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsSnapshot, RepositoryMetrics};

/// Logs an event at its own severity
pub fn log_event(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}
