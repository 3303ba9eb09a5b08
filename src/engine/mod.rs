//! Storage engine boundary
//!
//! Traits the repository uses to reach a document store, the option and
//! result types they exchange, and `MemoryEngine`, an in-process engine that
//! evaluates compiled predicates directly.

pub mod document;
mod errors;
mod matcher;
mod memory;
mod object_id;
mod options;
mod sorter;
mod traits;

pub use document::Document;
pub use errors::{EngineError, EngineResult};
pub use matcher::Matcher;
pub use memory::{MemoryCollection, MemoryEngine};
pub use object_id::ObjectId;
pub use options::{BulkWriteOptions, BulkWriteResult, FindOptions, UpdateOptions, WriteModel};
pub use sorter::{compare_values, DocumentSorter};
pub use traits::{Collection, StorageEngine};
