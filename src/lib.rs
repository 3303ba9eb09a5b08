//! aerorepo - A mapping-aware document repository
//!
//! Domain code builds engine-neutral filters, sorts and field lists over
//! logical field names. The repository compiles them against a mapping into
//! native predicates over storage names, runs them on a storage engine and
//! hydrates the results back into entities.
//!
//! Layers, bottom-up:
//! - `model`: filter, sort, field list and identity types
//! - `mapping`: logical to storage name maps and entity hydration
//! - `compiler`: filter, sort and projection compilation
//! - `engine`: storage engine contract and the in-memory engine
//! - `repository`: the facade, paging and writes

pub mod compiler;
pub mod config;
pub mod engine;
pub mod mapping;
pub mod model;
pub mod observability;
pub mod repository;

pub use compiler::{compile_filter, compile_projection, compile_sort, Predicate};
pub use config::RepositoryConfig;
pub use engine::{Collection, MemoryEngine, StorageEngine};
pub use mapping::{Mapping, ResolvedMapping, StaticMapping};
pub use model::{Clause, EntityId, Fields, Filter, Identity, Order, Sort};
pub use repository::{Page, PageContent, Pageable, Repository, RepositoryError, RepositoryResult};
