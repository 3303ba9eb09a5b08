//! Repository facade
//!
//! `Repository` is the single entry point domain code uses: reads, writes
//! and paging over one mapped collection.
//!
//! ```ignore
//! use aerorepo::engine::MemoryEngine;
//! use aerorepo::model::{Filter, Sort};
//! use aerorepo::repository::{Pageable, Repository};
//!
//! let repo = Repository::new(ClientMapping::new(), MemoryEngine::new())?;
//!
//! let mut filter = Filter::new();
//! filter.must().be_greater_than("totalOrders", 2);
//! let clients = repo.find_by(Some(&filter), Some(&Sort::new().asc("name")), None)?;
//!
//! let page = repo.find_all(Some(&Pageable::new(2, 2)))?;
//! ```

mod errors;
mod page;
#[allow(clippy::module_inception)]
mod repository;
mod strategies;
mod writes;

pub use errors::{RepositoryError, RepositoryResult};
pub use page::{total_pages, Page, PageContent, Pageable};
pub use repository::Repository;
pub use strategies::{FilterStrategy, ProjectionStrategy, QueryStrategies, SortStrategy};
