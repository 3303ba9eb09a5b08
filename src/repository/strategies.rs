//! Injectable query compilation strategies
//!
//! A repository compiles filters, sorts and field lists through these
//! function pointers. The defaults are the crate's compilers.

use crate::compiler::{
    compile_filter, compile_projection, compile_sort, CompileResult, Predicate, Projection,
    SortSpec,
};
use crate::mapping::ResolvedMapping;
use crate::model::{Fields, Filter, Sort};

pub type FilterStrategy = fn(&Filter, &ResolvedMapping) -> CompileResult<Predicate>;
pub type SortStrategy = fn(&Sort, &ResolvedMapping) -> CompileResult<Option<SortSpec>>;
pub type ProjectionStrategy = fn(&Fields, &ResolvedMapping) -> CompileResult<Option<Projection>>;

/// The three compilation steps of a query
#[derive(Debug, Clone, Copy)]
pub struct QueryStrategies {
    pub filter: FilterStrategy,
    pub sort: SortStrategy,
    pub project: ProjectionStrategy,
}

impl Default for QueryStrategies {
    fn default() -> Self {
        Self {
            filter: compile_filter,
            sort: compile_sort,
            project: compile_projection,
        }
    }
}

impl QueryStrategies {
    pub fn with_filter(mut self, filter: FilterStrategy) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_sort(mut self, sort: SortStrategy) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_projection(mut self, project: ProjectionStrategy) -> Self {
        self.project = project;
        self
    }
}
