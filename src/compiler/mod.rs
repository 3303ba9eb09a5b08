//! Query compiler
//!
//! Compiles storage-agnostic filters, sorts and field lists into the native
//! query model engines evaluate. Compilation is pure: the same input and
//! mapping always produce the same output, and every error surfaces before
//! an engine is contacted.

mod errors;
mod explain;
mod expression;
mod filter;
mod predicate;
mod projection;
mod sort;

pub use errors::{CompileError, CompileErrorCode, CompileResult, Severity};
pub use explain::QueryExplain;
pub use expression::{Expression, Pattern, PatternKind};
pub use filter::compile_filter;
pub use predicate::{FieldOp, Predicate};
pub use projection::{compile_projection, Projection};
pub use sort::{compile_sort, SortSpec};
