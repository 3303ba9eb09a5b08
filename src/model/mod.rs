//! Storage-agnostic query model
//!
//! Filters, sorts, projections and identities as domain code sees them.
//! Everything here speaks in logical field names; translation to storage
//! names happens in the compiler.

mod fields;
mod filter;
mod identity;
mod sort;

pub use fields::Fields;
pub use filter::{Clause, ClauseGroup, FieldOperands, Filter, Operand, PredicateKind};
pub use identity::{EntityId, Identity};
pub use sort::{Order, Sort};
