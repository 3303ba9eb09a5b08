//! Field-name mapping subsystem
//!
//! Maps the logical field names domain code uses to the names documents are
//! stored under, and names the identity field of each collection.
//!
//! A `Mapping` is validated once into a `ResolvedMapping`, which the
//! compilers receive explicitly. Mappings can be written in code or loaded
//! from JSON files through `MappingLoader`.

mod contract;
mod errors;
mod field_map;
mod loader;
mod static_mapping;

pub use contract::{Mapping, ResolvedMapping};
pub use errors::{MappingError, MappingErrorCode, MappingResult, Severity};
pub use field_map::{FieldMap, OBJECT_ID_FIELD};
pub use loader::MappingLoader;
pub use static_mapping::StaticMapping;
