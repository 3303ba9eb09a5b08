//! # Repository Errors

use thiserror::Error;

use crate::compiler::CompileError;
use crate::engine::EngineError;
use crate::mapping::MappingError;

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Repository errors
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Query rejected while compiling
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// Mapping invalid or hydration failed
    #[error(transparent)]
    Mapping(#[from] MappingError),

    /// Engine failure, propagated unchanged
    #[error("Storage engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// Entity does not serialize to a document
    #[error("Type contract violated: {0}")]
    TypeContract(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RepositoryError {
    /// Returns true when a logical field had no storage name
    pub fn is_field_mapping(&self) -> bool {
        matches!(self, RepositoryError::Compile(err) if err.is_field_unmapped())
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, RepositoryError::UnsupportedOperation(_))
    }

    /// Returns true for invalid mapping configuration
    pub fn is_configuration(&self) -> bool {
        matches!(self, RepositoryError::Mapping(err) if err.is_configuration())
    }

    /// Short error code for log lines
    pub fn code(&self) -> &'static str {
        match self {
            RepositoryError::Compile(err) => err.code().code(),
            RepositoryError::Mapping(err) => err.code().code(),
            RepositoryError::Engine(_) => "REPO_STORAGE_ENGINE",
            RepositoryError::UnsupportedOperation(_) => "REPO_UNSUPPORTED_OPERATION",
            RepositoryError::TypeContract(_) => "REPO_TYPE_CONTRACT",
            RepositoryError::Serialization(_) => "REPO_SERIALIZATION",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_mapping_detection() {
        let err: RepositoryError = CompileError::field_unmapped("nickname").into();
        assert!(err.is_field_mapping());
        assert!(!err.is_unsupported());
        assert_eq!(err.code(), "REPO_FIELD_UNMAPPED");
    }

    #[test]
    fn test_engine_error_message_kept() {
        let err: RepositoryError = EngineError::DuplicateKey("7".into()).into();
        assert!(err.to_string().contains("Duplicate key: 7"));
    }

    #[test]
    fn test_configuration_detection() {
        let err: RepositoryError = MappingError::identity_not_mapped("clients", "id").into();
        assert!(err.is_configuration());
        assert_eq!(err.code(), "REPO_MAPPING_INVALID");
    }
}
