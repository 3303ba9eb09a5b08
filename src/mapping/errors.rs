//! Mapping error types
//!
//! Error codes:
//! - REPO_MAPPING_INVALID (FATAL at construction)
//! - REPO_HYDRATION_FAILED (ERROR)

use std::fmt;

/// Severity levels for mapping errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// A single read failed, repository remains usable
    Error,
    /// Repository cannot be constructed
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Mapping error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingErrorCode {
    /// Malformed mapping configuration
    RepoMappingInvalid,
    /// A stored document could not be turned into an entity
    RepoHydrationFailed,
}

impl MappingErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            MappingErrorCode::RepoMappingInvalid => "REPO_MAPPING_INVALID",
            MappingErrorCode::RepoHydrationFailed => "REPO_HYDRATION_FAILED",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            MappingErrorCode::RepoMappingInvalid => Severity::Fatal,
            MappingErrorCode::RepoHydrationFailed => Severity::Error,
        }
    }
}

impl fmt::Display for MappingErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Mapping error with context
#[derive(Debug, Clone)]
pub struct MappingError {
    code: MappingErrorCode,
    message: String,
    /// Collection the mapping describes, when known
    collection: Option<String>,
}

impl MappingError {
    /// Malformed mapping configuration
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self {
            code: MappingErrorCode::RepoMappingInvalid,
            message: reason.into(),
            collection: None,
        }
    }

    /// Identity field is not a key of the field map
    pub fn identity_not_mapped(collection: impl Into<String>, identity: &str) -> Self {
        let collection = collection.into();
        Self {
            code: MappingErrorCode::RepoMappingInvalid,
            message: format!(
                "Identity field '{}' of '{}' has no associated column",
                identity, collection
            ),
            collection: Some(collection),
        }
    }

    /// Document could not be hydrated into an entity
    pub fn hydration_failed(reason: impl Into<String>) -> Self {
        Self {
            code: MappingErrorCode::RepoHydrationFailed,
            message: reason.into(),
            collection: None,
        }
    }

    /// Attaches the collection name
    pub fn in_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = Some(collection.into());
        self
    }

    pub fn code(&self) -> MappingErrorCode {
        self.code
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn collection(&self) -> Option<&str> {
        self.collection.as_deref()
    }

    /// Returns true for configuration errors
    pub fn is_configuration(&self) -> bool {
        self.code == MappingErrorCode::RepoMappingInvalid
    }
}

impl fmt::Display for MappingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )
    }
}

impl std::error::Error for MappingError {}

impl From<serde_json::Error> for MappingError {
    fn from(err: serde_json::Error) -> Self {
        MappingError::hydration_failed(err.to_string())
    }
}

/// Result type for mapping operations
pub type MappingResult<T> = Result<T, MappingError>;
