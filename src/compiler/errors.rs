//! Compiler error types
//!
//! Error codes:
//! - REPO_FIELD_UNMAPPED (REJECT)
//! - REPO_INVALID_OPERAND (REJECT)
//! - REPO_UNSUPPORTED_OPERATION (REJECT)
//!
//! Every compiler error is raised before the engine is contacted.

use std::fmt;

use crate::model::PredicateKind;

/// Severity levels for compiler errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Caller's query rejected
    Reject,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
        }
    }
}

/// Compiler error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileErrorCode {
    /// Logical field has no storage name
    RepoFieldUnmapped,
    /// Operand shape does not fit the predicate kind
    RepoInvalidOperand,
    /// Query shape the repository cannot express
    RepoUnsupportedOperation,
}

impl CompileErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            CompileErrorCode::RepoFieldUnmapped => "REPO_FIELD_UNMAPPED",
            CompileErrorCode::RepoInvalidOperand => "REPO_INVALID_OPERAND",
            CompileErrorCode::RepoUnsupportedOperation => "REPO_UNSUPPORTED_OPERATION",
        }
    }

    pub fn severity(&self) -> Severity {
        Severity::Reject
    }
}

impl fmt::Display for CompileErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Compiler error with context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileError {
    code: CompileErrorCode,
    message: String,
    /// Logical field the error concerns
    field: Option<String>,
}

impl CompileError {
    /// Logical field missing from the mapping
    pub fn field_unmapped(field: impl Into<String>) -> Self {
        let field = field.into();
        Self {
            code: CompileErrorCode::RepoFieldUnmapped,
            message: format!("Field '{}' has no associated storage field", field),
            field: Some(field),
        }
    }

    /// Operand of the wrong shape for its predicate kind
    pub fn invalid_operand(kind: PredicateKind, field: impl Into<String>, expected: &str) -> Self {
        let field = field.into();
        Self {
            code: CompileErrorCode::RepoInvalidOperand,
            message: format!("{} on '{}' expects {}", kind, field, expected),
            field: Some(field),
        }
    }

    pub fn unsupported(reason: impl Into<String>) -> Self {
        Self {
            code: CompileErrorCode::RepoUnsupportedOperation,
            message: reason.into(),
            field: None,
        }
    }

    pub fn code(&self) -> CompileErrorCode {
        self.code
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    pub fn is_field_unmapped(&self) -> bool {
        self.code == CompileErrorCode::RepoFieldUnmapped
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.severity(), self.code.code(), self.message)
    }
}

impl std::error::Error for CompileError {}

/// Result type for compiler operations
pub type CompileResult<T> = Result<T, CompileError>;
