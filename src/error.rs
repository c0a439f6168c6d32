//! Error types for the Halldyll stack renderer.
//!
//! This module provides the error hierarchy for every stage of a stack's
//! lifecycle: document loading, template parsing, coercion, rendering and
//! validation.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the Halldyll stack renderer.
#[derive(Debug, Error)]
pub enum StackError {
    /// Configuration-related errors (files, documents, parameters).
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Template parsing and rendering errors.
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The stack or parameter file was not found.
    #[error("File not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// A document could not be parsed.
    #[error("Failed to parse document: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
        /// Optional source location.
        location: Option<String>,
    },

    /// A parameter name or value is unusable.
    #[error("Invalid parameter '{name}': {message}")]
    InvalidParameter {
        /// The offending parameter name (or raw input when no name could be read).
        name: String,
        /// Why it was rejected.
        message: String,
    },

    /// Validation failed.
    #[error("Stack validation failed: {message}")]
    ValidationError {
        /// Description of the validation error.
        message: String,
        /// Field that failed validation.
        field: Option<String>,
    },

    /// The stack carries no desired state to render.
    #[error("Stack '{stack}' has no spec")]
    MissingSpec {
        /// Name of the stack.
        stack: String,
    },
}

/// Errors raised while parsing or rendering a template value.
///
/// Every variant names the field it happened at. None of them is retryable:
/// they describe an invalid stack or an incomplete parameter set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// The placeholder syntax of a field is invalid.
    #[error("{path}: malformed template: {reason}")]
    MalformedTemplate {
        /// Field path of the offending value.
        path: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A placeholder references a parameter that was not supplied.
    #[error("{path}: unresolved parameter '{name}'")]
    UnresolvedParameter {
        /// The missing parameter name.
        name: String,
        /// Field path of the value that references it.
        path: String,
    },

    /// The literal or substituted text does not have the declared shape.
    #[error("{path}: expected {expected}, got '{actual}'")]
    TypeMismatch {
        /// Field path of the value.
        path: String,
        /// Human-readable description of the expected shape.
        expected: &'static str,
        /// The text that failed to coerce.
        actual: String,
    },

    /// A numeric value does not fit its target representation.
    #[error("{path}: '{value}' is out of range for {target}")]
    OutOfRange {
        /// Field path of the value.
        path: String,
        /// The text that overflowed.
        value: String,
        /// Name of the target type.
        target: &'static str,
    },
}

/// Placeholder syntax errors, before a field path is known.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// A `${` was never closed.
    #[error("unterminated placeholder starting at byte {offset}")]
    Unterminated {
        /// Byte offset of the opening `$`.
        offset: usize,
    },

    /// `${}` with nothing inside.
    #[error("empty placeholder name at byte {offset}")]
    EmptyName {
        /// Byte offset of the opening `$`.
        offset: usize,
    },

    /// The placeholder name contains a character outside `[A-Za-z0-9_.-]`.
    #[error("invalid placeholder name '{name}'")]
    InvalidName {
        /// The rejected name.
        name: String,
    },

    /// Literal text and placeholders were combined in a non-text field.
    #[error("placeholders cannot be combined with other text in a {target} field")]
    MixedNotAllowed {
        /// Name of the target type.
        target: &'static str,
    },
}

/// Coercion failures, before a field path is known.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoerceError {
    /// The text does not have the expected shape.
    #[error("expected {expected}, got '{actual}'")]
    Mismatch {
        /// Human-readable description of the expected shape.
        expected: &'static str,
        /// The text that failed to coerce.
        actual: String,
    },

    /// The value overflows the target type.
    #[error("'{value}' is out of range for {target}")]
    OutOfRange {
        /// The text that overflowed.
        value: String,
        /// Name of the target type.
        target: &'static str,
    },
}

/// Result type alias for Halldyll stack operations.
pub type Result<T> = std::result::Result<T, StackError>;

impl StackError {
    /// Creates a new internal error with the given message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Returns the field path the error points at, if any.
    #[must_use]
    pub fn field_path(&self) -> Option<&str> {
        match self {
            Self::Template(err) => Some(err.path()),
            Self::Config(ConfigError::ValidationError { field, .. }) => field.as_deref(),
            _ => None,
        }
    }
}

impl ConfigError {
    /// Creates a validation error for a specific field.
    #[must_use]
    pub fn validation(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Creates a parameter error.
    #[must_use]
    pub fn invalid_parameter(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            message: message.into(),
        }
    }
}

impl TemplateError {
    /// Returns the field path of the offending value.
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::MalformedTemplate { path, .. }
            | Self::UnresolvedParameter { path, .. }
            | Self::TypeMismatch { path, .. }
            | Self::OutOfRange { path, .. } => path,
        }
    }

    /// Creates a malformed-template error from a token error.
    #[must_use]
    pub fn malformed(path: impl Into<String>, reason: &TokenError) -> Self {
        Self::MalformedTemplate {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

impl CoerceError {
    /// Creates a shape mismatch error.
    #[must_use]
    pub fn mismatch(expected: &'static str, actual: impl Into<String>) -> Self {
        Self::Mismatch {
            expected,
            actual: actual.into(),
        }
    }

    /// Attaches a field path, turning this into a [`TemplateError`].
    #[must_use]
    pub fn at(self, path: impl Into<String>) -> TemplateError {
        let path = path.into();
        match self {
            Self::Mismatch { expected, actual } => TemplateError::TypeMismatch {
                path,
                expected,
                actual,
            },
            Self::OutOfRange { value, target } => TemplateError::OutOfRange {
                path,
                value,
                target,
            },
        }
    }
}
