//! Error types for Hangar core.

use std::{error::Error, fmt};

/// Error type for ship registry operations.
#[derive(Debug, Clone, PartialEq)]
pub enum HangarError {
    /// A field or identifier is outside its accepted range.
    Validation(String),
    /// No ship is stored under the identifier.
    NotFound(i64),
    /// The backing store failed.
    Store(String),
}

impl HangarError {
    /// Build a validation error for a named field.
    pub fn invalid_field(field: &str) -> Self {
        Self::Validation(format!("invalid {field}"))
    }
}

impl fmt::Display for HangarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(message) => write!(f, "validation failed: {message}"),
            Self::NotFound(id) => write!(f, "ship {id} not found"),
            Self::Store(message) => write!(f, "store error: {message}"),
        }
    }
}

impl Error for HangarError {}

/// Convenience result type for Hangar core.
pub type Result<T> = std::result::Result<T, HangarError>;
