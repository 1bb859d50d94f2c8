//! Domain error types
//!
//! These errors are framework-agnostic and represent business-level failures.
//! A lookup that finds nothing is not an error: resolvers return `Ok(None)`.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Resource not found (update/delete of an unknown id)
    NotFound,
    /// Validation error with message, raised before any request is sent
    Validation(String),
    /// ISBN already present in the library, carries the existing title
    Duplicate(String),
    /// Backend/persistence error
    Database(String),
    /// Metadata provider error (transport or malformed payload)
    External(String),
    /// Generic internal error
    Internal(String),
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainError::NotFound => write!(f, "Resource not found"),
            DomainError::Validation(msg) => write!(f, "Validation error: {}", msg),
            DomainError::Duplicate(title) => {
                write!(f, "\"{}\" is already in your library", title)
            }
            DomainError::Database(msg) => write!(f, "Database error: {}", msg),
            DomainError::External(msg) => write!(f, "External service error: {}", msg),
            DomainError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}

// Conversion from SeaORM errors (used in infrastructure layer)
impl From<sea_orm::DbErr> for DomainError {
    fn from(e: sea_orm::DbErr) -> Self {
        DomainError::Database(e.to_string())
    }
}

// Provider clients map their own failures; anything left over is a transport error.
impl From<reqwest::Error> for DomainError {
    fn from(e: reqwest::Error) -> Self {
        DomainError::External(e.to_string())
    }
}
