//! Repository trait definitions
//!
//! These traits define the contract for data access.
//! Implementations live in the infrastructure layer: a local SQLite store and
//! a hosted PostgREST backend. Every call is a single request/response and
//! either returns data or an error.

use async_trait::async_trait;

use super::DomainError;
use crate::models::{Book, BookPatch, Genre, NewBook, ReadingStatus};

/// Filter criteria for book queries
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BookFilter {
    pub status: Option<ReadingStatus>,
}

impl BookFilter {
    pub fn status(status: ReadingStatus) -> Self {
        Self {
            status: Some(status),
        }
    }
}

/// Repository trait for Book entity
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Find all books matching the filter, newest first
    async fn find_all(&self, filter: BookFilter) -> Result<Vec<Book>, DomainError>;

    /// Find a single book by ID
    async fn find_by_id(&self, id: &str) -> Result<Option<Book>, DomainError>;

    /// Existence check by ISBN, expects at most one match
    async fn find_by_isbn(&self, isbn: &str) -> Result<Option<Book>, DomainError>;

    /// Create a new book; id and timestamps are assigned by the backend
    async fn create(&self, book: NewBook) -> Result<Book, DomainError>;

    /// Apply a partial update to an existing book
    async fn update(&self, id: &str, patch: BookPatch) -> Result<Book, DomainError>;

    /// Delete a book by ID
    async fn delete(&self, id: &str) -> Result<(), DomainError>;

    /// Unread books tagged with at least one of `genres`
    async fn books_by_genre(&self, genres: &[String]) -> Result<Vec<Book>, DomainError>;

    /// Unread books tagged with none of `genres`
    async fn books_excluding_genre(&self, genres: &[String]) -> Result<Vec<Book>, DomainError>;
}

/// Repository trait for the genre lookup table
#[async_trait]
pub trait GenreRepository: Send + Sync {
    /// Find all genres ordered by name
    async fn find_all(&self) -> Result<Vec<Genre>, DomainError>;
}
