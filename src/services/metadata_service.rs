//! Metadata Service - ISBN resolution across the metadata providers
//!
//! The primary provider is asked first; the secondary one is consulted only
//! when the primary has no match. Each provider is called at most once per
//! resolution and nothing is retried.

use std::sync::Arc;

use crate::domain::{BookMetadata, DomainError, MetadataProvider};
use crate::modules::integrations::{GoogleBooksClient, OpenLibraryClient};

/// Strip dashes and whitespace from a scanned or typed ISBN
pub fn normalize_isbn(raw: &str) -> String {
    raw.chars()
        .filter(|c| *c != '-' && !c.is_whitespace())
        .collect()
}

#[derive(Clone)]
pub struct MetadataResolver {
    primary: Arc<dyn MetadataProvider>,
    secondary: Arc<dyn MetadataProvider>,
}

impl MetadataResolver {
    pub fn new(primary: Arc<dyn MetadataProvider>, secondary: Arc<dyn MetadataProvider>) -> Self {
        Self { primary, secondary }
    }

    /// Open Library first, Google Books as the fallback
    pub fn with_base_urls(openlibrary_url: &str, google_books_url: &str) -> Self {
        Self::new(
            Arc::new(OpenLibraryClient::new(openlibrary_url)),
            Arc::new(GoogleBooksClient::new(google_books_url)),
        )
    }

    /// Resolve an ISBN in any formatting. `Ok(None)` means neither provider
    /// knows the book; an error means a provider could not be queried.
    pub async fn resolve(&self, isbn: &str) -> Result<Option<BookMetadata>, DomainError> {
        let isbn = normalize_isbn(isbn);
        if isbn.is_empty() {
            return Err(DomainError::Validation("Please enter an ISBN".to_string()));
        }

        if let Some(metadata) = self.primary.lookup(&isbn).await? {
            tracing::info!("Resolved ISBN {} via {}", isbn, self.primary.name());
            return Ok(Some(metadata));
        }

        tracing::debug!(
            "{} has no match for ISBN {}, trying {}",
            self.primary.name(),
            isbn,
            self.secondary.name()
        );

        let found = self.secondary.lookup(&isbn).await?;
        match &found {
            Some(_) => tracing::info!("Resolved ISBN {} via {}", isbn, self.secondary.name()),
            None => tracing::info!("No provider knows ISBN {}", isbn),
        }
        Ok(found)
    }
}
