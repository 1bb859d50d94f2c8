use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;

use super::{fetch_json, non_blank};
use crate::domain::{BookMetadata, DomainError, MetadataProvider};

pub const DEFAULT_BASE_URL: &str = "https://openlibrary.org";

/// Only the first few subjects are kept as genres
const MAX_SUBJECTS: usize = 5;

#[derive(Debug, Deserialize)]
struct OpenLibraryResponse {
    #[serde(flatten)]
    books: HashMap<String, OpenLibraryBook>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OpenLibraryBook {
    title: Option<String>,
    authors: Option<Vec<OpenLibraryNamed>>,
    cover: Option<OpenLibraryCover>,
    subjects: Option<Vec<OpenLibraryNamed>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OpenLibraryNamed {
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OpenLibraryCover {
    large: Option<String>,
    medium: Option<String>,
    small: Option<String>,
}

impl OpenLibraryCover {
    /// large > medium > small
    fn best(self) -> Option<String> {
        non_blank(self.large)
            .or_else(|| non_blank(self.medium))
            .or_else(|| non_blank(self.small))
    }
}

impl From<OpenLibraryBook> for BookMetadata {
    fn from(book: OpenLibraryBook) -> Self {
        let author = book
            .authors
            .and_then(|a| a.into_iter().next())
            .and_then(|a| non_blank(a.name));

        let genre = book
            .subjects
            .unwrap_or_default()
            .into_iter()
            .take(MAX_SUBJECTS)
            .filter_map(|s| non_blank(s.name))
            .collect();

        BookMetadata {
            title: non_blank(book.title),
            author,
            cover_url: book.cover.and_then(OpenLibraryCover::best),
            genre,
        }
    }
}

/// Primary provider: the Open Library books API (`jscmd=data`)
#[derive(Debug, Clone)]
pub struct OpenLibraryClient {
    client: reqwest::Client,
    base_url: String,
}

impl OpenLibraryClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn fetch_book_metadata(
        &self,
        isbn: &str,
    ) -> Result<Option<BookMetadata>, DomainError> {
        let key = format!("ISBN:{}", isbn);
        let url = format!(
            "{}/api/books?bibkeys={}&format=json&jscmd=data",
            self.base_url,
            urlencoding::encode(&key)
        );

        let mut parsed: OpenLibraryResponse = fetch_json(&self.client, self.name(), &url).await?;

        Ok(parsed.books.remove(&key).map(BookMetadata::from))
    }
}

impl Default for OpenLibraryClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[async_trait]
impl MetadataProvider for OpenLibraryClient {
    fn name(&self) -> &'static str {
        "Open Library"
    }

    async fn lookup(&self, isbn: &str) -> Result<Option<BookMetadata>, DomainError> {
        self.fetch_book_metadata(isbn).await
    }
}
