use async_trait::async_trait;
use serde::Deserialize;

use super::{fetch_json, non_blank};
use crate::domain::{BookMetadata, DomainError, MetadataProvider};

pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com";

#[derive(Debug, Deserialize)]
struct GoogleBooksResponse {
    items: Option<Vec<GoogleBookItem>>,
}

#[derive(Debug, Deserialize)]
struct GoogleBookItem {
    #[serde(rename = "volumeInfo", default)]
    volume_info: GoogleVolumeInfo,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GoogleVolumeInfo {
    title: Option<String>,
    authors: Option<Vec<String>>,
    #[serde(rename = "imageLinks")]
    image_links: Option<GoogleImageLinks>,
    categories: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GoogleImageLinks {
    thumbnail: Option<String>,
    // smallThumbnail is also available but often too small
}

/// Google Books returns http links often, upgrade to https
pub fn upgrade_scheme(url: &str) -> String {
    match url.strip_prefix("http://") {
        Some(rest) => format!("https://{}", rest),
        None => url.to_string(),
    }
}

impl From<GoogleVolumeInfo> for BookMetadata {
    fn from(info: GoogleVolumeInfo) -> Self {
        BookMetadata {
            title: non_blank(info.title),
            author: non_blank(info.authors.and_then(|a| a.into_iter().next())),
            cover_url: non_blank(info.image_links.and_then(|l| l.thumbnail))
                .map(|thumb| upgrade_scheme(&thumb)),
            genre: info.categories.unwrap_or_default(),
        }
    }
}

/// Secondary provider: the Google Books volumes search
#[derive(Debug, Clone)]
pub struct GoogleBooksClient {
    client: reqwest::Client,
    base_url: String,
}

impl GoogleBooksClient {
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
        let url = format!(
            "{}/books/v1/volumes?q={}",
            self.base_url,
            urlencoding::encode(&format!("isbn:{}", isbn))
        );

        let parsed: GoogleBooksResponse = fetch_json(&self.client, self.name(), &url).await?;

        Ok(parsed
            .items
            .and_then(|items| items.into_iter().next())
            .map(|first| BookMetadata::from(first.volume_info)))
    }
}

impl Default for GoogleBooksClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[async_trait]
impl MetadataProvider for GoogleBooksClient {
    fn name(&self) -> &'static str {
        "Google Books"
    }

    async fn lookup(&self, isbn: &str) -> Result<Option<BookMetadata>, DomainError> {
        self.fetch_book_metadata(isbn).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insecure_thumbnails_are_upgraded() {
        assert_eq!(
            upgrade_scheme("http://books.google.com/books/content?id=1&zoom=1"),
            "https://books.google.com/books/content?id=1&zoom=1"
        );
    }

    #[test]
    fn secure_thumbnails_pass_through() {
        let url = "https://books.google.com/books/content?id=1";
        assert_eq!(upgrade_scheme(url), url);
    }

    #[test]
    fn only_the_leading_scheme_is_rewritten() {
        assert_eq!(
            upgrade_scheme("http://proxy.example/?u=http://x"),
            "https://proxy.example/?u=http://x"
        );
    }

    #[test]
    fn first_item_is_normalized() {
        let resp: GoogleBooksResponse = serde_json::from_value(serde_json::json!({
            "items": [
                {
                    "volumeInfo": {
                        "title": "Emma",
                        "authors": ["Jane Austen", "Editor"],
                        "imageLinks": { "thumbnail": "http://img/emma" },
                        "categories": ["Fiction"]
                    }
                },
                { "volumeInfo": { "title": "Other" } }
            ]
        }))
        .unwrap();

        let first = resp.items.unwrap().into_iter().next().unwrap();
        let meta = BookMetadata::from(first.volume_info);
        assert_eq!(meta.title.as_deref(), Some("Emma"));
        assert_eq!(meta.author.as_deref(), Some("Jane Austen"));
        assert_eq!(meta.cover_url.as_deref(), Some("https://img/emma"));
        assert_eq!(meta.genre, vec!["Fiction"]);
    }

    #[test]
    fn missing_categories_give_empty_genre() {
        let meta = BookMetadata::from(GoogleVolumeInfo::default());
        assert!(meta.genre.is_empty());
        assert_eq!(meta.cover_url, None);
    }
}
