//! External metadata providers queried by ISBN

pub mod google_books;
pub mod openlibrary;

use serde::de::DeserializeOwned;

use crate::domain::DomainError;

pub use google_books::GoogleBooksClient;
pub use openlibrary::OpenLibraryClient;

/// GET `url` and decode the JSON body. Transport failures, non-success
/// statuses and malformed payloads all surface as `DomainError::External`.
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    provider: &str,
    url: &str,
) -> Result<T, DomainError> {
    tracing::debug!("{} request: {}", provider, url);

    let resp = client
        .get(url)
        .send()
        .await
        .map_err(|e| DomainError::External(format!("{}: failed to send request: {}", provider, e)))?;

    if !resp.status().is_success() {
        return Err(DomainError::External(format!(
            "{} returned status: {}",
            provider,
            resp.status()
        )));
    }

    let body = resp.text().await.map_err(|e| {
        DomainError::External(format!("{}: failed to read response body: {}", provider, e))
    })?;

    serde_json::from_str(&body)
        .map_err(|e| DomainError::External(format!("{}: failed to parse JSON: {}", provider, e)))
}

/// Providers sometimes send empty strings where they mean "absent"
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
