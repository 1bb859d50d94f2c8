//! Repositories backed by a hosted PostgREST endpoint (e.g. Supabase)
//!
//! Same contract as the SQLite repositories. Each call is one HTTP round
//! trip; the genre filters are the server-side procedures
//! `get_books_by_genre` and `get_books_excluding_genre`.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::domain::{BookFilter, BookRepository, DomainError, GenreRepository};
use crate::infrastructure::config::HostedConfig;
use crate::models::{Book, BookPatch, Genre, NewBook};

#[derive(Clone)]
pub struct HostedClient {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl HostedClient {
    pub fn new(config: &HostedConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(client: reqwest::Client, config: &HostedConfig) -> Self {
        Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
        }
    }

    fn request(&self, method: Method, path_and_query: &str) -> RequestBuilder {
        let url = format!("{}/rest/v1/{}", self.base_url, path_and_query);
        tracing::debug!("Hosted backend: {} {}", method, url);

        self.client
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, DomainError> {
        let resp = request
            .send()
            .await
            .map_err(|e| DomainError::Database(format!("Hosted backend unreachable: {}", e)))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| DomainError::Database(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            return Err(DomainError::Database(format!(
                "Hosted backend returned status {}: {}",
                status, body
            )));
        }

        serde_json::from_str(&body)
            .map_err(|e| DomainError::Database(format!("Failed to parse hosted response: {}", e)))
    }

    /// Writes ask for the affected rows back
    async fn send_returning(&self, request: RequestBuilder) -> Result<Vec<Book>, DomainError> {
        self.send(request.header("Prefer", "return=representation"))
            .await
    }
}

fn eq(value: &str) -> String {
    format!("eq.{}", urlencoding::encode(value))
}

pub struct HostedBookRepository {
    api: HostedClient,
}

impl HostedBookRepository {
    pub fn new(api: HostedClient) -> Self {
        Self { api }
    }

    async fn rpc(&self, procedure: &str, genres: &[String]) -> Result<Vec<Book>, DomainError> {
        let request = self
            .api
            .request(Method::POST, &format!("rpc/{}", procedure))
            .json(&json!({ "selected_genres": genres }));
        self.api.send(request).await
    }
}

#[async_trait]
impl BookRepository for HostedBookRepository {
    async fn find_all(&self, filter: BookFilter) -> Result<Vec<Book>, DomainError> {
        let mut query = "books?select=*&order=created_at.desc".to_string();
        if let Some(status) = filter.status {
            query.push_str(&format!("&status={}", eq(status.as_str())));
        }
        self.api.send(self.api.request(Method::GET, &query)).await
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Book>, DomainError> {
        let query = format!("books?select=*&id={}", eq(id));
        let books: Vec<Book> = self.api.send(self.api.request(Method::GET, &query)).await?;
        Ok(books.into_iter().next())
    }

    async fn find_by_isbn(&self, isbn: &str) -> Result<Option<Book>, DomainError> {
        let query = format!("books?select=*&isbn={}&limit=1", eq(isbn));
        let books: Vec<Book> = self.api.send(self.api.request(Method::GET, &query)).await?;
        Ok(books.into_iter().next())
    }

    async fn create(&self, book: NewBook) -> Result<Book, DomainError> {
        let request = self.api.request(Method::POST, "books").json(&book);
        self.api
            .send_returning(request)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::Internal("Insert returned no row".to_string()))
    }

    async fn update(&self, id: &str, patch: BookPatch) -> Result<Book, DomainError> {
        let mut body = serde_json::to_value(&patch)
            .map_err(|e| DomainError::Internal(format!("Failed to encode update: {}", e)))?;
        if let Value::Object(fields) = &mut body {
            fields.insert("updated_at".to_string(), json!(chrono::Utc::now()));
        }

        let request = self
            .api
            .request(Method::PATCH, &format!("books?id={}", eq(id)))
            .json(&body);
        self.api
            .send_returning(request)
            .await?
            .into_iter()
            .next()
            .ok_or(DomainError::NotFound)
    }

    async fn delete(&self, id: &str) -> Result<(), DomainError> {
        let request = self
            .api
            .request(Method::DELETE, &format!("books?id={}", eq(id)));
        let deleted = self.api.send_returning(request).await?;
        if deleted.is_empty() {
            return Err(DomainError::NotFound);
        }
        Ok(())
    }

    async fn books_by_genre(&self, genres: &[String]) -> Result<Vec<Book>, DomainError> {
        self.rpc("get_books_by_genre", genres).await
    }

    async fn books_excluding_genre(&self, genres: &[String]) -> Result<Vec<Book>, DomainError> {
        self.rpc("get_books_excluding_genre", genres).await
    }
}

pub struct HostedGenreRepository {
    api: HostedClient,
}

impl HostedGenreRepository {
    pub fn new(api: HostedClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl GenreRepository for HostedGenreRepository {
    async fn find_all(&self) -> Result<Vec<Genre>, DomainError> {
        self.api
            .send(self.api.request(Method::GET, "genres?select=*&order=name.asc"))
            .await
    }
}
