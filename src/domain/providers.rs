//! Metadata provider contract
//!
//! A provider answers an ISBN lookup with a normalized record, `None` when it
//! has no match, or an error when the request or the payload failed.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::DomainError;

/// Book metadata normalized from any provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub cover_url: Option<String>,
    #[serde(default)]
    pub genre: Vec<String>,
}

#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Short provider name used in logs
    fn name(&self) -> &'static str;

    /// Look up an already normalized ISBN
    async fn lookup(&self, isbn: &str) -> Result<Option<BookMetadata>, DomainError>;
}
