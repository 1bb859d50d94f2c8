use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "books")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub isbn: Option<String>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub cover_url: Option<String>,
    pub genre: Option<String>, // JSON array
    #[sea_orm(default_value = "unread")]
    pub status: String,
    pub rating: Option<i32>,
    pub review: Option<String>,
    pub borrowed_to: Option<String>,
    pub borrowed_at: Option<DateTimeUtc>,
    pub returned_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Where a book sits in the reader's lifecycle. Exactly one at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadingStatus {
    #[default]
    Unread,
    Reading,
    Read,
    Borrowed,
}

impl ReadingStatus {
    pub const ALL: [ReadingStatus; 4] = [
        ReadingStatus::Unread,
        ReadingStatus::Reading,
        ReadingStatus::Read,
        ReadingStatus::Borrowed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReadingStatus::Unread => "unread",
            ReadingStatus::Reading => "reading",
            ReadingStatus::Read => "read",
            ReadingStatus::Borrowed => "borrowed",
        }
    }
}

impl fmt::Display for ReadingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReadingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unread" => Ok(ReadingStatus::Unread),
            "reading" => Ok(ReadingStatus::Reading),
            "read" => Ok(ReadingStatus::Read),
            "borrowed" => Ok(ReadingStatus::Borrowed),
            other => Err(format!("Unknown reading status: {}", other)),
        }
    }
}

// DTO shared by the API, the services and both backends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: String,
    pub isbn: Option<String>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub cover_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub genre: Vec<String>,
    pub status: ReadingStatus,
    pub rating: Option<u8>,
    pub review: Option<String>,
    pub borrowed_to: Option<String>,
    pub borrowed_at: Option<DateTime<Utc>>,
    pub returned_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Book {
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("Untitled")
    }

    pub fn has_genre(&self, name: &str) -> bool {
        self.genre.iter().any(|g| g == name)
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

pub(crate) fn encode_genre(genre: &[String]) -> String {
    serde_json::to_string(genre).unwrap_or_else(|_| "[]".to_string())
}

impl From<Model> for Book {
    fn from(model: Model) -> Self {
        let genre: Vec<String> = model
            .genre
            .map(|s| serde_json::from_str(&s).unwrap_or_default())
            .unwrap_or_default();

        let status = model.status.parse().unwrap_or_else(|e| {
            tracing::warn!("Book {}: {}, treating as unread", model.id, e);
            ReadingStatus::Unread
        });

        Self {
            id: model.id,
            isbn: model.isbn,
            title: model.title,
            author: model.author,
            cover_url: model.cover_url,
            genre,
            status,
            rating: model.rating.and_then(|r| u8::try_from(r).ok()),
            review: model.review,
            borrowed_to: model.borrowed_to,
            borrowed_at: model.borrowed_at,
            returned_at: model.returned_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Input for inserting a book; the backend assigns id and timestamps
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewBook {
    pub isbn: Option<String>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub cover_url: Option<String>,
    #[serde(default)]
    pub genre: Vec<String>,
    #[serde(default)]
    pub status: ReadingStatus,
}

/// Partial update. `None` leaves a column alone, `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BookPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isbn: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ReadingStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<Option<u8>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub borrowed_to: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub borrowed_at: Option<Option<DateTime<Utc>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub returned_at: Option<Option<DateTime<Utc>>>,
}

impl BookPatch {
    /// Copy every field the patch carries onto an ActiveModel
    pub fn apply_to(self, active: &mut ActiveModel) {
        if let Some(isbn) = self.isbn {
            active.isbn = Set(isbn);
        }
        if let Some(title) = self.title {
            active.title = Set(title);
        }
        if let Some(author) = self.author {
            active.author = Set(author);
        }
        if let Some(cover_url) = self.cover_url {
            active.cover_url = Set(cover_url);
        }
        if let Some(genre) = self.genre {
            active.genre = Set(Some(encode_genre(&genre)));
        }
        if let Some(status) = self.status {
            active.status = Set(status.as_str().to_string());
        }
        if let Some(rating) = self.rating {
            active.rating = Set(rating.map(i32::from));
        }
        if let Some(review) = self.review {
            active.review = Set(review);
        }
        if let Some(borrowed_to) = self.borrowed_to {
            active.borrowed_to = Set(borrowed_to);
        }
        if let Some(borrowed_at) = self.borrowed_at {
            active.borrowed_at = Set(borrowed_at);
        }
        if let Some(returned_at) = self.returned_at {
            active.returned_at = Set(returned_at);
        }
    }
}
