//! Book Service - Pure business logic without HTTP layer
//!
//! Scan and manual-entry flows, status/rating/borrow transitions, detail
//! edits and deletion. Validation happens here before any request is sent;
//! callers re-fetch the full list after a mutation instead of merging.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;

use super::feedback::{Feedback, HapticStyle, SoundCue};
use super::metadata_service::{MetadataResolver, normalize_isbn};
use crate::domain::{BookFilter, BookMetadata, BookRepository, DomainError};
use crate::models::{Book, BookPatch, NewBook, ReadingStatus};

const TITLE_AUTHOR_REQUIRED: &str = "Title and Author are required";

/// Metadata found for a scanned ISBN, waiting for the user to confirm
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScannedBook {
    pub isbn: String,
    #[serde(flatten)]
    pub metadata: BookMetadata,
}

/// Manual entry form
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ManualEntry {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    pub isbn: Option<String>,
    pub cover_url: Option<String>,
    #[serde(default)]
    pub genre: Vec<String>,
}

/// Detail edit form. Title and author are always required; an absent
/// optional field keeps the stored value, `null` clears it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DetailsUpdate {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default, deserialize_with = "present")]
    pub isbn: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub cover_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub genre: Option<Option<Vec<String>>>,
}

/// Status form. Absent rating/review leave the stored values alone,
/// `null` clears them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusUpdate {
    pub status: ReadingStatus,
    #[serde(default, deserialize_with = "present")]
    pub rating: Option<Option<u8>>,
    #[serde(default, deserialize_with = "present")]
    pub review: Option<Option<String>>,
    pub borrowed_to: Option<String>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusChange {
    pub book: Book,
    /// Moved into "reading"
    pub started: bool,
    /// Marked "read" for the first time
    pub finished: bool,
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn clean_isbn(value: Option<String>) -> Option<String> {
    value.map(|v| normalize_isbn(&v)).filter(|v| !v.is_empty())
}

fn required(title: &str, author: &str) -> Result<(String, String), DomainError> {
    let (title, author) = (title.trim(), author.trim());
    if title.is_empty() || author.is_empty() {
        return Err(DomainError::Validation(TITLE_AUTHOR_REQUIRED.to_string()));
    }
    Ok((title.to_string(), author.to_string()))
}

/// Compute the patch for a status form submission.
///
/// Entering "borrowed" records the borrower and the time; leaving it clears
/// both and stamps `returned_at`. Rating and review are only touched when
/// the form carries them.
pub fn status_patch(
    book: &Book,
    update: &StatusUpdate,
    now: DateTime<Utc>,
) -> Result<BookPatch, DomainError> {
    let mut patch = BookPatch {
        status: Some(update.status),
        ..Default::default()
    };

    if let Some(rating) = update.rating {
        if let Some(r) = rating
            && !(1..=5).contains(&r)
        {
            return Err(DomainError::Validation(
                "Rating must be between 1 and 5".to_string(),
            ));
        }
        patch.rating = Some(rating);
    }

    if let Some(review) = &update.review {
        patch.review = Some(clean(review.clone()));
    }

    let was_borrowed = book.status == ReadingStatus::Borrowed;
    let borrower = clean(update.borrowed_to.clone());

    match (was_borrowed, update.status == ReadingStatus::Borrowed) {
        (false, true) => {
            let Some(name) = borrower else {
                return Err(DomainError::Validation(
                    "Borrower name is required".to_string(),
                ));
            };
            patch.borrowed_to = Some(Some(name));
            patch.borrowed_at = Some(Some(now));
        }
        (true, true) => {
            if let Some(name) = borrower {
                patch.borrowed_to = Some(Some(name));
            }
        }
        (true, false) => {
            patch.borrowed_to = Some(None);
            patch.borrowed_at = Some(None);
            patch.returned_at = Some(Some(now));
        }
        (false, false) => {}
    }

    Ok(patch)
}

pub fn details_patch(update: DetailsUpdate) -> Result<BookPatch, DomainError> {
    let (title, author) = required(&update.title, &update.author)?;

    Ok(BookPatch {
        title: Some(Some(title)),
        author: Some(Some(author)),
        cover_url: update.cover_url.map(clean),
        isbn: update.isbn.map(clean_isbn),
        genre: update.genre.map(Option::unwrap_or_default),
        ..Default::default()
    })
}

#[derive(Clone)]
pub struct BookService {
    books: Arc<dyn BookRepository>,
    resolver: MetadataResolver,
    feedback: Arc<dyn Feedback>,
}

impl BookService {
    pub fn new(
        books: Arc<dyn BookRepository>,
        resolver: MetadataResolver,
        feedback: Arc<dyn Feedback>,
    ) -> Self {
        Self {
            books,
            resolver,
            feedback,
        }
    }

    /// The full list, newest first. Always replaces what the caller holds.
    pub async fn refresh(&self, filter: BookFilter) -> Result<Vec<Book>, DomainError> {
        let books = self.books.find_all(filter).await?;
        tracing::info!("Loaded {} books (status={:?})", books.len(), filter.status);
        Ok(books)
    }

    /// Duplicate check, then metadata resolution. `Ok(None)` when no
    /// provider knows the ISBN.
    pub async fn lookup_isbn(&self, raw_isbn: &str) -> Result<Option<ScannedBook>, DomainError> {
        let isbn = normalize_isbn(raw_isbn);
        if isbn.is_empty() {
            return Err(DomainError::Validation("Please enter an ISBN".to_string()));
        }

        self.feedback.play(SoundCue::Scan);
        self.ensure_new_isbn(&isbn).await?;

        let found = self.resolver.resolve(&isbn).await?;
        Ok(found.map(|metadata| ScannedBook { isbn, metadata }))
    }

    /// Save a confirmed scan as an unread book; the ISBN is re-checked
    pub async fn add_scanned(&self, scanned: ScannedBook) -> Result<Book, DomainError> {
        let isbn = normalize_isbn(&scanned.isbn);
        if isbn.is_empty() {
            return Err(DomainError::Validation("Please enter an ISBN".to_string()));
        }
        self.ensure_new_isbn(&isbn).await?;

        self.save_scanned(ScannedBook { isbn, ..scanned }).await
    }

    pub async fn scan_and_add(&self, raw_isbn: &str) -> Result<Option<Book>, DomainError> {
        match self.lookup_isbn(raw_isbn).await? {
            Some(scanned) => self.save_scanned(scanned).await.map(Some),
            None => Ok(None),
        }
    }

    pub async fn add_manual(&self, entry: ManualEntry) -> Result<Book, DomainError> {
        let (title, author) = required(&entry.title, &entry.author)?;
        let isbn = clean_isbn(entry.isbn);
        if let Some(isbn) = &isbn {
            self.ensure_new_isbn(isbn).await?;
        }

        self.insert(NewBook {
            isbn,
            title: Some(title),
            author: Some(author),
            cover_url: clean(entry.cover_url),
            genre: entry.genre,
            status: ReadingStatus::Unread,
        })
        .await
    }

    pub async fn update_progress(
        &self,
        id: &str,
        update: StatusUpdate,
    ) -> Result<StatusChange, DomainError> {
        let current = self
            .books
            .find_by_id(id)
            .await?
            .ok_or(DomainError::NotFound)?;

        let patch = status_patch(&current, &update, Utc::now())?;
        let book = self.books.update(id, patch).await?;

        self.feedback.haptic(HapticStyle::Success);
        tracing::info!("Book {} moved {} -> {}", id, current.status, book.status);

        Ok(StatusChange {
            started: current.status != ReadingStatus::Reading
                && book.status == ReadingStatus::Reading,
            finished: current.status != ReadingStatus::Read && book.status == ReadingStatus::Read,
            book,
        })
    }

    pub async fn update_details(&self, id: &str, update: DetailsUpdate) -> Result<Book, DomainError> {
        let patch = details_patch(update)?;
        let book = self.books.update(id, patch).await?;
        self.feedback.haptic(HapticStyle::Success);
        Ok(book)
    }

    /// Irreversible
    pub async fn delete_book(&self, id: &str) -> Result<(), DomainError> {
        self.books.delete(id).await?;
        self.feedback.haptic(HapticStyle::Success);
        tracing::info!("Deleted book {}", id);
        Ok(())
    }

    async fn ensure_new_isbn(&self, isbn: &str) -> Result<(), DomainError> {
        match self.books.find_by_isbn(isbn).await? {
            Some(existing) => Err(DomainError::Duplicate(existing.display_title().to_string())),
            None => Ok(()),
        }
    }

    async fn save_scanned(&self, scanned: ScannedBook) -> Result<Book, DomainError> {
        let ScannedBook { isbn, metadata } = scanned;
        self.insert(NewBook {
            isbn: Some(isbn),
            title: metadata.title,
            author: metadata.author,
            cover_url: metadata.cover_url,
            genre: metadata.genre,
            status: ReadingStatus::Unread,
        })
        .await
    }

    async fn insert(&self, book: NewBook) -> Result<Book, DomainError> {
        let created = self.books.create(book).await?;
        self.feedback.haptic(HapticStyle::Success);
        tracing::info!("Added \"{}\" ({})", created.display_title(), created.id);
        Ok(created)
    }
}
