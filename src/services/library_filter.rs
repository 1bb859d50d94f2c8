//! Library filtering shared by every view of the book list.
//! Pure functions over an already loaded collection.

use serde::{Deserialize, Serialize};

use crate::models::{Book, ReadingStatus};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(ReadingStatus),
}

impl From<Option<ReadingStatus>> for StatusFilter {
    fn from(status: Option<ReadingStatus>) -> Self {
        status.map_or(StatusFilter::All, StatusFilter::Only)
    }
}

/// Status filter first, then a case-insensitive search over title, author
/// and genres. An empty query matches everything.
pub fn filter_books(books: &[Book], status: StatusFilter, query: &str) -> Vec<Book> {
    let query = query.trim().to_lowercase();

    books
        .iter()
        .filter(|book| match status {
            StatusFilter::All => true,
            StatusFilter::Only(s) => book.status == s,
        })
        .filter(|book| query.is_empty() || matches_query(book, &query))
        .cloned()
        .collect()
}

fn matches_query(book: &Book, lower_query: &str) -> bool {
    let contains = |s: &str| s.to_lowercase().contains(lower_query);

    book.title.as_deref().is_some_and(contains)
        || book.author.as_deref().is_some_and(contains)
        || book.genre.iter().any(|g| contains(g.as_str()))
}

pub fn unread_books(books: &[Book]) -> Vec<Book> {
    filter_books(books, StatusFilter::Only(ReadingStatus::Unread), "")
}

/// Per-status counters shown above the list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryCounts {
    pub total: usize,
    pub unread: usize,
    pub reading: usize,
    pub read: usize,
    pub borrowed: usize,
}

impl LibraryCounts {
    pub fn from_books(books: &[Book]) -> Self {
        books.iter().fold(
            LibraryCounts {
                total: books.len(),
                ..Default::default()
            },
            |mut counts, book| {
                match book.status {
                    ReadingStatus::Unread => counts.unread += 1,
                    ReadingStatus::Reading => counts.reading += 1,
                    ReadingStatus::Read => counts.read += 1,
                    ReadingStatus::Borrowed => counts.borrowed += 1,
                }
                counts
            },
        )
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::book;
    use super::*;

    fn shelf() -> Vec<Book> {
        let mut dune = book("1", "Dune", ReadingStatus::Read, &["Science Fiction"]);
        dune.author = Some("Frank Herbert".to_string());
        vec![
            dune,
            book("2", "Gone Girl", ReadingStatus::Unread, &["Thriller", "Mystery"]),
            book("3", "Emma", ReadingStatus::Reading, &["Classics"]),
            book("4", "The Hobbit", ReadingStatus::Borrowed, &["Fantasy"]),
            book("5", "Rebecca", ReadingStatus::Unread, &["Mystery"]),
        ]
    }

    fn ids(books: &[Book]) -> Vec<&str> {
        books.iter().map(|b| b.id.as_str()).collect()
    }

    #[test]
    fn all_with_empty_query_keeps_everything() {
        assert_eq!(filter_books(&shelf(), StatusFilter::All, "").len(), 5);
    }

    #[test]
    fn status_filter_keeps_matching_books_in_order() {
        let unread = filter_books(&shelf(), StatusFilter::Only(ReadingStatus::Unread), "");
        assert_eq!(ids(&unread), vec!["2", "5"]);
    }

    #[test]
    fn query_searches_title_author_and_genre_case_insensitively() {
        let books = shelf();
        assert_eq!(ids(&filter_books(&books, StatusFilter::All, "HOBBIT")), vec!["4"]);
        assert_eq!(ids(&filter_books(&books, StatusFilter::All, "herbert")), vec!["1"]);
        assert_eq!(ids(&filter_books(&books, StatusFilter::All, "myst")), vec!["2", "5"]);
    }

    #[test]
    fn status_and_query_combine() {
        let found = filter_books(
            &shelf(),
            StatusFilter::Only(ReadingStatus::Unread),
            "rebecca",
        );
        assert_eq!(ids(&found), vec!["5"]);
    }

    #[test]
    fn counts_cover_every_status() {
        let counts = LibraryCounts::from_books(&shelf());
        assert_eq!(
            counts,
            LibraryCounts {
                total: 5,
                unread: 2,
                reading: 1,
                read: 1,
                borrowed: 1,
            }
        );
    }
}
