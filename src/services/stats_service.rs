//! Reading statistics, achievements and challenges.
//!
//! Everything here is computed from the full book list and a reference
//! "now"; nothing is stored except the challenge targets.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::domain::DomainError;
use crate::models::{Book, ReadingStatus};

const MONTHS_SHOWN: u32 = 6;
const TOP_GENRES: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LibraryStats {
    pub total: usize,
    pub read: usize,
    pub reading: usize,
    pub tbr: usize,
    pub avg_rating: f64,
    pub current_streak: u32,
    pub longest_streak: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyReads {
    pub month: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenreCount {
    pub genre: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Achievement {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub unlocked: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeKind {
    Yearly,
    Monthly,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Challenge {
    pub kind: ChallengeKind,
    pub title: String,
    pub target: u32,
    pub current: usize,
    pub complete: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChallengeTargets {
    pub yearly: u32,
    pub monthly: u32,
}

impl Default for ChallengeTargets {
    fn default() -> Self {
        Self {
            yearly: 24,
            monthly: 2,
        }
    }
}

impl ChallengeTargets {
    pub fn set_target(&mut self, kind: ChallengeKind, target: i64) -> Result<(), DomainError> {
        let target = u32::try_from(target)
            .ok()
            .filter(|t| *t > 0)
            .ok_or_else(|| DomainError::Validation("Please enter a valid number".to_string()))?;

        match kind {
            ChallengeKind::Yearly => self.yearly = target,
            ChallengeKind::Monthly => self.monthly = target,
        }
        Ok(())
    }
}

/// Everything the stats screen shows, in one payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsReport {
    pub stats: LibraryStats,
    pub monthly: Vec<MonthlyReads>,
    pub top_genres: Vec<GenreCount>,
    pub achievements: Vec<Achievement>,
    pub challenges: Vec<Challenge>,
}

pub fn report(books: &[Book], targets: ChallengeTargets, now: DateTime<Utc>) -> StatsReport {
    StatsReport {
        stats: library_stats(books, now),
        monthly: monthly_reads(books, now),
        top_genres: top_genres(books),
        achievements: achievements(books),
        challenges: challenges(books, targets, now),
    }
}

fn read_books(books: &[Book]) -> impl Iterator<Item = &Book> {
    books.iter().filter(|b| b.status == ReadingStatus::Read)
}

fn count_status(books: &[Book], status: ReadingStatus) -> usize {
    books.iter().filter(|b| b.status == status).count()
}

pub fn library_stats(books: &[Book], now: DateTime<Utc>) -> LibraryStats {
    let ratings: Vec<u8> = read_books(books).filter_map(|b| b.rating).collect();
    let avg_rating = if ratings.is_empty() {
        0.0
    } else {
        let mean = ratings.iter().map(|r| f64::from(*r)).sum::<f64>() / ratings.len() as f64;
        (mean * 10.0).round() / 10.0
    };

    let (current_streak, longest_streak) = streaks(books, now.date_naive());

    LibraryStats {
        total: books.len(),
        read: count_status(books, ReadingStatus::Read),
        reading: count_status(books, ReadingStatus::Reading),
        tbr: count_status(books, ReadingStatus::Unread),
        avg_rating,
        current_streak,
        longest_streak,
    }
}

/// Activity days are days on which any book was created or updated.
/// The current streak must end today or yesterday.
fn streaks(books: &[Book], today: NaiveDate) -> (u32, u32) {
    let days: BTreeSet<NaiveDate> = books
        .iter()
        .flat_map(|b| [b.created_at.date_naive(), b.updated_at.date_naive()])
        .collect();

    let mut longest: u32 = 0;
    let mut run: u32 = 0;
    let mut previous: Option<NaiveDate> = None;
    for day in &days {
        run = match previous {
            Some(prev) if *day - prev == Duration::days(1) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(*day);
    }

    let yesterday = today - Duration::days(1);
    let mut cursor = if days.contains(&today) {
        today
    } else if days.contains(&yesterday) {
        yesterday
    } else {
        return (0, longest);
    };

    let mut current: u32 = 0;
    while days.contains(&cursor) {
        current += 1;
        cursor -= Duration::days(1);
    }

    (current, longest.max(current))
}

fn months_back(now: DateTime<Utc>, back: u32) -> (i32, u32) {
    let index = now.year() * 12 + now.month0() as i32 - back as i32;
    (index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
}

/// Read books per month for the last six months, oldest first
pub fn monthly_reads(books: &[Book], now: DateTime<Utc>) -> Vec<MonthlyReads> {
    (0..MONTHS_SHOWN)
        .rev()
        .filter_map(|back| {
            let (year, month) = months_back(now, back);
            let first = NaiveDate::from_ymd_opt(year, month, 1)?;
            let count = read_books(books)
                .filter(|b| b.updated_at.year() == year && b.updated_at.month() == month)
                .count();
            Some(MonthlyReads {
                month: first.format("%b %y").to_string(),
                count,
            })
        })
        .collect()
}

pub fn top_genres(books: &[Book]) -> Vec<GenreCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for genre in read_books(books).flat_map(|b| b.genre.iter()) {
        *counts.entry(genre.as_str()).or_default() += 1;
    }

    let mut genres: Vec<GenreCount> = counts
        .into_iter()
        .map(|(genre, count)| GenreCount {
            genre: genre.to_string(),
            count,
        })
        .collect();
    genres.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.genre.cmp(&b.genre)));
    genres.truncate(TOP_GENRES);
    genres
}

pub fn achievements(books: &[Book]) -> Vec<Achievement> {
    let read = read_books(books).count();
    let genres: BTreeSet<&str> = read_books(books)
        .flat_map(|b| b.genre.iter().map(String::as_str))
        .collect();

    let achievement = |id, title, description, unlocked| Achievement {
        id,
        title,
        description,
        unlocked,
    };

    vec![
        achievement("first_book", "First Book", "Added your first book", !books.is_empty()),
        achievement("ten_books", "Growing Library", "Read 10 books", read >= 10),
        achievement(
            "first_review",
            "Reviewer",
            "Wrote your first review",
            books.iter().any(|b| b.review.as_deref().is_some_and(|r| !r.is_empty())),
        ),
        achievement(
            "five_star",
            "Perfect Read",
            "Gave a book 5 stars",
            books.iter().any(|b| b.rating == Some(5)),
        ),
        achievement(
            "genre_explorer",
            "Genre Explorer",
            "Read from 5 different genres",
            genres.len() >= 5,
        ),
        achievement("speed_reader", "Speed Reader", "Read 25 books", read >= 25),
        achievement("dedicated_reader", "Dedicated Reader", "Read 50 books", read >= 50),
        achievement("bookworm", "Bookworm", "Read 100 books", read >= 100),
    ]
}

pub fn challenges(books: &[Book], targets: ChallengeTargets, now: DateTime<Utc>) -> Vec<Challenge> {
    let this_year = read_books(books)
        .filter(|b| b.updated_at.year() == now.year())
        .count();
    let this_month = read_books(books)
        .filter(|b| b.updated_at.year() == now.year() && b.updated_at.month() == now.month())
        .count();

    vec![
        Challenge {
            kind: ChallengeKind::Yearly,
            title: format!("{} Reading Goal", now.year()),
            target: targets.yearly,
            current: this_year,
            complete: this_year >= targets.yearly as usize,
        },
        Challenge {
            kind: ChallengeKind::Monthly,
            title: format!("{} Challenge", now.format("%B")),
            target: targets.monthly,
            current: this_month,
            complete: this_month >= targets.monthly as usize,
        },
    ]
}
