use chrono::{Duration, Utc};
use sea_orm::*;
use uuid::Uuid;

use crate::models::book::{self, encode_genre};
use crate::models::ReadingStatus;

struct DemoBook {
    isbn: &'static str,
    title: &'static str,
    author: &'static str,
    genre: &'static [&'static str],
    status: ReadingStatus,
    rating: Option<i32>,
}

const DEMO_BOOKS: [DemoBook; 6] = [
    DemoBook {
        isbn: "9780441013593",
        title: "Dune",
        author: "Frank Herbert",
        genre: &["Science Fiction", "Classics"],
        status: ReadingStatus::Read,
        rating: Some(5),
    },
    DemoBook {
        isbn: "9780547928227",
        title: "The Hobbit",
        author: "J.R.R. Tolkien",
        genre: &["Fantasy", "Classics"],
        status: ReadingStatus::Unread,
        rating: None,
    },
    DemoBook {
        isbn: "9780307588371",
        title: "Gone Girl",
        author: "Gillian Flynn",
        genre: &["Thriller", "Mystery"],
        status: ReadingStatus::Unread,
        rating: None,
    },
    DemoBook {
        isbn: "9780141439587",
        title: "Emma",
        author: "Jane Austen",
        genre: &["Romance", "Classics"],
        status: ReadingStatus::Reading,
        rating: None,
    },
    DemoBook {
        isbn: "9780553293357",
        title: "Foundation",
        author: "Isaac Asimov",
        genre: &["Science Fiction"],
        status: ReadingStatus::Unread,
        rating: None,
    },
    DemoBook {
        isbn: "9780062316097",
        title: "Sapiens",
        author: "Yuval Noah Harari",
        genre: &["Non-Fiction", "History"],
        status: ReadingStatus::Unread,
        rating: None,
    },
];

/// Insert a small demo shelf. Does nothing when the library already has books.
pub async fn seed_demo_data(db: &DatabaseConnection) -> Result<(), DbErr> {
    if book::Entity::find().count(db).await? > 0 {
        tracing::info!("Library is not empty, skipping demo data");
        return Ok(());
    }

    let now = Utc::now();
    for (i, demo) in DEMO_BOOKS.iter().enumerate() {
        // Spread creation times so the newest-first order is stable
        let created = now - Duration::minutes((DEMO_BOOKS.len() - i) as i64);
        let genre: Vec<String> = demo.genre.iter().map(|g| g.to_string()).collect();

        book::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            isbn: Set(Some(demo.isbn.to_owned())),
            title: Set(Some(demo.title.to_owned())),
            author: Set(Some(demo.author.to_owned())),
            cover_url: Set(Some(format!(
                "https://covers.openlibrary.org/b/isbn/{}-L.jpg",
                demo.isbn
            ))),
            genre: Set(Some(encode_genre(&genre))),
            status: Set(demo.status.as_str().to_owned()),
            rating: Set(demo.rating),
            review: Set(None),
            borrowed_to: Set(None),
            borrowed_at: Set(None),
            returned_at: Set(None),
            created_at: Set(created),
            updated_at: Set(created),
        }
        .insert(db)
        .await?;
    }

    tracing::info!("Seeded {} demo books", DEMO_BOOKS.len());
    Ok(())
}
