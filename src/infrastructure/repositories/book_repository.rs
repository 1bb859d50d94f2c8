//! SeaORM implementation of BookRepository

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, Statement,
};
use uuid::Uuid;

use crate::domain::{BookFilter, BookRepository, DomainError};
use crate::models::book::{ActiveModel, Column, Entity as BookEntity, encode_genre};
use crate::models::{Book, BookPatch, NewBook};

// Unread books with at least one genre in the JSON array bound to `?`
const BY_GENRE_SQL: &str = r#"
    SELECT * FROM books
    WHERE status = 'unread'
      AND EXISTS (
        SELECT 1 FROM json_each(COALESCE(books.genre, '[]')) AS g
        WHERE g.value IN (SELECT value FROM json_each(?))
      )
    ORDER BY created_at DESC
"#;

// Unread books with no genre in the set, untagged books included
const EXCLUDING_GENRE_SQL: &str = r#"
    SELECT * FROM books
    WHERE status = 'unread'
      AND NOT EXISTS (
        SELECT 1 FROM json_each(COALESCE(books.genre, '[]')) AS g
        WHERE g.value IN (SELECT value FROM json_each(?))
      )
    ORDER BY created_at DESC
"#;

/// SeaORM-based implementation of BookRepository
pub struct SeaOrmBookRepository {
    db: DatabaseConnection,
}

impl SeaOrmBookRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn genre_query(&self, sql: &str, genres: &[String]) -> Result<Vec<Book>, DomainError> {
        let stmt = Statement::from_sql_and_values(
            self.db.get_database_backend(),
            sql,
            [encode_genre(genres).into()],
        );
        let models = BookEntity::find().from_raw_sql(stmt).all(&self.db).await?;
        Ok(models.into_iter().map(Book::from).collect())
    }
}

#[async_trait]
impl BookRepository for SeaOrmBookRepository {
    async fn find_all(&self, filter: BookFilter) -> Result<Vec<Book>, DomainError> {
        let mut query = BookEntity::find();

        if let Some(status) = filter.status {
            query = query.filter(Column::Status.eq(status.as_str()));
        }

        let books = query
            .order_by_desc(Column::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(books.into_iter().map(Book::from).collect())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Book>, DomainError> {
        let model = BookEntity::find_by_id(id.to_string()).one(&self.db).await?;
        Ok(model.map(Book::from))
    }

    async fn find_by_isbn(&self, isbn: &str) -> Result<Option<Book>, DomainError> {
        let model = BookEntity::find()
            .filter(Column::Isbn.eq(isbn))
            .one(&self.db)
            .await?;
        Ok(model.map(Book::from))
    }

    async fn create(&self, book: NewBook) -> Result<Book, DomainError> {
        let now = chrono::Utc::now();

        let new_book = ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            isbn: Set(book.isbn),
            title: Set(book.title),
            author: Set(book.author),
            cover_url: Set(book.cover_url),
            genre: Set(Some(encode_genre(&book.genre))),
            status: Set(book.status.as_str().to_string()),
            rating: Set(None),
            review: Set(None),
            borrowed_to: Set(None),
            borrowed_at: Set(None),
            returned_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let result = new_book.insert(&self.db).await?;
        Ok(Book::from(result))
    }

    async fn update(&self, id: &str, patch: BookPatch) -> Result<Book, DomainError> {
        let existing = BookEntity::find_by_id(id.to_string())
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound)?;

        let mut active: ActiveModel = existing.into();
        patch.apply_to(&mut active);
        active.updated_at = Set(chrono::Utc::now());

        let result = active.update(&self.db).await?;
        Ok(Book::from(result))
    }

    async fn delete(&self, id: &str) -> Result<(), DomainError> {
        let result = BookEntity::delete_by_id(id.to_string())
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(DomainError::NotFound);
        }
        Ok(())
    }

    async fn books_by_genre(&self, genres: &[String]) -> Result<Vec<Book>, DomainError> {
        self.genre_query(BY_GENRE_SQL, genres).await
    }

    async fn books_excluding_genre(&self, genres: &[String]) -> Result<Vec<Book>, DomainError> {
        self.genre_query(EXCLUDING_GENRE_SQL, genres).await
    }
}

