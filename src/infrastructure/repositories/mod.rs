//! Repository implementations: SeaORM (local SQLite) and hosted PostgREST

pub mod book_repository;
pub mod genre_repository;
pub mod hosted;

pub use book_repository::SeaOrmBookRepository;
pub use genre_repository::SeaOrmGenreRepository;
pub use hosted::{HostedBookRepository, HostedClient, HostedGenreRepository};
