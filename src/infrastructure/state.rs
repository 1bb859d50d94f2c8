//! Application state containing repositories and shared resources

use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::{BookRepository, GenreRepository};
use crate::infrastructure::{
    HostedBookRepository, HostedClient, HostedGenreRepository, SeaOrmBookRepository,
    SeaOrmGenreRepository,
};
use crate::services::{
    BookService, ChallengeTargets, Feedback, MetadataResolver, OperationGuards, TracingFeedback,
    Wheel,
};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Book repository (local or hosted)
    pub book_repo: Arc<dyn BookRepository>,
    /// Genre lookup table
    pub genre_repo: Arc<dyn GenreRepository>,
    /// Scan, entry and status flows
    pub books: BookService,
    /// The selection session
    pub wheel: Arc<Wheel>,
    pub feedback: Arc<dyn Feedback>,
    pub guards: OperationGuards,
    pub targets: Arc<RwLock<ChallengeTargets>>,
}

impl AppState {
    pub fn new(
        book_repo: Arc<dyn BookRepository>,
        genre_repo: Arc<dyn GenreRepository>,
        resolver: MetadataResolver,
        feedback: Arc<dyn Feedback>,
    ) -> Self {
        let books = BookService::new(book_repo.clone(), resolver, feedback.clone());

        Self {
            book_repo,
            genre_repo,
            books,
            wheel: Arc::new(Wheel::new()),
            feedback,
            guards: OperationGuards::default(),
            targets: Arc::new(RwLock::new(ChallengeTargets::default())),
        }
    }

    /// SQLite-backed state
    pub fn local(db: DatabaseConnection, resolver: MetadataResolver) -> Self {
        Self::new(
            Arc::new(SeaOrmBookRepository::new(db.clone())),
            Arc::new(SeaOrmGenreRepository::new(db)),
            resolver,
            Arc::new(TracingFeedback),
        )
    }

    /// State backed by a hosted PostgREST endpoint
    pub fn hosted(api: HostedClient, resolver: MetadataResolver) -> Self {
        Self::new(
            Arc::new(HostedBookRepository::new(api.clone())),
            Arc::new(HostedGenreRepository::new(api)),
            resolver,
            Arc::new(TracingFeedback),
        )
    }
}
