use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};
use uuid::Uuid;

pub const DEFAULT_GENRES: [&str; 14] = [
    "Fiction",
    "Non-Fiction",
    "Mystery",
    "Thriller",
    "Romance",
    "Science Fiction",
    "Fantasy",
    "Horror",
    "Biography",
    "History",
    "Self-Help",
    "Poetry",
    "Young Adult",
    "Classics",
];

pub async fn init_db(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(database_url).await?;

    // Run migrations manually (simple SQL)
    run_migrations(&db).await?;
    seed_genres(&db).await?;

    Ok(db)
}

async fn run_migrations(db: &DatabaseConnection) -> Result<(), DbErr> {
    // genre holds a JSON array of names, NULL when never set
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS books (
            id TEXT PRIMARY KEY NOT NULL,
            isbn TEXT,
            title TEXT,
            author TEXT,
            cover_url TEXT,
            genre TEXT,
            status TEXT NOT NULL DEFAULT 'unread',
            rating INTEGER,
            review TEXT,
            borrowed_to TEXT,
            borrowed_at TEXT,
            returned_at TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#
        .to_owned(),
    ))
    .await?;

    db.execute(Statement::from_string(
        db.get_database_backend(),
        "CREATE INDEX IF NOT EXISTS idx_books_isbn ON books (isbn)".to_owned(),
    ))
    .await?;

    db.execute(Statement::from_string(
        db.get_database_backend(),
        "CREATE INDEX IF NOT EXISTS idx_books_status ON books (status)".to_owned(),
    ))
    .await?;

    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS genres (
            id TEXT PRIMARY KEY NOT NULL,
            name TEXT NOT NULL UNIQUE
        )
        "#
        .to_owned(),
    ))
    .await?;

    Ok(())
}

async fn seed_genres(db: &DatabaseConnection) -> Result<(), DbErr> {
    for name in DEFAULT_GENRES {
        db.execute(Statement::from_sql_and_values(
            db.get_database_backend(),
            "INSERT INTO genres (id, name) VALUES (?, ?) ON CONFLICT(name) DO NOTHING",
            [Uuid::new_v4().to_string().into(), name.into()],
        ))
        .await?;
    }
    Ok(())
}
