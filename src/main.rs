use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bookwheel::infrastructure::{AppState, HostedClient};
use bookwheel::services::MetadataResolver;
use bookwheel::{config, db, seed, server};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bookwheel=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    dotenvy::dotenv().ok();

    // Check for --profile CLI argument
    let args: Vec<String> = std::env::args().collect();
    if let Some(pos) = args.iter().position(|arg| arg == "--profile")
        && let Some(val) = args.get(pos + 1)
    {
        unsafe { std::env::set_var("PROFILE", val) };
    }

    let config = config::Config::from_env();

    let resolver =
        MetadataResolver::with_base_urls(&config.openlibrary_base_url, &config.google_books_base_url);

    let state = match &config.hosted {
        Some(hosted) => {
            tracing::info!("Using hosted backend at {}", hosted.url);
            AppState::hosted(HostedClient::new(hosted), resolver)
        }
        None => {
            let db = db::init_db(&config.database_url)
                .await
                .expect("Failed to initialize database");

            if config.seed_demo {
                tracing::info!("Seeding demo data...");
                if let Err(e) = seed::seed_demo_data(&db).await {
                    tracing::error!("Failed to seed data: {}", e);
                } else {
                    tracing::info!("Demo data seeded successfully.");
                }
            }

            tracing::info!("Using local database {}", config.database_url);
            AppState::local(db, resolver)
        }
    };

    let app = server::build_router(state, &config.cors_allowed_origins);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Bookwheel server listening on {} (profile: {})", addr, config.profile);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
