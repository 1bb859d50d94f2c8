use std::env;

use crate::modules::integrations::{google_books, openlibrary};

/// Credentials for the hosted PostgREST backend
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostedConfig {
    pub url: String,
    pub anon_key: String,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub profile: String,
    pub hosted: Option<HostedConfig>,
    pub openlibrary_base_url: String,
    pub google_books_base_url: String,
    pub seed_demo: bool,
}

impl Config {
    pub fn from_env() -> Self {
        let profile = env::var("PROFILE").unwrap_or_else(|_| "default".to_string());

        let database_url = env::var("DATABASE_URL").unwrap_or_else(|_| {
            if profile == "default" {
                "sqlite://bookwheel.db?mode=rwc".to_string()
            } else {
                format!("sqlite://bookwheel_{}.db?mode=rwc", profile)
            }
        });

        let hosted = match (env::var("SUPABASE_URL"), env::var("SUPABASE_ANON_KEY")) {
            (Ok(url), Ok(anon_key)) if !url.trim().is_empty() && !anon_key.trim().is_empty() => {
                Some(HostedConfig {
                    url: url.trim().trim_end_matches('/').to_string(),
                    anon_key: anon_key.trim().to_string(),
                })
            }
            _ => None,
        };

        Self {
            database_url,
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .ok()
                .map(|s| {
                    s.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            profile,
            hosted,
            openlibrary_base_url: base_url("OPENLIBRARY_BASE_URL", openlibrary::DEFAULT_BASE_URL),
            google_books_base_url: base_url("GOOGLE_BOOKS_BASE_URL", google_books::DEFAULT_BASE_URL),
            seed_demo: env::var("SEED_DEMO").is_ok(),
        }
    }
}

fn base_url(key: &str, default: &str) -> String {
    let Ok(raw) = env::var(key) else {
        return default.to_string();
    };

    match url::Url::parse(raw.trim()) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {
            raw.trim().trim_end_matches('/').to_string()
        }
        _ => {
            tracing::warn!("Ignoring invalid {}='{}', using {}", key, raw, default);
            default.to_string()
        }
    }
}
