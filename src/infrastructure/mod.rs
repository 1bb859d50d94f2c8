//! Infrastructure layer - Framework implementations
//!
//! This layer contains:
//! - Configuration loading (config)
//! - Database connection, migrations and demo data (db, seed)
//! - Repository implementations, local and hosted (repositories)
//! - Application state (state)
//! - HTTP router assembly (server)

pub mod config;
pub mod db;
pub mod repositories;
pub mod seed;
pub mod server;
pub mod state;

pub use repositories::*;
pub use state::AppState;
