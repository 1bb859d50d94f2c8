//! Domain layer - Pure business abstractions
//!
//! Trait definitions for data access and metadata providers, plus the domain
//! error type. Implementations live in the infrastructure and integrations
//! layers.

pub mod errors;
pub mod providers;
pub mod repositories;

pub use errors::DomainError;
pub use providers::{BookMetadata, MetadataProvider};
pub use repositories::*;
