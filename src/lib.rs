pub use error::AppError;

/// Main architecture layers (dependency flow: HTTP → Core → API)
pub mod core; // Business logic: token cache, query builder, fetch orchestrator
pub mod http; // Inbound axum surface

/// Support modules (used across layers)
pub mod api; // IGDB API client and payload models
pub mod config; // Environment-sourced configuration
pub mod error; // Error handling

pub type Result<T> = std::result::Result<T, AppError>;
