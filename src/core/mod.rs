//! Core module - business logic
//!
//! Token caching, query construction and the fetch orchestrator that ties
//! them together for the inbound surface.

pub mod catalog;
pub mod query;
pub mod token_cache;

pub use catalog::{CatalogService, PageResult};
pub use query::{FilterSet, Query};
pub use token_cache::TokenCache;
