//! Outbound IGDB API surface: HTTP client and payload models.

pub mod client;
pub mod models;

pub use client::IgdbClient;
