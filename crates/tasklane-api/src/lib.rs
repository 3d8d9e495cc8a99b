//! # tasklane-api
//!
//! HTTP API layer for Tasklane built on Axum.
//!
//! Provides all REST endpoints, the WebSocket upgrade, middleware,
//! extractors, DTOs, and error mapping.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use router::build_router;
pub use state::AppState;
