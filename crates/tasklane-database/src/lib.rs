//! # tasklane-database
//!
//! PostgreSQL connection management and concrete repository
//! implementations for all Tasklane entities. All raw SQL lives here.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
