//! # tasklane-entity
//!
//! Domain entity models for Tasklane. Every struct in this crate
//! represents a database table row or a domain value object. All entities
//! derive `Debug`, `Clone`, `Serialize`, `Deserialize`, and database
//! entities additionally derive `sqlx::FromRow`.

pub mod attachment;
pub mod notification;
pub mod presence;
pub mod todo;
pub mod user;
