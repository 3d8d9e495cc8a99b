//! HTTP request handlers grouped by domain.

pub mod attachment;
pub mod auth;
pub mod health;
pub mod notification;
pub mod presence;
pub mod todo;
pub mod ws;
