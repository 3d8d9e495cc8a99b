//! # tasklane-auth
//!
//! JWT issuing/validation and Argon2id password hashing. Tokens carry the
//! user ID and username; every REST request and WebSocket handshake is
//! authenticated through this crate.

pub mod jwt;
pub mod password;

pub use jwt::{Claims, JwtDecoder, JwtEncoder};
pub use password::PasswordHasher;
