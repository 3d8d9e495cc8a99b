//! # tasklane-storage
//!
//! Local-disk attachment storage: safe path layout under a configured
//! upload root, original-filename deduplication, and best-effort
//! thumbnail generation for image uploads.

pub mod store;
pub mod thumbnail;

pub use store::AttachmentStore;
pub use thumbnail::Thumbnailer;
