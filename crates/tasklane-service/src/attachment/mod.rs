//! Attachment use cases: upload, download, and removal.

pub mod service;

pub use service::AttachmentService;
