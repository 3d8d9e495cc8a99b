//! File attachment entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::category::FileCategory;

/// A file attached to a todo.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Attachment {
    /// Unique attachment identifier.
    pub id: Uuid,
    /// The todo this file belongs to.
    pub todo_id: Uuid,
    /// Randomized on-disk filename.
    pub stored_name: String,
    /// Original filename as uploaded, deduplicated per todo with an
    /// `(n)` suffix when the name is already taken.
    pub original_name: String,
    /// Path relative to the upload root.
    pub storage_path: String,
    /// File size in bytes.
    pub size_bytes: i64,
    /// MIME type of the file.
    pub mime_type: String,
    /// Broad category derived from the MIME type.
    pub category: FileCategory,
    /// Relative thumbnail path; only ever set for image MIME types.
    pub thumbnail_path: Option<String>,
    /// When the attachment was created.
    pub created_at: DateTime<Utc>,
}

impl Attachment {
    /// Whether a thumbnail exists for this attachment.
    pub fn has_thumbnail(&self) -> bool {
        self.thumbnail_path.is_some()
    }
}

/// Data required to create an attachment record after a successful upload.
#[derive(Debug, Clone)]
pub struct NewAttachment {
    /// The todo this file belongs to.
    pub todo_id: Uuid,
    /// Randomized on-disk filename.
    pub stored_name: String,
    /// Deduplicated original filename.
    pub original_name: String,
    /// Path relative to the upload root.
    pub storage_path: String,
    /// File size in bytes.
    pub size_bytes: i64,
    /// MIME type.
    pub mime_type: String,
    /// Derived category.
    pub category: FileCategory,
    /// Thumbnail path, if one was generated.
    pub thumbnail_path: Option<String>,
}
