//! Attachment storage configuration.

use serde::{Deserialize, Serialize};

/// File attachment storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory for stored attachments.
    #[serde(default = "default_upload_root")]
    pub upload_root: String,
    /// Subdirectory (under `upload_root`) for generated thumbnails.
    #[serde(default = "default_thumbnail_dir")]
    pub thumbnail_dir: String,
    /// Maximum upload size in bytes (default 10 MB).
    #[serde(default = "default_max_upload")]
    pub max_upload_size_bytes: u64,
    /// Thumbnail edge length in pixels.
    #[serde(default = "default_thumbnail_size")]
    pub thumbnail_size: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_root: default_upload_root(),
            thumbnail_dir: default_thumbnail_dir(),
            max_upload_size_bytes: default_max_upload(),
            thumbnail_size: default_thumbnail_size(),
        }
    }
}

fn default_upload_root() -> String {
    "./data/uploads".to_string()
}

fn default_thumbnail_dir() -> String {
    "thumbnails".to_string()
}

fn default_max_upload() -> u64 {
    10_485_760 // 10 MB
}

fn default_thumbnail_size() -> u32 {
    256
}
