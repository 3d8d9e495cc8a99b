//! File category derived from MIME type.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Broad category of an attachment, derived from its MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "file_category", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    /// Raster or vector images; the only category that gets thumbnails.
    Image,
    /// PDFs and office documents.
    Document,
    /// Plain-text formats.
    Text,
    /// Everything else.
    Other,
}

impl FileCategory {
    /// Derive the category from a MIME type string.
    pub fn from_mime(mime_type: &str) -> Self {
        let mime = mime_type.to_lowercase();
        if mime.starts_with("image/") {
            Self::Image
        } else if mime.starts_with("text/") {
            Self::Text
        } else if matches!(
            mime.as_str(),
            "application/pdf"
                | "application/msword"
                | "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
                | "application/vnd.ms-excel"
                | "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
                | "application/vnd.ms-powerpoint"
                | "application/vnd.openxmlformats-officedocument.presentationml.presentation"
        ) {
            Self::Document
        } else {
            Self::Other
        }
    }

    /// Return the category as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Document => "document",
            Self::Text => "text",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for FileCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_mimes() {
        assert_eq!(FileCategory::from_mime("image/png"), FileCategory::Image);
        assert_eq!(FileCategory::from_mime("IMAGE/JPEG"), FileCategory::Image);
    }

    #[test]
    fn test_document_and_text_mimes() {
        assert_eq!(
            FileCategory::from_mime("application/pdf"),
            FileCategory::Document
        );
        assert_eq!(FileCategory::from_mime("text/csv"), FileCategory::Text);
    }

    #[test]
    fn test_unknown_mime_is_other() {
        assert_eq!(
            FileCategory::from_mime("application/octet-stream"),
            FileCategory::Other
        );
    }
}
