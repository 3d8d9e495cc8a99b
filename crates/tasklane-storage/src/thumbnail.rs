//! Thumbnail generation for image attachments.

use bytes::Bytes;
use image::ImageFormat;
use image::imageops::FilterType;
use uuid::Uuid;

use tasklane_core::error::{AppError, ErrorKind};
use tasklane_core::result::AppResult;

use crate::store::AttachmentStore;

/// Generates JPEG thumbnails for image attachments.
///
/// Thumbnailing is a best-effort post-processing step: callers treat a
/// failure here as non-fatal and store the attachment without a
/// thumbnail path.
#[derive(Debug, Clone)]
pub struct Thumbnailer {
    /// Store used for reading source files and writing thumbnails.
    store: AttachmentStore,
    /// Thumbnail output directory, relative to the store root.
    output_dir: String,
    /// Maximum edge length in pixels.
    max_edge: u32,
}

impl Thumbnailer {
    /// Create a new thumbnailer.
    pub fn new(store: AttachmentStore, output_dir: &str, max_edge: u32) -> Self {
        Self {
            store,
            output_dir: output_dir.trim_matches('/').to_string(),
            max_edge,
        }
    }

    /// Whether a MIME type is supported for thumbnailing.
    pub fn is_supported(mime_type: &str) -> bool {
        matches!(
            mime_type,
            "image/jpeg" | "image/png" | "image/gif" | "image/webp" | "image/bmp"
        )
    }

    /// Generate a thumbnail for a stored image.
    ///
    /// Returns the relative storage path of the generated thumbnail.
    /// Decoding and resizing run on the blocking thread pool.
    pub async fn generate(&self, source_path: &str, attachment_id: Uuid) -> AppResult<String> {
        let source_bytes = self.store.read_bytes(source_path).await?;
        let max_edge = self.max_edge;

        let thumbnail_bytes =
            tokio::task::spawn_blocking(move || resize_to_jpeg(&source_bytes, max_edge))
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Internal, "Thumbnail task panicked", e)
                })??;

        let thumb_path = format!("{}/{}.jpg", self.output_dir, attachment_id);
        self.store.write(&thumb_path, thumbnail_bytes).await?;

        tracing::debug!(
            source = source_path,
            output = %thumb_path,
            "Generated thumbnail"
        );

        Ok(thumb_path)
    }

    /// Delete a previously generated thumbnail.
    pub async fn delete(&self, thumbnail_path: &str) -> AppResult<()> {
        self.store.delete(thumbnail_path).await
    }
}

/// Decode an image, resize it to fit within `max_edge`, and re-encode
/// as JPEG.
fn resize_to_jpeg(data: &[u8], max_edge: u32) -> AppResult<Bytes> {
    let img = image::load_from_memory(data)
        .map_err(|e| AppError::with_source(ErrorKind::Validation, "Failed to decode image", e))?;

    let resized = img.resize(max_edge, max_edge, FilterType::Triangle);

    let mut out = std::io::Cursor::new(Vec::new());
    resized
        .to_rgb8()
        .write_to(&mut out, ImageFormat::Jpeg)
        .map_err(|e| AppError::with_source(ErrorKind::Internal, "Failed to encode thumbnail", e))?;

    Ok(Bytes::from(out.into_inner()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_mimes() {
        assert!(Thumbnailer::is_supported("image/png"));
        assert!(Thumbnailer::is_supported("image/jpeg"));
        assert!(!Thumbnailer::is_supported("application/pdf"));
        assert!(!Thumbnailer::is_supported("text/plain"));
    }

    #[test]
    fn test_resize_produces_jpeg_within_bounds() {
        let mut png = std::io::Cursor::new(Vec::new());
        image::RgbImage::from_pixel(640, 480, image::Rgb([200, 10, 10]))
            .write_to(&mut png, ImageFormat::Png)
            .unwrap();

        let jpeg = resize_to_jpeg(png.get_ref(), 128).unwrap();
        let thumb = image::load_from_memory(&jpeg).unwrap();
        assert!(thumb.width() <= 128 && thumb.height() <= 128);
    }

    #[test]
    fn test_resize_rejects_garbage() {
        assert!(resize_to_jpeg(b"definitely not an image", 128).is_err());
    }
}
