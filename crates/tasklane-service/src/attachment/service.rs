//! Attachment upload, download, and removal.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{info, warn};
use uuid::Uuid;

use tasklane_core::config::StorageConfig;
use tasklane_core::error::AppError;
use tasklane_database::repositories::attachment::AttachmentRepository;
use tasklane_database::repositories::todo::TodoRepository;
use tasklane_entity::attachment::{Attachment, FileCategory, NewAttachment};
use tasklane_realtime::EventPublisher;
use tasklane_storage::store::{AttachmentStore, dedup_filename};
use tasklane_storage::thumbnail::Thumbnailer;

use crate::context::RequestContext;

/// Upload parameters (single request with full file body).
#[derive(Debug, Clone)]
pub struct UploadParams {
    /// The todo to attach the file to.
    pub todo_id: Uuid,
    /// Original filename as uploaded.
    pub file_name: String,
    /// MIME type from the multipart part.
    pub mime_type: Option<String>,
    /// File content bytes.
    pub data: Bytes,
}

/// Handles file attachment upload, download, and removal.
#[derive(Clone)]
pub struct AttachmentService {
    /// Attachment repository.
    attachment_repo: Arc<AttachmentRepository>,
    /// Todo repository (for ownership checks and the attachment counter).
    todo_repo: Arc<TodoRepository>,
    /// On-disk attachment store.
    store: Arc<AttachmentStore>,
    /// Thumbnail generator.
    thumbnailer: Arc<Thumbnailer>,
    /// Real-time event publisher.
    publisher: Arc<EventPublisher>,
    /// Storage configuration.
    config: StorageConfig,
}

impl std::fmt::Debug for AttachmentService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttachmentService").finish()
    }
}

impl AttachmentService {
    /// Creates a new attachment service.
    pub fn new(
        attachment_repo: Arc<AttachmentRepository>,
        todo_repo: Arc<TodoRepository>,
        store: Arc<AttachmentStore>,
        thumbnailer: Arc<Thumbnailer>,
        publisher: Arc<EventPublisher>,
        config: StorageConfig,
    ) -> Self {
        Self {
            attachment_repo,
            todo_repo,
            store,
            thumbnailer,
            publisher,
            config,
        }
    }

    /// Uploads a file and attaches it to a todo.
    ///
    /// The original filename is deduplicated per todo with an `(n)`
    /// suffix. Thumbnail generation for images is best-effort: a failure
    /// is logged and the upload still succeeds without one.
    pub async fn upload(
        &self,
        ctx: &RequestContext,
        params: UploadParams,
    ) -> Result<Attachment, AppError> {
        if params.data.is_empty() {
            return Err(AppError::validation("Uploaded file is empty"));
        }
        if params.data.len() as u64 > self.config.max_upload_size_bytes {
            return Err(AppError::validation(format!(
                "File exceeds maximum upload size of {} bytes",
                self.config.max_upload_size_bytes
            )));
        }

        let todo = self
            .todo_repo
            .find_by_id(params.todo_id, ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Todo not found"))?;

        let mime_type = params
            .mime_type
            .unwrap_or_else(|| "application/octet-stream".to_string());

        let existing = self
            .attachment_repo
            .list_original_names(params.todo_id)
            .await?;
        let original_name = dedup_filename(&params.file_name, &existing);

        let attachment_id = Uuid::new_v4();
        let stored_name = stored_name_for(attachment_id, &original_name);
        let storage_path = format!("{}/{stored_name}", params.todo_id);

        self.store.write(&storage_path, params.data.clone()).await?;

        // Best-effort: the attachment is valid without a thumbnail.
        let thumbnail_path = if Thumbnailer::is_supported(&mime_type) {
            match self.thumbnailer.generate(&storage_path, attachment_id).await {
                Ok(path) => Some(path),
                Err(e) => {
                    warn!(
                        attachment_id = %attachment_id,
                        error = %e,
                        "Thumbnail generation failed"
                    );
                    None
                }
            }
        } else {
            None
        };

        let new = NewAttachment {
            todo_id: params.todo_id,
            stored_name,
            original_name,
            storage_path: storage_path.clone(),
            size_bytes: params.data.len() as i64,
            mime_type: mime_type.clone(),
            category: FileCategory::from_mime(&mime_type),
            thumbnail_path,
        };

        let attachment = match self.attachment_repo.create(&new).await {
            Ok(a) => a,
            Err(e) => {
                // Roll back the orphaned file.
                if let Err(cleanup) = self.store.delete(&storage_path).await {
                    warn!(error = %cleanup, "Failed to remove orphaned upload");
                }
                return Err(e);
            }
        };

        // Best-effort: the row is already persisted; failing the request
        // here would make a client retry duplicate the upload.
        if let Err(e) = self
            .todo_repo
            .adjust_attachment_count(params.todo_id, 1)
            .await
        {
            warn!(
                todo_id = %params.todo_id,
                error = %e,
                "Failed to adjust attachment count"
            );
        }

        info!(
            attachment_id = %attachment.id,
            todo_id = %params.todo_id,
            size = attachment.size_bytes,
            "Attachment uploaded"
        );
        self.publisher
            .file_uploaded(ctx.user_id, &attachment, &todo.title)
            .await;

        Ok(attachment)
    }

    /// Lists a todo's attachments.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        todo_id: Uuid,
    ) -> Result<Vec<Attachment>, AppError> {
        self.require_todo(ctx, todo_id).await?;
        self.attachment_repo.list_by_todo(todo_id).await
    }

    /// Reads an attachment's content for download.
    pub async fn download(
        &self,
        ctx: &RequestContext,
        attachment_id: Uuid,
    ) -> Result<(Attachment, Bytes), AppError> {
        let attachment = self.find_owned(ctx, attachment_id).await?;
        let data = self.store.read_bytes(&attachment.storage_path).await?;
        Ok((attachment, data))
    }

    /// Reads an attachment's thumbnail, if one exists.
    pub async fn download_thumbnail(
        &self,
        ctx: &RequestContext,
        attachment_id: Uuid,
    ) -> Result<Bytes, AppError> {
        let attachment = self.find_owned(ctx, attachment_id).await?;
        let path = attachment
            .thumbnail_path
            .ok_or_else(|| AppError::not_found("Attachment has no thumbnail"))?;
        self.store.read_bytes(&path).await
    }

    /// Removes an attachment and its on-disk files.
    ///
    /// File removal is best-effort once the row is gone.
    pub async fn delete(
        &self,
        ctx: &RequestContext,
        attachment_id: Uuid,
    ) -> Result<Attachment, AppError> {
        let attachment = self.find_owned(ctx, attachment_id).await?;

        let deleted = self
            .attachment_repo
            .delete(attachment.id)
            .await?
            .ok_or_else(|| AppError::not_found("Attachment not found"))?;

        if let Err(e) = self.store.delete(&deleted.storage_path).await {
            warn!(attachment_id = %deleted.id, error = %e, "Failed to remove stored file");
        }
        if let Some(thumb) = &deleted.thumbnail_path {
            if let Err(e) = self.store.delete(thumb).await {
                warn!(attachment_id = %deleted.id, error = %e, "Failed to remove thumbnail");
            }
        }

        if let Err(e) = self
            .todo_repo
            .adjust_attachment_count(deleted.todo_id, -1)
            .await
        {
            warn!(
                todo_id = %deleted.todo_id,
                error = %e,
                "Failed to adjust attachment count"
            );
        }

        info!(attachment_id = %deleted.id, todo_id = %deleted.todo_id, "Attachment deleted");
        self.publisher
            .file_deleted(
                ctx.user_id,
                deleted.todo_id,
                deleted.id,
                &deleted.original_name,
            )
            .await;

        Ok(deleted)
    }

    /// Loads an attachment and verifies the caller owns its todo.
    async fn find_owned(
        &self,
        ctx: &RequestContext,
        attachment_id: Uuid,
    ) -> Result<Attachment, AppError> {
        let attachment = self
            .attachment_repo
            .find_by_id(attachment_id)
            .await?
            .ok_or_else(|| AppError::not_found("Attachment not found"))?;

        self.require_todo(ctx, attachment.todo_id).await?;
        Ok(attachment)
    }

    async fn require_todo(&self, ctx: &RequestContext, todo_id: Uuid) -> Result<(), AppError> {
        self.todo_repo
            .find_by_id(todo_id, ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Todo not found"))?;
        Ok(())
    }
}

/// Builds a collision-free on-disk name, preserving the extension.
fn stored_name_for(attachment_id: Uuid, original_name: &str) -> String {
    match original_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{attachment_id}.{ext}"),
        _ => attachment_id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_name_keeps_extension() {
        let id = Uuid::new_v4();
        assert_eq!(stored_name_for(id, "report.pdf"), format!("{id}.pdf"));
        assert_eq!(stored_name_for(id, "notes"), id.to_string());
        // Hidden files have no usable extension.
        assert_eq!(stored_name_for(id, ".env"), id.to_string());
    }
}
