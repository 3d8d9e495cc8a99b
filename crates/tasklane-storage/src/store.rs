//! Local filesystem attachment store.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use tokio::fs;
use tracing::debug;

use tasklane_core::error::{AppError, ErrorKind};
use tasklane_core::result::AppResult;

/// Stores attachment files on the local filesystem under a single root.
///
/// Files are laid out as `<root>/<todo_id>/<stored_name>`; all paths
/// handed back to callers are relative to the root so the database never
/// contains absolute paths.
#[derive(Debug, Clone)]
pub struct AttachmentStore {
    /// Root directory for all stored files.
    root: PathBuf,
}

impl AttachmentStore {
    /// Create a new store rooted at the given path.
    pub async fn new(root_path: &str) -> AppResult<Self> {
        let root = PathBuf::from(root_path);
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create upload root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root })
    }

    /// Resolve a relative path to an absolute path within the root.
    fn resolve(&self, path: &str) -> PathBuf {
        let clean = path.trim_start_matches('/');
        self.root.join(clean)
    }

    /// Ensure the parent directory of a path exists.
    async fn ensure_parent(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to create parent directory: {}", parent.display()),
                    e,
                )
            })?;
        }
        Ok(())
    }

    /// Write file content at a relative path.
    pub async fn write(&self, path: &str, data: Bytes) -> AppResult<()> {
        let full_path = self.resolve(path);
        self.ensure_parent(&full_path).await?;

        fs::write(&full_path, &data).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to write file: {path}"),
                e,
            )
        })?;

        debug!(path, bytes = data.len(), "Stored attachment file");
        Ok(())
    }

    /// Read the full content of a file at a relative path.
    pub async fn read_bytes(&self, path: &str) -> AppResult<Bytes> {
        let full_path = self.resolve(path);
        let data = fs::read(&full_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::not_found(format!("File not found: {path}"))
            } else {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to read file: {path}"),
                    e,
                )
            }
        })?;
        Ok(Bytes::from(data))
    }

    /// Delete a file at a relative path. Missing files are not an error.
    pub async fn delete(&self, path: &str) -> AppResult<()> {
        let full_path = self.resolve(path);
        match fs::remove_file(&full_path).await {
            Ok(()) => {
                debug!(path, "Deleted attachment file");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to delete file: {path}"),
                e,
            )),
        }
    }
}

/// Pick a unique original filename by appending an `(n)` suffix before
/// the extension when the candidate collides with an existing name.
///
/// `report.pdf` → `report(1).pdf` → `report(2).pdf`, and so on.
pub fn dedup_filename(candidate: &str, existing: &[String]) -> String {
    if !existing.iter().any(|n| n == candidate) {
        return candidate.to_string();
    }

    let (stem, ext) = match candidate.rfind('.') {
        Some(pos) if pos > 0 => (&candidate[..pos], &candidate[pos..]),
        _ => (candidate, ""),
    };

    let mut n = 1;
    loop {
        let attempt = format!("{stem}({n}){ext}");
        if !existing.iter().any(|name| *name == attempt) {
            return attempt;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_no_collision() {
        assert_eq!(dedup_filename("a.txt", &[]), "a.txt");
    }

    #[test]
    fn test_dedup_single_collision() {
        let existing = vec!["a.txt".to_string()];
        assert_eq!(dedup_filename("a.txt", &existing), "a(1).txt");
    }

    #[test]
    fn test_dedup_multiple_collisions() {
        let existing = vec![
            "a.txt".to_string(),
            "a(1).txt".to_string(),
            "a(2).txt".to_string(),
        ];
        assert_eq!(dedup_filename("a.txt", &existing), "a(3).txt");
    }

    #[test]
    fn test_dedup_no_extension() {
        let existing = vec!["Makefile".to_string()];
        assert_eq!(dedup_filename("Makefile", &existing), "Makefile(1)");
    }

    #[test]
    fn test_dedup_hidden_file() {
        let existing = vec![".env".to_string()];
        assert_eq!(dedup_filename(".env", &existing), ".env(1)");
    }

    #[tokio::test]
    async fn test_write_read_delete_roundtrip() {
        let dir = std::env::temp_dir().join(format!("tasklane-store-{}", uuid::Uuid::new_v4()));
        let store = AttachmentStore::new(dir.to_str().unwrap()).await.unwrap();

        store
            .write("todo-1/file.bin", Bytes::from_static(b"hello"))
            .await
            .unwrap();
        let data = store.read_bytes("todo-1/file.bin").await.unwrap();
        assert_eq!(&data[..], b"hello");

        store.delete("todo-1/file.bin").await.unwrap();
        assert!(store.read_bytes("todo-1/file.bin").await.is_err());

        // Deleting again is not an error.
        store.delete("todo-1/file.bin").await.unwrap();

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }
}
