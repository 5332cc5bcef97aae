//! File operations under the public root.

use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::traits::{StorageError, StorageResult};

/// Reads, writes and removes files addressed by the root-relative URL-style
/// paths stored on records (`/uploads/<slug>/original/<file>`).
#[derive(Clone)]
pub struct PublicStore {
    public_root: PathBuf,
}

impl PublicStore {
    pub fn new(public_root: impl Into<PathBuf>) -> Self {
        PublicStore {
            public_root: public_root.into(),
        }
    }

    pub fn public_root(&self) -> &Path {
        &self.public_root
    }

    /// Map a stored root-relative path onto the filesystem, rejecting
    /// traversal attempts before any I/O happens.
    fn resolve(&self, relative: &str) -> StorageResult<PathBuf> {
        let trimmed = relative.trim_start_matches('/');
        if trimmed.is_empty() {
            return Err(StorageError::InvalidPath("empty path".to_string()));
        }
        if trimmed.split('/').any(|part| part.is_empty() || part == "." || part == "..") {
            return Err(StorageError::InvalidPath(format!(
                "path escapes the public root: {}",
                relative
            )));
        }
        if trimmed.bytes().any(|b| b.is_ascii_control() || b == b'\\') {
            return Err(StorageError::InvalidPath(format!(
                "path contains invalid characters: {}",
                relative
            )));
        }
        Ok(self.public_root.join(trimmed))
    }

    /// Write `data` as `<relative_dir>/<file_name>` and return the stored
    /// root-relative path. The parent directory is created if missing, and
    /// an existing file at the same path is overwritten in place.
    pub async fn write(
        &self,
        relative_dir: &str,
        file_name: &str,
        data: &[u8],
    ) -> StorageResult<String> {
        let relative = format!("{}/{}", relative_dir.trim_end_matches('/'), file_name);
        let path = self.resolve(&relative)?;
        let start = Instant::now();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|source| StorageError::DirectoryCreate {
                    path: parent.display().to_string(),
                    source,
                })?;
        }

        let mut file = fs::File::create(&path)
            .await
            .map_err(|source| StorageError::WriteFailed {
                path: path.display().to_string(),
                source,
            })?;
        file.write_all(data)
            .await
            .map_err(|source| StorageError::WriteFailed {
                path: path.display().to_string(),
                source,
            })?;
        file.sync_all()
            .await
            .map_err(|source| StorageError::WriteFailed {
                path: path.display().to_string(),
                source,
            })?;

        tracing::info!(
            path = %relative,
            size_bytes = data.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Stored file"
        );

        Ok(relative)
    }

    pub async fn read(&self, relative: &str) -> StorageResult<Vec<u8>> {
        let path = self.resolve(relative)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(relative.to_string()));
        }

        fs::read(&path)
            .await
            .map_err(|source| StorageError::ReadFailed {
                path: path.display().to_string(),
                source,
            })
    }

    pub async fn exists(&self, relative: &str) -> StorageResult<bool> {
        let path = self.resolve(relative)?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }

    /// Remove one file. Removing a path that does not exist is a no-op.
    pub async fn remove(&self, relative: &str) -> StorageResult<()> {
        let path = self.resolve(relative)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(());
        }

        fs::remove_file(&path)
            .await
            .map_err(|source| StorageError::DeleteFailed {
                path: path.display().to_string(),
                source,
            })?;

        tracing::info!(path = %relative, "Removed file");
        Ok(())
    }

    /// Remove a batch of files, e.g. every managed path of a deleted record.
    pub async fn remove_all<'a>(
        &self,
        paths: impl IntoIterator<Item = &'a str>,
    ) -> StorageResult<()> {
        for path in paths {
            self.remove(path).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn write_then_read_round_trips() {
        let root = tempdir().unwrap();
        let store = PublicStore::new(root.path());

        let rel = store
            .write("/uploads/promotions/original", "promo-1.png", b"payload")
            .await
            .unwrap();
        assert_eq!(rel, "/uploads/promotions/original/promo-1.png");
        assert!(store.exists(&rel).await.unwrap());
        assert_eq!(store.read(&rel).await.unwrap(), b"payload");
    }

    #[tokio::test]
    async fn write_overwrites_in_place() {
        let root = tempdir().unwrap();
        let store = PublicStore::new(root.path());

        store
            .write("/uploads/sellers/original", "a.png", b"first")
            .await
            .unwrap();
        store
            .write("/uploads/sellers/original", "a.png", b"second")
            .await
            .unwrap();
        assert_eq!(
            store.read("/uploads/sellers/original/a.png").await.unwrap(),
            b"second"
        );
    }

    #[tokio::test]
    async fn traversal_is_rejected() {
        let root = tempdir().unwrap();
        let store = PublicStore::new(root.path());

        for bad in ["/uploads/../../etc/passwd", "..", "/uploads//x", "/uploads/./x"] {
            assert!(
                matches!(store.read(bad).await, Err(StorageError::InvalidPath(_))),
                "path {:?} should be rejected",
                bad
            );
        }
    }

    #[tokio::test]
    async fn reading_a_missing_file_is_not_found() {
        let root = tempdir().unwrap();
        let store = PublicStore::new(root.path());
        assert!(matches!(
            store.read("/uploads/promotions/original/nope.png").await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn removing_a_missing_file_is_a_no_op() {
        let root = tempdir().unwrap();
        let store = PublicStore::new(root.path());
        assert!(store.remove("/uploads/gone.png").await.is_ok());
    }

    #[tokio::test]
    async fn remove_all_clears_every_path() {
        let root = tempdir().unwrap();
        let store = PublicStore::new(root.path());

        let a = store
            .write("/uploads/users/original", "u.png", b"a")
            .await
            .unwrap();
        let b = store
            .write("/uploads/users/thumbnails", "u.jpg", b"b")
            .await
            .unwrap();

        store.remove_all([a.as_str(), b.as_str()]).await.unwrap();
        assert!(!store.exists(&a).await.unwrap());
        assert!(!store.exists(&b).await.unwrap());
    }
}
