//! Directory layout provisioning for upload profiles.

use std::path::{Path, PathBuf};
use tokio::fs;

use crate::traits::{StorageError, StorageResult};

const UPLOADS_DIR: &str = "uploads";
const ORIGINAL_DIR: &str = "original";
const CROPPED_DIR: &str = "cropped";
const THUMBNAILS_DIR: &str = "thumbnails";

/// The three-way directory layout of one profile, as root-relative URL-style
/// paths (leading `/`, forward slashes on every host OS). These strings are
/// what gets persisted on the profile and served back to clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfilePaths {
    pub original: String,
    pub cropped: String,
    pub thumbnails: String,
}

/// Derives and provisions `uploads/<slug>/{original,cropped,thumbnails}`
/// under a fixed public root. The root is injected at construction; nothing
/// here reads ambient state.
#[derive(Clone)]
pub struct PathPlanner {
    public_root: PathBuf,
}

impl PathPlanner {
    pub fn new(public_root: impl Into<PathBuf>) -> Self {
        PathPlanner {
            public_root: public_root.into(),
        }
    }

    pub fn public_root(&self) -> &Path {
        &self.public_root
    }

    /// Create the profile's directory tree and return its root-relative
    /// paths. Idempotent: pre-existing directories are left untouched, so
    /// calling twice (or concurrently for different slugs) is safe.
    pub async fn provision(&self, slug: &str) -> StorageResult<ProfilePaths> {
        ensure_slug_safe(slug)?;

        let profile_root = self.public_root.join(UPLOADS_DIR).join(slug);
        for leaf in [ORIGINAL_DIR, CROPPED_DIR, THUMBNAILS_DIR] {
            let dir = profile_root.join(leaf);
            fs::create_dir_all(&dir)
                .await
                .map_err(|source| StorageError::DirectoryCreate {
                    path: dir.display().to_string(),
                    source,
                })?;
        }

        tracing::info!(slug = %slug, root = %profile_root.display(), "Provisioned upload directories");

        Ok(ProfilePaths {
            original: format!("/{}/{}/{}", UPLOADS_DIR, slug, ORIGINAL_DIR),
            cropped: format!("/{}/{}/{}", UPLOADS_DIR, slug, CROPPED_DIR),
            thumbnails: format!("/{}/{}/{}", UPLOADS_DIR, slug, THUMBNAILS_DIR),
        })
    }
}

/// A provisioning slug must already be in slug form; anything else would
/// either escape the uploads tree or produce paths the URL layer cannot
/// serve.
fn ensure_slug_safe(slug: &str) -> StorageResult<()> {
    if slug.is_empty() {
        return Err(StorageError::InvalidPath("empty profile slug".to_string()));
    }
    if !slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(StorageError::InvalidPath(format!(
            "profile slug contains invalid characters: {}",
            slug
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn provision_creates_all_three_directories() {
        let root = tempdir().unwrap();
        let planner = PathPlanner::new(root.path());

        let paths = planner.provision("promotions").await.unwrap();

        assert_eq!(paths.original, "/uploads/promotions/original");
        assert_eq!(paths.cropped, "/uploads/promotions/cropped");
        assert_eq!(paths.thumbnails, "/uploads/promotions/thumbnails");

        for rel in ["original", "cropped", "thumbnails"] {
            assert!(root.path().join("uploads/promotions").join(rel).is_dir());
        }
    }

    #[tokio::test]
    async fn provision_is_idempotent() {
        let root = tempdir().unwrap();
        let planner = PathPlanner::new(root.path());

        let first = planner.provision("sellers").await.unwrap();
        // A marker file must survive the second call: directories are left
        // untouched, not recreated.
        let marker = root.path().join("uploads/sellers/original/marker");
        std::fs::write(&marker, b"keep").unwrap();

        let second = planner.provision("sellers").await.unwrap();
        assert_eq!(first, second);
        assert!(marker.exists());
    }

    #[tokio::test]
    async fn paths_are_mutually_disjoint() {
        let root = tempdir().unwrap();
        let planner = PathPlanner::new(root.path());
        let paths = planner.provision("users").await.unwrap();

        let all = [&paths.original, &paths.cropped, &paths.thumbnails];
        for (i, a) in all.iter().enumerate() {
            for (j, b) in all.iter().enumerate() {
                if i != j {
                    assert_ne!(a, b);
                    assert!(!a.starts_with(b.as_str()));
                }
            }
        }
    }

    #[tokio::test]
    async fn unsafe_slugs_are_rejected() {
        let root = tempdir().unwrap();
        let planner = PathPlanner::new(root.path());

        for bad in ["", "../escape", "Upper", "with space", "dot.dot"] {
            let result = planner.provision(bad).await;
            assert!(
                matches!(result, Err(StorageError::InvalidPath(_))),
                "slug {:?} should be rejected",
                bad
            );
        }
    }
}
