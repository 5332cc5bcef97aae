//! The image sub-structure embedded on every owning record.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Prefix that marks a path as pipeline-managed. Anything outside this tree
/// (placeholder art, externally-hosted defaults) is never touched on delete.
pub const MANAGED_PREFIX: &str = "/uploads/";

/// The two derived outputs produced from one crop rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rendition {
    Thumbnail,
    Cropped,
}

impl std::fmt::Display for Rendition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rendition::Thumbnail => write!(f, "thumbnail"),
            Rendition::Cropped => write!(f, "cropped"),
        }
    }
}

/// How far along the two-phase pipeline a record's image is. The generator
/// commits one rendition at a time, so `Thumbnailed` is an observable
/// intermediate state, not a bug.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ImageStage {
    Empty,
    Ingested,
    Thumbnailed,
    Cropped,
}

/// Root-relative paths of the original upload and its renditions. An empty
/// string means "not produced yet"; a path outside `/uploads/` is a
/// placeholder owned by the frontend, not by the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ImageSet {
    #[serde(default)]
    pub original: String,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default)]
    pub cropped: String,
}

impl ImageSet {
    pub fn is_managed(path: &str) -> bool {
        path.starts_with(MANAGED_PREFIX)
    }

    /// Paths that live inside the managed uploads tree and must be removed
    /// together with the owning record.
    pub fn managed_paths(&self) -> impl Iterator<Item = &str> {
        [
            self.original.as_str(),
            self.thumbnail.as_str(),
            self.cropped.as_str(),
        ]
        .into_iter()
        .filter(|p| Self::is_managed(p))
    }

    pub fn stage(&self) -> ImageStage {
        if Self::is_managed(&self.cropped) {
            ImageStage::Cropped
        } else if Self::is_managed(&self.thumbnail) {
            ImageStage::Thumbnailed
        } else if Self::is_managed(&self.original) {
            ImageStage::Ingested
        } else {
            ImageStage::Empty
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_progression() {
        let mut image = ImageSet::default();
        assert_eq!(image.stage(), ImageStage::Empty);

        image.original = "/uploads/promotions/original/fresh-mart-1588941000123.png".to_string();
        assert_eq!(image.stage(), ImageStage::Ingested);

        image.thumbnail = "/uploads/promotions/thumbnails/fresh-mart-1588941000123.jpg".to_string();
        assert_eq!(image.stage(), ImageStage::Thumbnailed);

        image.cropped = "/uploads/promotions/cropped/fresh-mart-1588941000123.jpg".to_string();
        assert_eq!(image.stage(), ImageStage::Cropped);
    }

    #[test]
    fn placeholders_do_not_count_as_pipeline_output() {
        let image = ImageSet {
            original: String::new(),
            thumbnail: "/assets/images/sellers/placeholder.png".to_string(),
            cropped: String::new(),
        };
        assert_eq!(image.stage(), ImageStage::Empty);
        assert_eq!(image.managed_paths().count(), 0);
    }

    #[test]
    fn managed_paths_skips_empty_and_external() {
        let image = ImageSet {
            original: "/uploads/sellers/original/a.png".to_string(),
            thumbnail: "/assets/images/sellers/placeholder.png".to_string(),
            cropped: "/uploads/sellers/cropped/a.jpg".to_string(),
        };
        let managed: Vec<_> = image.managed_paths().collect();
        assert_eq!(
            managed,
            vec!["/uploads/sellers/original/a.png", "/uploads/sellers/cropped/a.jpg"]
        );
    }
}
