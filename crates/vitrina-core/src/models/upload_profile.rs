//! Upload profiles: the administrator-defined configuration that binds an
//! entity type to a directory layout, a locked aspect ratio and two target
//! rendition widths.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{AppError, FieldError};
use crate::slug::slugify;

/// Default upload size cap when a profile does not set one: 2 MiB.
pub const DEFAULT_MAX_SIZE: i64 = 2 * 1024 * 1024;
/// Rendition widths used when the administrator leaves them unset.
pub const DEFAULT_THUMBNAIL_WIDTH: u32 = 300;
pub const DEFAULT_CROPPED_WIDTH: u32 = 900;

/// An ordered `width:height` pair of strictly positive integers.
///
/// Serialized as a two-element array (`[4, 3]`), parsed from the `"4:3"`
/// form administrators type into the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "[u32; 2]", into = "[u32; 2]")]
pub struct AspectRatio {
    w: u32,
    h: u32,
}

impl AspectRatio {
    pub fn new(w: u32, h: u32) -> Result<Self, String> {
        if w == 0 || h == 0 {
            return Err("aspect ratio terms must be positive".to_string());
        }
        Ok(AspectRatio { w, h })
    }

    /// Parse the `"w:h"` form, e.g. `"4:3"` or `"16:9"`.
    pub fn parse(s: &str) -> Result<Self, String> {
        let mut parts = s.split(':');
        let (w, h) = match (parts.next(), parts.next(), parts.next()) {
            (Some(w), Some(h), None) => (w.trim(), h.trim()),
            _ => return Err(format!("expected \"w:h\", got \"{}\"", s)),
        };
        let w = w
            .parse::<u32>()
            .map_err(|_| format!("invalid ratio width: {}", w))?;
        let h = h
            .parse::<u32>()
            .map_err(|_| format!("invalid ratio height: {}", h))?;
        Self::new(w, h)
    }

    pub fn width(&self) -> u32 {
        self.w
    }

    pub fn height(&self) -> u32 {
        self.h
    }

    /// Height a rendition of `width` pixels must have to keep this ratio.
    pub fn height_for_width(&self, width: u32) -> u32 {
        ((width as f64) * (self.h as f64) / (self.w as f64)).round() as u32
    }

    /// The `"w:h"` form used for storage and display.
    pub fn to_colon_string(&self) -> String {
        format!("{}:{}", self.w, self.h)
    }
}

impl TryFrom<[u32; 2]> for AspectRatio {
    type Error = String;

    fn try_from(value: [u32; 2]) -> Result<Self, Self::Error> {
        AspectRatio::new(value[0], value[1])
    }
}

impl From<AspectRatio> for [u32; 2] {
    fn from(ratio: AspectRatio) -> Self {
        [ratio.w, ratio.h]
    }
}

/// A persisted upload profile. `slug` and the three path fields are identity:
/// computed once at creation, never recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadProfile {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub crop: bool,
    pub max_size: i64,
    pub aspect_ratio: AspectRatio,
    pub thumbnail_width: u32,
    pub cropped_width: u32,
    pub original_path: String,
    pub cropped_path: String,
    pub thumbnails_path: String,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Incoming profile-creation body. Everything optional so validation can
/// report all missing fields at once instead of failing on the first.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadProfileDraft {
    pub name: Option<String>,
    /// `"w:h"` form.
    pub aspect_ratio: Option<String>,
    pub crop: Option<bool>,
    pub max_size: Option<i64>,
    pub thumbnail_width: Option<u32>,
    pub cropped_width: Option<u32>,
}

/// A draft that passed validation: required fields present, ratio parsed,
/// defaults applied, slug derived.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedProfile {
    pub name: String,
    pub slug: String,
    pub crop: bool,
    pub max_size: i64,
    pub aspect_ratio: AspectRatio,
    pub thumbnail_width: u32,
    pub cropped_width: u32,
}

impl UploadProfileDraft {
    pub fn validate(self) -> Result<ValidatedProfile, AppError> {
        let mut errors = Vec::new();

        let name = match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => Some(name.to_string()),
            _ => {
                errors.push(FieldError::new("name", "Profile name is required."));
                None
            }
        };

        let aspect_ratio = match self.aspect_ratio.as_deref() {
            Some(raw) => match AspectRatio::parse(raw) {
                Ok(ratio) => Some(ratio),
                Err(message) => {
                    errors.push(FieldError::new("aspectRatio", message));
                    None
                }
            },
            None => {
                errors.push(FieldError::new("aspectRatio", "Choose the aspect ratio."));
                None
            }
        };

        // A plain boolean, present. (Nothing cleverer: the field is a flag.)
        let crop = match self.crop {
            Some(crop) => Some(crop),
            None => {
                errors.push(FieldError::new(
                    "crop",
                    "Select if the image is to be cropped.",
                ));
                None
            }
        };

        let max_size = match self.max_size {
            Some(size) if size <= 0 => {
                errors.push(FieldError::new("maxSize", "Max size must be positive."));
                None
            }
            Some(size) => Some(size),
            None => Some(DEFAULT_MAX_SIZE),
        };

        let thumbnail_width = match self.thumbnail_width {
            Some(0) => {
                errors.push(FieldError::new(
                    "thumbnailWidth",
                    "Thumbnail width must be positive.",
                ));
                None
            }
            Some(width) => Some(width),
            None => Some(DEFAULT_THUMBNAIL_WIDTH),
        };

        let cropped_width = match self.cropped_width {
            Some(0) => {
                errors.push(FieldError::new(
                    "croppedWidth",
                    "Cropped width must be positive.",
                ));
                None
            }
            Some(width) => Some(width),
            None => Some(DEFAULT_CROPPED_WIDTH),
        };

        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        let name = name.expect("validated");
        let slug = slugify(&name);
        Ok(ValidatedProfile {
            slug,
            name,
            crop: crop.expect("validated"),
            max_size: max_size.expect("validated"),
            aspect_ratio: aspect_ratio.expect("validated"),
            thumbnail_width: thumbnail_width.expect("validated"),
            cropped_width: cropped_width.expect("validated"),
        })
    }
}

/// Partial update of the non-identity fields. `slug` and the path fields are
/// fixed once directories exist, so they are not patchable.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadProfilePatch {
    pub name: Option<String>,
    /// `"w:h"` form, re-parsed like at creation.
    pub aspect_ratio: Option<String>,
    pub crop: Option<bool>,
    pub max_size: Option<i64>,
    pub thumbnail_width: Option<u32>,
    pub cropped_width: Option<u32>,
}

impl UploadProfilePatch {
    /// Parse the patch's aspect ratio, reporting the same field error shape
    /// as creation.
    pub fn parsed_aspect_ratio(&self) -> Result<Option<AspectRatio>, AppError> {
        match self.aspect_ratio.as_deref() {
            Some(raw) => AspectRatio::parse(raw)
                .map(Some)
                .map_err(|message| AppError::invalid("aspectRatio", message)),
            None => Ok(None),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.aspect_ratio.is_none()
            && self.crop.is_none()
            && self.max_size.is_none()
            && self.thumbnail_width.is_none()
            && self.cropped_width.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_draft() -> UploadProfileDraft {
        UploadProfileDraft {
            name: Some("Promotions".to_string()),
            aspect_ratio: Some("4:3".to_string()),
            crop: Some(true),
            max_size: Some(1024 * 1024),
            thumbnail_width: Some(300),
            cropped_width: Some(900),
        }
    }

    #[test]
    fn aspect_ratio_parses_colon_form() {
        let ratio = AspectRatio::parse("4:3").unwrap();
        assert_eq!(ratio.width(), 4);
        assert_eq!(ratio.height(), 3);
        assert_eq!(ratio.to_colon_string(), "4:3");

        assert!(AspectRatio::parse("4").is_err());
        assert!(AspectRatio::parse("4:3:2").is_err());
        assert!(AspectRatio::parse("0:3").is_err());
        assert!(AspectRatio::parse("four:three").is_err());
    }

    #[test]
    fn height_for_width_rounds() {
        let ratio = AspectRatio::parse("4:3").unwrap();
        assert_eq!(ratio.height_for_width(300), 225);
        assert_eq!(ratio.height_for_width(900), 675);

        let wide = AspectRatio::parse("16:9").unwrap();
        assert_eq!(wide.height_for_width(300), 169); // 168.75 rounds up
    }

    #[test]
    fn valid_draft_derives_slug_and_keeps_fields() {
        let profile = full_draft().validate().unwrap();
        assert_eq!(profile.slug, "promotions");
        assert_eq!(profile.name, "Promotions");
        assert!(profile.crop);
        assert_eq!(profile.max_size, 1024 * 1024);
    }

    #[test]
    fn validation_reports_every_missing_field_at_once() {
        let err = UploadProfileDraft::default().validate().unwrap_err();
        let fields: Vec<_> = err
            .fields()
            .unwrap()
            .iter()
            .map(|f| f.field.as_str())
            .collect();
        assert_eq!(fields, vec!["name", "aspectRatio", "crop"]);
    }

    #[test]
    fn missing_max_size_defaults_to_two_mib() {
        let mut draft = full_draft();
        draft.max_size = None;
        let profile = draft.validate().unwrap();
        assert_eq!(profile.max_size, DEFAULT_MAX_SIZE);
    }

    #[test]
    fn missing_widths_default() {
        let mut draft = full_draft();
        draft.thumbnail_width = None;
        draft.cropped_width = None;
        let profile = draft.validate().unwrap();
        assert_eq!(profile.thumbnail_width, DEFAULT_THUMBNAIL_WIDTH);
        assert_eq!(profile.cropped_width, DEFAULT_CROPPED_WIDTH);
    }

    #[test]
    fn bad_ratio_and_missing_name_are_both_reported() {
        let draft = UploadProfileDraft {
            aspect_ratio: Some("banana".to_string()),
            crop: Some(false),
            ..Default::default()
        };
        let err = draft.validate().unwrap_err();
        let fields: Vec<_> = err
            .fields()
            .unwrap()
            .iter()
            .map(|f| f.field.as_str())
            .collect();
        assert_eq!(fields, vec!["name", "aspectRatio"]);
    }

    #[test]
    fn patch_ratio_parsing() {
        let patch = UploadProfilePatch {
            aspect_ratio: Some("16:9".to_string()),
            ..Default::default()
        };
        assert_eq!(
            patch.parsed_aspect_ratio().unwrap(),
            Some(AspectRatio::parse("16:9").unwrap())
        );

        let bad = UploadProfilePatch {
            aspect_ratio: Some("x".to_string()),
            ..Default::default()
        };
        assert!(bad.parsed_aspect_ratio().is_err());

        assert!(UploadProfilePatch::default().is_empty());
    }
}
