//! Crop/resize/encode primitives shared by both renditions.

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat};
use std::io::Cursor;
use vitrina_core::{Rendition, UploadProfile};

use crate::error::ProcessingError;
use crate::rect::CropRect;

/// Final pixel size of one rendition. Width comes from the profile; height
/// is derived from the profile's locked aspect ratio, so both renditions
/// share the declared ratio no matter what shape of rectangle the client
/// selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenditionSpec {
    pub kind: Rendition,
    pub width: u32,
    pub height: u32,
}

impl RenditionSpec {
    pub fn thumbnail(profile: &UploadProfile) -> Self {
        Self::for_width(profile, Rendition::Thumbnail, profile.thumbnail_width)
    }

    pub fn cropped(profile: &UploadProfile) -> Self {
        Self::for_width(profile, Rendition::Cropped, profile.cropped_width)
    }

    fn for_width(profile: &UploadProfile, kind: Rendition, width: u32) -> Self {
        RenditionSpec {
            kind,
            width,
            height: profile.aspect_ratio.height_for_width(width),
        }
    }
}

/// Pick a resize filter by downscale ratio: cheap filters for aggressive
/// downscales where ringing would be invisible anyway, Lanczos near 1:1.
fn select_filter(orig_width: u32, orig_height: u32, new_width: u32, new_height: u32) -> FilterType {
    let width_ratio = orig_width as f32 / new_width as f32;
    let height_ratio = orig_height as f32 / new_height as f32;
    let max_ratio = width_ratio.max(height_ratio);

    if max_ratio > 2.0 {
        FilterType::Triangle
    } else if max_ratio > 1.5 {
        FilterType::CatmullRom
    } else {
        FilterType::Lanczos3
    }
}

/// Extract `rect` from the decoded original, resize to the rendition's target
/// dimensions and encode as JPEG.
pub fn render(
    original: &[u8],
    rect: &CropRect,
    spec: RenditionSpec,
) -> Result<Vec<u8>, ProcessingError> {
    let source = image::load_from_memory(original)?;

    let (x, y) = rect.origin();
    let region = source.crop_imm(x, y, rect.width, rect.height);
    let (region_width, region_height) = region.dimensions();
    if region_width == 0 || region_height == 0 {
        return Err(ProcessingError::EmptyRegion);
    }

    let filter = select_filter(region_width, region_height, spec.width, spec.height);
    let resized = region.resize_exact(spec.width, spec.height, filter);

    // JPEG has no alpha channel; flatten before encoding.
    let flattened = DynamicImage::ImageRgb8(resized.to_rgb8());
    let mut buffer = Cursor::new(Vec::new());
    flattened
        .write_to(&mut buffer, ImageFormat::Jpeg)
        .map_err(|e| ProcessingError::Encode(e.to_string()))?;

    Ok(buffer.into_inner())
}
