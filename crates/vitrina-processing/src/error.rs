#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    #[error("failed to decode source image: {0}")]
    Decode(String),

    #[error("crop rectangle selects an empty region")]
    EmptyRegion,

    #[error("failed to encode rendition: {0}")]
    Encode(String),
}

impl From<image::ImageError> for ProcessingError {
    fn from(err: image::ImageError) -> Self {
        ProcessingError::Decode(err.to_string())
    }
}
