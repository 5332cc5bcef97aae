//! The image pipeline: ingest → crop/resize → persist.
//!
//! `AssetIngestor` stores one raw upload per owning record under a
//! deterministic name. `DerivedAssetGenerator` turns a stored original plus a
//! client crop rectangle into the profile's two fixed-width JPEG renditions,
//! committing them one at a time. `Orchestrator` is the route-facing entry
//! point that resolves profiles and per-entity-type record accessors.

pub mod derive;
pub mod error;
pub mod ingest;
pub mod orchestrator;
pub mod rect;
pub mod renditions;

pub use derive::{DerivedAssetGenerator, DerivedPaths};
pub use error::ProcessingError;
pub use ingest::{AssetIngestor, UploadPayload};
pub use orchestrator::Orchestrator;
pub use rect::CropRect;
pub use renditions::RenditionSpec;
