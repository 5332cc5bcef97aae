//! Local filesystem storage for the image pipeline.
//!
//! Everything the pipeline writes lives under one public root directory
//! supplied at construction. `PathPlanner` provisions the per-profile
//! directory layout; `PublicStore` performs the individual file operations
//! with path-traversal protection.

pub mod path_planner;
pub mod store;
pub mod traits;

pub use path_planner::{PathPlanner, ProfilePaths};
pub use store::PublicStore;
pub use traits::{StorageError, StorageResult};
