//! Per-file conversion and batch orchestration

pub mod batch;
pub mod convert;

pub use batch::{find_files, preprocess};
pub use convert::{ManifestEntry, Pipeline};
