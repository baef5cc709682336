//! fundus-io: Filesystem side of the vessel extraction pipeline.
//!
//! Finds fundus images in a directory, decodes them, runs them through
//! [`fundus_pipeline::run`], and writes every stage plus the composite
//! sheet under an output root. The pipeline crate itself never touches
//! the filesystem; everything that does lives here.

pub mod batch;
pub mod dataset;
pub mod error;
pub mod layout;
pub mod raster;

pub use batch::{
    BatchSummary, FileFailure, process_dataset, process_dataset_with, process_file,
    process_file_with,
};
pub use dataset::{SUPPORTED_EXTENSIONS, list_images};
pub use error::IoError;
pub use layout::{DatasetSubset, KnownDataset, OutputLayout};
