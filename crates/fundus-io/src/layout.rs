//! Where results go on disk, and where the known public datasets live.

use std::path::{Path, PathBuf};

use fundus_pipeline::{PipelineParameters, StageLabel};

use crate::IoError;

/// Subdirectory holding the composite sheets.
pub const COMPOSITE_DIR: &str = "combined";

/// Suffix appended to the image stem for composite sheet file names.
pub const COMPOSITE_SUFFIX: &str = "_combined";

/// Output directory tree for one processed dataset.
///
/// ```text
/// <root>/red_channel/<stem>.png
/// <root>/green_channel/<stem>.png
/// ...
/// <root>/reconstructed/<stem>.png
/// <root>/combined/<stem>_combined.png
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding every image's `stage` output.
    #[must_use]
    pub fn stage_dir(&self, stage: StageLabel) -> PathBuf {
        self.root.join(stage.dir_name())
    }

    /// PNG path for one stage of the image named `stem`.
    #[must_use]
    pub fn stage_path(&self, stage: StageLabel, stem: &str) -> PathBuf {
        self.stage_dir(stage).join(format!("{stem}.png"))
    }

    #[must_use]
    pub fn composite_dir(&self) -> PathBuf {
        self.root.join(COMPOSITE_DIR)
    }

    /// PNG path for the composite sheet of the image named `stem`.
    #[must_use]
    pub fn composite_path(&self, stem: &str) -> PathBuf {
        self.composite_dir().join(format!("{stem}{COMPOSITE_SUFFIX}.png"))
    }

    /// Create the root, every stage directory, and the composite
    /// directory. Existing directories are left alone.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::CreateDir`] for the first directory that cannot
    /// be created.
    pub fn prepare(&self) -> Result<(), IoError> {
        let dirs = StageLabel::ALL
            .into_iter()
            .map(|stage| self.stage_dir(stage))
            .chain(std::iter::once(self.composite_dir()));
        for dir in dirs {
            std::fs::create_dir_all(&dir)
                .map_err(|source| IoError::CreateDir { path: dir, source })?;
        }
        Ok(())
    }
}

/// A public fundus dataset with a known directory layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownDataset {
    /// DRIVE: 565×584 images split into training and test sets.
    Drive,
    /// STARE: 700×605 images in one flat directory.
    Stare,
    /// HRF: high-resolution 3504×2336 images.
    Hrf,
}

/// One input directory of a dataset and where its results go, both
/// relative to the respective roots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatasetSubset {
    pub input: &'static str,
    pub output: &'static str,
}

impl KnownDataset {
    pub const ALL: [Self; 3] = [Self::Drive, Self::Stare, Self::Hrf];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Drive => "DRIVE",
            Self::Stare => "STARE",
            Self::Hrf => "HRF",
        }
    }

    /// Input and output directories of every subset, in processing order.
    #[must_use]
    pub const fn subsets(self) -> &'static [DatasetSubset] {
        match self {
            Self::Drive => &[
                DatasetSubset {
                    input: "DRIVE/training/images",
                    output: "DRIVE/training",
                },
                DatasetSubset {
                    input: "DRIVE/test/images",
                    output: "DRIVE/test",
                },
            ],
            Self::Stare => &[DatasetSubset {
                input: "stare-dataset",
                output: "STARE",
            }],
            Self::Hrf => &[DatasetSubset {
                input: "HRF/images",
                output: "HRF",
            }],
        }
    }

    /// Parameter preset tuned for the dataset's resolution.
    #[must_use]
    pub const fn parameters(self) -> PipelineParameters {
        match self {
            Self::Drive | Self::Stare => PipelineParameters::standard(),
            Self::Hrf => PipelineParameters::high_resolution(),
        }
    }
}

impl std::fmt::Display for KnownDataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
