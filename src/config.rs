//! Dataset configuration
#[cfg(feature = "serde")]
use crate::error::{RedistributeError, Result};
#[cfg(feature = "serde")]
use std::fs;
use std::path::PathBuf;

fn default_width() -> usize {
    1
}

/// A dataset split over numbered files
///
/// File `i` is named `{prefix}.{i:05}`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "DatasetFields")
)]
pub struct Dataset {
    /// Path prefix shared by all files
    pub prefix: String,
    /// Number of files
    pub n_files: usize,
    /// Number of values per element
    pub width: usize,
}

// Unchecked form of a dataset as read from a configuration.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct DatasetFields {
    prefix: String,
    n_files: usize,
    #[serde(default = "default_width")]
    width: usize,
}

#[cfg(feature = "serde")]
impl TryFrom<DatasetFields> for Dataset {
    type Error = String;

    fn try_from(fields: DatasetFields) -> std::result::Result<Self, String> {
        if fields.width == 0 {
            Err(format!(
                "dataset {:?} needs at least one value per element",
                fields.prefix
            ))
        } else {
            Ok(Self {
                prefix: fields.prefix,
                n_files: fields.n_files,
                width: fields.width,
            })
        }
    }
}

impl Dataset {
    /// Create new
    pub fn new(prefix: &str, n_files: usize) -> Self {
        Self {
            prefix: String::from(prefix),
            n_files,
            width: default_width(),
        }
    }

    /// Set the number of values per element
    pub fn with_width(mut self, width: usize) -> Self {
        assert!(width > 0, "Elements need at least one value.");
        self.width = width;
        self
    }

    /// Path of file `index`
    pub fn file_path(&self, index: usize) -> PathBuf {
        assert!(
            index < self.n_files,
            "File {index} out of range for {} files.",
            self.n_files
        );
        PathBuf::from(format!("{}.{index:05}", self.prefix))
    }
}

/// Inputs of the particle, halo and galaxy pipeline
///
/// Particle ids are single values. Each halo is the range `[begin, end)` of particle ids it
/// owns. Each galaxy is the index of its halo.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PipelineConfig {
    /// Particle ids
    pub pids: Dataset,
    /// Halo particle ranges
    pub halos: Dataset,
    /// Galaxy halo indices
    pub gals: Dataset,
}

#[cfg(feature = "serde")]
impl PipelineConfig {
    /// Parse from a RON string
    pub fn from_ron_str(s: &str) -> Result<Self> {
        Ok(ron::from_str(s)?)
    }

    /// Generate the RON string
    pub fn to_ron_string(&self) -> Result<String> {
        Ok(ron::ser::to_string_pretty(
            self,
            ron::ser::PrettyConfig::default(),
        )?)
    }

    /// Import from a RON file
    pub fn import_from_ron(filename: &str) -> Result<Self> {
        let content = fs::read_to_string(filename).map_err(|source| RedistributeError::Io {
            path: PathBuf::from(filename),
            source,
        })?;
        Self::from_ron_str(&content)
    }
}
