//! Run settings from a TOML file and command-line overrides.
//!
//! ```toml
//! big_file = "poster.png"
//! little_files = "logos/*.png"
//! out_file = "poster-with-logos.png"
//! gap = 10
//!
//! [bounding_box]
//! left = 100
//! top = 1200
//! width = 1800
//! height = 240
//! ```
//!
//! Every field can be replaced from the command line. Overrides win field by
//! field; a box given as `x,y,w,h` replaces the whole `bounding_box` table.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::geometry::Region;
use crate::placement::Step;

/// Gap used when neither the file nor the command line sets one.
pub const DEFAULT_GAP: u32 = 10;

/// Configuration loading or merging error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse config file")]
    Parse(#[from] toml::de::Error),
    #[error("`{0}` is not set in the config file or on the command line")]
    Missing(&'static str),
    #[error("invalid bounding box `{0}`, expected x,y,w,h with positive w and h")]
    InvalidBox(String),
    #[error("no config file or command-line settings given")]
    Empty,
}

/// Contents of a config file. Every field is optional here; required fields
/// are checked by [`FileConfig::merge`].
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub big_file: Option<PathBuf>,
    pub little_files: Option<String>,
    pub out_file: Option<PathBuf>,
    pub gap: Option<u32>,
    pub bounding_box: Option<Region>,
    pub step: Option<Step>,
}

impl FileConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Apply `overrides` on top of this file and check required fields.
    pub fn merge(self, overrides: Overrides) -> Result<Settings, ConfigError> {
        let big_file = overrides
            .big_file
            .or(self.big_file)
            .ok_or(ConfigError::Missing("big_file"))?;
        let little_files = overrides
            .little_files
            .or(self.little_files)
            .ok_or(ConfigError::Missing("little_files"))?;
        let out_file = overrides
            .out_file
            .or(self.out_file)
            .ok_or(ConfigError::Missing("out_file"))?;
        let region = overrides
            .region
            .or(self.bounding_box)
            .ok_or(ConfigError::Missing("bounding_box"))?;
        let step = overrides.step.or(self.step).unwrap_or_default();

        Ok(Settings {
            big_file,
            little_files,
            out_file,
            gap: overrides.gap.or(self.gap).unwrap_or(DEFAULT_GAP),
            region,
            step,
        })
    }
}

/// Values given on the command line.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Overrides {
    pub big_file: Option<PathBuf>,
    pub little_files: Option<String>,
    pub out_file: Option<PathBuf>,
    pub gap: Option<u32>,
    pub region: Option<Region>,
    pub step: Option<Step>,
}

impl Overrides {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Resolve the effective settings from an optional config file and overrides.
pub fn resolve(config: Option<&Path>, overrides: Overrides) -> Result<Settings, ConfigError> {
    match config {
        Some(path) => FileConfig::load(path)?.merge(overrides),
        None if overrides.is_empty() => Err(ConfigError::Empty),
        None => FileConfig::default().merge(overrides),
    }
}

/// Fully resolved settings for one run.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub big_file: PathBuf,
    pub little_files: String,
    pub out_file: PathBuf,
    pub gap: u32,
    pub region: Region,
    pub step: Step,
}

/// Parse a bounding box written as `x,y,w,h`.
pub fn parse_box(text: &str) -> Result<Region, ConfigError> {
    let invalid = || ConfigError::InvalidBox(text.to_owned());
    let parts = text
        .split(',')
        .map(|part| part.trim().parse::<u32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| invalid())?;
    match parts[..] {
        [left, top, width, height] if width > 0 && height > 0 => {
            Ok(Region::new(left, top, width, height))
        }
        _ => Err(invalid()),
    }
}
