//! Crate-level error type.

use std::path::PathBuf;

use crate::config::ConfigError;
use crate::geometry::LayoutError;

/// Anything that stops a run before the output is written.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error("no little images match `{pattern}`")]
    NoInputImages { pattern: String },

    #[error("invalid little file pattern `{pattern}`")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("cannot read a little file candidate")]
    Discover(#[from] glob::GlobError),

    #[error("cannot decode image {}", path.display())]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("output file {} already exists", path.display())]
    OutputExists { path: PathBuf },

    #[error("cannot save {}", path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}
