//! Decoding of the big and little images.

use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageError, ImageReader};

use crate::error::Error;
use crate::geometry::Size;

/// A decoded little image and the path it came from.
#[derive(Clone, Debug)]
pub struct SourceImage {
    path: PathBuf,
    image: DynamicImage,
}

impl SourceImage {
    /// Decode the image at `path`.
    ///
    /// The file is closed before this returns, whether decoding worked or not.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        Ok(Self {
            path: path.to_path_buf(),
            image: decode(path)?,
        })
    }

    /// Wrap an image that is already in memory.
    pub fn from_image(path: impl Into<PathBuf>, image: DynamicImage) -> Self {
        Self {
            path: path.into(),
            image,
        }
    }

    /// Read just the dimensions from the file header.
    pub fn probe(path: impl AsRef<Path>) -> Result<Size, Error> {
        let path = path.as_ref();
        let (width, height) = image::image_dimensions(path).map_err(|source| Error::ImageDecode {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Size::new(width, height))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    /// Unscaled dimensions.
    pub fn natural_size(&self) -> Size {
        Size::new(self.image.width(), self.image.height())
    }
}

/// Decode any supported image, guessing the format from its content.
pub fn decode(path: impl AsRef<Path>) -> Result<DynamicImage, Error> {
    let path = path.as_ref();
    let wrap = |source| Error::ImageDecode {
        path: path.to_path_buf(),
        source,
    };
    ImageReader::open(path)
        .map_err(ImageError::IoError)
        .map_err(wrap)?
        .with_guessed_format()
        .map_err(ImageError::IoError)
        .map_err(wrap)?
        .decode()
        .map_err(wrap)
}
