//! Render-size resolution for a row of little images.
//!
//! Every image gets the same even share of the region's width (after
//! subtracting the gaps). Its height follows from its own aspect ratio; if
//! that height overflows the region, the image is rescaled so its height
//! matches the region exactly. Widths are not renormalized afterwards, so
//! images with different aspect ratios can end up with different widths.
//!
//! # Example
//!
//! ```
//! use zenstrip::{Region, Size, resolve};
//!
//! let region = Region::new(0, 0, 300, 100);
//! let sizes = resolve(region, 10, &[Size::new(50, 50); 3]).unwrap();
//!
//! // (300 - 2 * 10) / 3 = 93 for each image.
//! assert_eq!(sizes, vec![Size::new(93, 93); 3]);
//! ```

use serde::Deserialize;

/// Width × height dimensions in pixels.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Size {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Size {
    /// Create a new size.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Whether either dimension is zero.
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Rectangular area of the canvas the little images are laid out in.
///
/// The region is not checked against the canvas bounds. Anything placed
/// outside the canvas is clipped when compositing.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Region {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    /// Create a new region.
    pub const fn new(left: u32, top: u32, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Row every image is centered on, rounded down.
    pub const fn vertical_center(&self) -> i64 {
        self.top as i64 + (self.height / 2) as i64
    }
}

/// Layout computation error.
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    /// No little images were supplied.
    #[error("no little images to place")]
    NoInputImages,
    /// The region has zero width or height.
    #[error("bounding box has zero width or height")]
    ZeroRegionDimension,
    /// A little image has zero width or height.
    #[error("little image #{index} has zero width or height")]
    ZeroSourceDimension { index: usize },
    /// The gaps alone use up the region's width.
    #[error("gaps leave no room for images (available width {available_width})")]
    DegenerateGeometry { available_width: i64 },
    /// Rounding collapsed a little image to nothing.
    #[error("little image #{index} would render at {width}x{height}")]
    DegenerateSize {
        index: usize,
        width: u32,
        height: u32,
    },
}

/// Compute the render size for each little image, in input order.
///
/// `natural` holds the unscaled dimensions of the little images. The result
/// has the same length and order.
pub fn resolve(region: Region, gap: u32, natural: &[Size]) -> Result<Vec<Size>, LayoutError> {
    if natural.is_empty() {
        return Err(LayoutError::NoInputImages);
    }
    if region.width == 0 || region.height == 0 {
        return Err(LayoutError::ZeroRegionDimension);
    }
    if let Some(index) = natural.iter().position(Size::is_empty) {
        return Err(LayoutError::ZeroSourceDimension { index });
    }

    let count = natural.len() as i64;
    let total_gap = (count - 1) * i64::from(gap);
    let available_width = i64::from(region.width) - total_gap;
    if available_width <= 0 {
        return Err(LayoutError::DegenerateGeometry { available_width });
    }
    // Positive and at most region.width, so this is a floor that fits u32.
    let even_width = (available_width / count) as u32;

    natural
        .iter()
        .enumerate()
        .map(|(index, &source)| {
            let size = fit_even_share(source, even_width, region.height);
            if size.is_empty() {
                Err(LayoutError::DegenerateSize {
                    index,
                    width: size.width,
                    height: size.height,
                })
            } else {
                Ok(size)
            }
        })
        .collect()
}

// ============================================================================
// Internal geometry
// ============================================================================

/// Size one image from its even width share, clamping to `max_height`.
fn fit_even_share(source: Size, even_width: u32, max_height: u32) -> Size {
    let height = scale_floor(even_width, source.height, source.width);
    if height > u64::from(max_height) {
        // Height constrains. The new width is strictly below even_width.
        let width = scale_floor(max_height, source.width, source.height);
        Size::new(width as u32, max_height)
    } else {
        Size::new(even_width, height as u32)
    }
}

/// `floor(basis * num / den)` without floating point.
fn scale_floor(basis: u32, num: u32, den: u32) -> u64 {
    u64::from(basis) * u64::from(num) / u64::from(den)
}
