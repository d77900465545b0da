//! Canvas coordinates for each resolved render size.

use serde::Deserialize;

use crate::geometry::{Region, Size};

/// Top-left canvas coordinate of a scaled little image.
///
/// Signed so that callers can feed it straight to clipping paste routines.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Placement {
    pub x: i64,
    pub y: i64,
}

impl Placement {
    /// Create a new placement.
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

/// How the horizontal position advances from one image to the next.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Step {
    /// `x = left + index * (own_width + gap)`.
    ///
    /// Uses each image's own width rather than the widths before it, so the
    /// gap is only exact when all images render at the same width.
    #[default]
    OwnWidth,
    /// Each image starts `gap` pixels after the previous one ends.
    Cumulative,
}

/// Place images with the default [`Step::OwnWidth`] stepping.
pub fn place(region: Region, gap: u32, sizes: &[Size]) -> Vec<Placement> {
    place_with(region, gap, sizes, Step::OwnWidth)
}

/// Place images, vertically centered in `region`, in input order.
///
/// No overlap or bounds checks are made.
pub fn place_with(region: Region, gap: u32, sizes: &[Size], step: Step) -> Vec<Placement> {
    let center = region.vertical_center();
    let left = i64::from(region.left);
    let gap = i64::from(gap);

    let mut cursor = left;
    sizes
        .iter()
        .enumerate()
        .map(|(index, size)| {
            let width = i64::from(size.width);
            let x = match step {
                Step::OwnWidth => left + index as i64 * (width + gap),
                Step::Cumulative => {
                    let x = cursor;
                    cursor += width + gap;
                    x
                }
            };
            Placement::new(x, center - i64::from(size.height / 2))
        })
        .collect()
}
