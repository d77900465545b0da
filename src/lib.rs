//! Place a row of little images inside a region of a big image.
//!
//! The little images share the region's width evenly, keep their aspect
//! ratio, are centered vertically, and are alpha-composited onto a copy of
//! the big image.
//!
//! # Modules
//!
//! - [`geometry`] — Render sizes from the region, the gap and natural sizes
//! - [`placement`] — Canvas coordinates for each render size
//! - [`composite`] — Lanczos scaling and alpha compositing onto the canvas
//! - [`pipeline`] — The in-memory entry point and the file-level driver
//! - [`config`] — TOML config file and command-line overrides
//!
//! # Example
//!
//! ```
//! use image::{DynamicImage, Rgba, RgbaImage};
//! use zenstrip::{Region, SourceImage, run};
//!
//! let big = DynamicImage::ImageRgba8(RgbaImage::from_pixel(400, 200, Rgba([255; 4])));
//! let logo = DynamicImage::ImageRgba8(RgbaImage::from_pixel(64, 32, Rgba([0, 0, 0, 255])));
//! let littles = vec![
//!     SourceImage::from_image("a.png", logo.clone()),
//!     SourceImage::from_image("b.png", logo),
//! ];
//!
//! let canvas = run(&big, &littles, Region::new(20, 50, 360, 100), 10).unwrap();
//! assert_eq!((canvas.width(), canvas.height()), (400, 200));
//! ```

#![forbid(unsafe_code)]

pub mod composite;
pub mod config;
pub mod discover;
pub mod error;
pub mod geometry;
pub mod logging;
pub mod pipeline;
pub mod placement;
pub mod source;

pub use composite::{Canvas, Layer, composite};
pub use config::{ConfigError, FileConfig, Overrides, Settings};
pub use error::Error;
pub use geometry::{LayoutError, Region, Size, resolve};
pub use pipeline::{Driver, Report, Slot, layout, run, run_with};
pub use placement::{Placement, Step, place, place_with};
pub use source::SourceImage;
