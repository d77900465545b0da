//! Alpha-aware compositing of scaled little images onto the canvas.

use std::io::Cursor;
use std::path::Path;

use image::buffer::ConvertBuffer;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, ImageResult, Rgba, Rgba32FImage, RgbImage, RgbaImage};

use crate::geometry::Size;
use crate::placement::Placement;

/// Resampling filter used for every little image.
pub const FILTER: FilterType = FilterType::Lanczos3;

/// RGBA working copy of the big image.
///
/// The canvas owns its pixels. Building one from a [`DynamicImage`] copies
/// it, so the input image is never touched.
#[derive(Clone, Debug, PartialEq)]
pub struct Canvas {
    pixels: RgbaImage,
}

impl Canvas {
    /// Copy `base` into a canvas with an alpha channel.
    ///
    /// Images without alpha come out fully opaque. Images that already are
    /// RGBA8 are copied unchanged.
    pub fn from_image(base: &DynamicImage) -> Self {
        Self {
            pixels: base.to_rgba8(),
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn as_rgba(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn into_rgba(self) -> RgbaImage {
        self.pixels
    }

    /// Scale `layer` and blend it over the canvas.
    ///
    /// Resampling runs on premultiplied alpha, so the color of transparent
    /// source pixels never bleeds into their neighbours. Fully transparent
    /// pixels leave the canvas as is. Anything outside the canvas is clipped.
    pub fn paint(&mut self, layer: &Layer<'_>) {
        let scaled = imageops::resize(
            &premultiply(layer.image),
            layer.size.width,
            layer.size.height,
            FILTER,
        );
        blend_over(&mut self.pixels, &scaled, layer.placement.x, layer.placement.y);
    }

    /// Encode the canvas in the format implied by `path`'s extension.
    ///
    /// JPEG has no alpha channel, so the canvas is flattened to RGB for it.
    /// The file is only created once encoding has succeeded.
    pub fn save(&self, path: impl AsRef<Path>) -> ImageResult<()> {
        let path = path.as_ref();
        let format = ImageFormat::from_path(path)?;
        let mut encoded = Vec::new();
        let mut cursor = Cursor::new(&mut encoded);
        if format == ImageFormat::Jpeg {
            let flat: RgbImage = self.pixels.convert();
            flat.write_to(&mut cursor, format)?;
        } else {
            self.pixels.write_to(&mut cursor, format)?;
        }
        std::fs::write(path, encoded)?;
        Ok(())
    }
}

/// Float RGBA in `0.0..=1.0` with color premultiplied by alpha.
fn premultiply(image: &DynamicImage) -> Rgba32FImage {
    let mut pixels = image.to_rgba32f();
    for p in pixels.pixels_mut() {
        let a = p[3];
        p[0] *= a;
        p[1] *= a;
        p[2] *= a;
    }
    pixels
}

/// Porter-Duff "source over" of premultiplied `top` onto `canvas` at `(x, y)`.
fn blend_over(canvas: &mut RgbaImage, top: &Rgba32FImage, x: i64, y: i64) {
    let (width, height) = (i64::from(canvas.width()), i64::from(canvas.height()));
    for (tx, ty, src) in top.enumerate_pixels() {
        let (cx, cy) = (x + i64::from(tx), y + i64::from(ty));
        if cx < 0 || cy < 0 || cx >= width || cy >= height {
            continue;
        }
        let dst = canvas.get_pixel_mut(cx as u32, cy as u32);
        *dst = over(src, *dst);
    }
}

fn over(src: &Rgba<f32>, dst: Rgba<u8>) -> Rgba<u8> {
    // Lanczos lobes can push channels outside the premultiplied range.
    let a = src[3].clamp(0.0, 1.0);
    if a <= 0.0 {
        return dst;
    }
    let dst_a = f32::from(dst[3]) / 255.0;
    let out_a = a + dst_a * (1.0 - a);
    let mut out = [0; 4];
    for c in 0..3 {
        let s = src[c].clamp(0.0, a);
        let d = f32::from(dst[c]) / 255.0 * dst_a;
        out[c] = to_u8((s + d * (1.0 - a)) / out_a);
    }
    out[3] = to_u8(out_a);
    Rgba(out)
}

fn to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// One little image together with where and how big it goes.
#[derive(Copy, Clone, Debug)]
pub struct Layer<'a> {
    pub image: &'a DynamicImage,
    pub size: Size,
    pub placement: Placement,
}

/// Paint `layers` onto `canvas` one at a time.
///
/// Later layers cover earlier ones where they overlap.
pub fn composite<'a>(mut canvas: Canvas, layers: impl IntoIterator<Item = Layer<'a>>) -> Canvas {
    for layer in layers {
        canvas.paint(&layer);
    }
    canvas
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba};

    fn solid(w: u32, h: u32, px: [u8; 4]) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, Rgba(px)))
    }

    // ── Canvas ──────────────────────────────────────────────────────────

    #[test]
    fn rgb_base_becomes_opaque_rgba() {
        let base = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 3, Rgb([10, 20, 30])));
        let canvas = Canvas::from_image(&base);
        assert_eq!((canvas.width(), canvas.height()), (4, 3));
        assert!(canvas.as_rgba().pixels().all(|p| *p == Rgba([10, 20, 30, 255])));
    }

    #[test]
    fn alpha_conversion_is_idempotent() {
        let base = DynamicImage::ImageRgb8(RgbImage::from_fn(8, 8, |x, y| {
            Rgb([x as u8 * 30, y as u8 * 30, 7])
        }));
        let once = Canvas::from_image(&base);
        let twice = Canvas::from_image(&DynamicImage::ImageRgba8(once.as_rgba().clone()));
        assert_eq!(once.as_rgba().as_raw(), twice.as_rgba().as_raw());
    }

    #[test]
    fn base_image_is_not_mutated() {
        let base = solid(10, 10, [0, 0, 255, 255]);
        let before = base.clone();
        let little = solid(2, 2, [255, 0, 0, 255]);
        let _ = composite(
            Canvas::from_image(&base),
            [Layer {
                image: &little,
                size: Size::new(4, 4),
                placement: Placement::new(1, 1),
            }],
        );
        assert_eq!(base, before);
    }

    // ── paint ───────────────────────────────────────────────────────────

    #[test]
    fn opaque_layer_replaces_pixels_in_its_rect() {
        let base = solid(10, 10, [0, 0, 255, 255]);
        let little = solid(3, 3, [255, 0, 0, 255]);
        let canvas = composite(
            Canvas::from_image(&base),
            [Layer {
                image: &little,
                size: Size::new(4, 2),
                placement: Placement::new(2, 5),
            }],
        );
        let px = canvas.as_rgba();
        assert_eq!(*px.get_pixel(2, 5), Rgba([255, 0, 0, 255]));
        assert_eq!(*px.get_pixel(5, 6), Rgba([255, 0, 0, 255]));
        assert_eq!(*px.get_pixel(6, 5), Rgba([0, 0, 255, 255]));
        assert_eq!(*px.get_pixel(2, 7), Rgba([0, 0, 255, 255]));
        assert_eq!(*px.get_pixel(1, 5), Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn transparent_layer_leaves_canvas_alone() {
        let base = solid(6, 6, [9, 8, 7, 255]);
        let little = solid(6, 6, [255, 255, 255, 0]);
        let canvas = composite(
            Canvas::from_image(&base),
            [Layer {
                image: &little,
                size: Size::new(6, 6),
                placement: Placement::new(0, 0),
            }],
        );
        assert!(canvas.as_rgba().pixels().all(|p| *p == Rgba([9, 8, 7, 255])));
    }

    #[test]
    fn half_transparent_layer_blends() {
        let base = solid(4, 4, [0, 0, 0, 255]);
        let little = solid(4, 4, [255, 255, 255, 128]);
        let canvas = composite(
            Canvas::from_image(&base),
            [Layer {
                image: &little,
                size: Size::new(4, 4),
                placement: Placement::new(0, 0),
            }],
        );
        let p = canvas.as_rgba().get_pixel(1, 1);
        assert_eq!(p[3], 255);
        assert!((120..=136).contains(&p[0]), "{p:?}");
    }

    #[test]
    fn transparent_edges_do_not_darken_canvas() {
        // Left half opaque white, right half transparent black.
        let little = DynamicImage::ImageRgba8(RgbaImage::from_fn(4, 2, |x, _| {
            if x < 2 {
                Rgba([255, 255, 255, 255])
            } else {
                Rgba([0, 0, 0, 0])
            }
        }));
        let canvas = composite(
            Canvas::from_image(&solid(40, 20, [255, 255, 255, 255])),
            [Layer {
                image: &little,
                size: Size::new(32, 16),
                placement: Placement::new(0, 0),
            }],
        );
        for (x, y, p) in canvas.as_rgba().enumerate_pixels() {
            assert_eq!(*p, Rgba([255, 255, 255, 255]), "({x}, {y})");
        }
    }

    #[test]
    fn later_layers_occlude_earlier_ones() {
        let base = solid(10, 4, [0, 0, 0, 255]);
        let red = solid(1, 1, [255, 0, 0, 255]);
        let green = solid(1, 1, [0, 255, 0, 255]);
        let canvas = composite(
            Canvas::from_image(&base),
            [
                Layer {
                    image: &red,
                    size: Size::new(6, 4),
                    placement: Placement::new(0, 0),
                },
                Layer {
                    image: &green,
                    size: Size::new(6, 4),
                    placement: Placement::new(4, 0),
                },
            ],
        );
        let px = canvas.as_rgba();
        assert_eq!(*px.get_pixel(3, 1), Rgba([255, 0, 0, 255]));
        assert_eq!(*px.get_pixel(4, 1), Rgba([0, 255, 0, 255]));
        assert_eq!(*px.get_pixel(5, 1), Rgba([0, 255, 0, 255]));
    }

    #[test]
    fn out_of_bounds_layers_are_clipped() {
        let base = solid(8, 8, [0, 0, 0, 255]);
        let white = solid(2, 2, [255, 255, 255, 255]);
        let canvas = composite(
            Canvas::from_image(&base),
            [
                Layer {
                    image: &white,
                    size: Size::new(4, 4),
                    placement: Placement::new(6, 6),
                },
                Layer {
                    image: &white,
                    size: Size::new(4, 4),
                    placement: Placement::new(-2, -2),
                },
                Layer {
                    image: &white,
                    size: Size::new(4, 4),
                    placement: Placement::new(100, 100),
                },
            ],
        );
        let px = canvas.as_rgba();
        assert_eq!((canvas.width(), canvas.height()), (8, 8));
        assert_eq!(*px.get_pixel(7, 7), Rgba([255, 255, 255, 255]));
        assert_eq!(*px.get_pixel(0, 0), Rgba([255, 255, 255, 255]));
        assert_eq!(*px.get_pixel(1, 1), Rgba([255, 255, 255, 255]));
        assert_eq!(*px.get_pixel(2, 2), Rgba([0, 0, 0, 255]));
        assert_eq!(*px.get_pixel(5, 5), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn compositing_is_deterministic() {
        let base = DynamicImage::ImageRgba8(RgbaImage::from_fn(32, 16, |x, y| {
            Rgba([x as u8 * 8, y as u8 * 16, 99, 255])
        }));
        let little = DynamicImage::ImageRgba8(RgbaImage::from_fn(9, 7, |x, y| {
            Rgba([200, x as u8 * 25, y as u8 * 30, (x * y * 4) as u8])
        }));
        let layers = || {
            [
                Layer {
                    image: &little,
                    size: Size::new(13, 10),
                    placement: Placement::new(1, 3),
                },
                Layer {
                    image: &little,
                    size: Size::new(5, 4),
                    placement: Placement::new(20, 6),
                },
            ]
        };
        let a = composite(Canvas::from_image(&base), layers());
        let b = composite(Canvas::from_image(&base), layers());
        assert_eq!(a.as_rgba().as_raw(), b.as_rgba().as_raw());
    }

    // ── save ────────────────────────────────────────────────────────────

    #[test]
    fn save_rejects_unknown_extension() {
        let canvas = Canvas::from_image(&solid(2, 2, [0, 0, 0, 255]));
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.nope");
        assert!(canvas.save(&path).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn save_png_keeps_alpha() {
        let canvas = Canvas::from_image(&solid(3, 2, [1, 2, 3, 4]));
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        canvas.save(&path).unwrap();
        let back = image::open(&path).unwrap().to_rgba8();
        assert_eq!(back, *canvas.as_rgba());
    }

    #[test]
    fn save_jpeg_flattens_alpha() {
        let canvas = Canvas::from_image(&solid(8, 8, [200, 100, 50, 255]));
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.jpg");
        canvas.save(&path).unwrap();
        let back = image::open(&path).unwrap();
        assert_eq!((back.width(), back.height()), (8, 8));
        assert!(!back.color().has_alpha());
    }
}
