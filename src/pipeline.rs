//! Resolve → place → composite, plus the file-level driver around it.
//!
//! [`run`] is the in-memory entry point: decoded images in, canvas out.
//! [`Driver`] adds discovery, decoding, logging and saving on top, and
//! never writes the output unless every step before it succeeded.

use std::path::PathBuf;

use image::DynamicImage;
use log::{Level, Log};

use crate::composite::{Canvas, Layer, composite};
use crate::config::Settings;
use crate::discover;
use crate::error::Error;
use crate::geometry::{LayoutError, Region, Size, resolve};
use crate::logging::emit;
use crate::placement::{Placement, Step, place_with};
use crate::source::{self, SourceImage};

/// Where one little image ends up.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Slot {
    pub size: Size,
    pub placement: Placement,
}

/// Compute size and position for every little image.
pub fn layout(
    region: Region,
    gap: u32,
    step: Step,
    natural: &[Size],
) -> Result<Vec<Slot>, LayoutError> {
    let sizes = resolve(region, gap, natural)?;
    let placements = place_with(region, gap, &sizes, step);
    Ok(sizes
        .into_iter()
        .zip(placements)
        .map(|(size, placement)| Slot { size, placement })
        .collect())
}

/// Composite `sources` onto a copy of `big` with the default stepping.
pub fn run(
    big: &DynamicImage,
    sources: &[SourceImage],
    region: Region,
    gap: u32,
) -> Result<Canvas, LayoutError> {
    run_with(big, sources, region, gap, Step::OwnWidth)
}

pub fn run_with(
    big: &DynamicImage,
    sources: &[SourceImage],
    region: Region,
    gap: u32,
    step: Step,
) -> Result<Canvas, LayoutError> {
    let natural: Vec<Size> = sources.iter().map(SourceImage::natural_size).collect();
    let slots = layout(region, gap, step, &natural)?;
    Ok(render(big, sources, &slots))
}

fn render(big: &DynamicImage, sources: &[SourceImage], slots: &[Slot]) -> Canvas {
    let layers = sources.iter().zip(slots).map(|(source, slot)| Layer {
        image: source.image(),
        size: slot.size,
        placement: slot.placement,
    });
    composite(Canvas::from_image(big), layers)
}

/// What a driver run did.
#[derive(Clone, Debug, PartialEq)]
pub struct Report {
    /// Little images in the order they were placed.
    pub little_files: Vec<PathBuf>,
    pub slots: Vec<Slot>,
    /// `None` for a dry run.
    pub written: Option<PathBuf>,
}

/// Runs one job described by [`Settings`], logging through an injected logger.
pub struct Driver<'a> {
    log: &'a dyn Log,
    overwrite: bool,
    dry_run: bool,
}

impl<'a> Driver<'a> {
    pub fn new(log: &'a dyn Log) -> Self {
        Self {
            log,
            overwrite: false,
            dry_run: false,
        }
    }

    /// Replace an existing output file instead of refusing to run.
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Only read image headers and compute the layout.
    ///
    /// The big image header is read as well, so a dry run fails where a real
    /// run would fail to open it.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn execute(&self, settings: &Settings) -> Result<Report, Error> {
        if !self.dry_run && !self.overwrite && settings.out_file.exists() {
            return Err(Error::OutputExists {
                path: settings.out_file.clone(),
            });
        }

        let little_files = discover::little_files(&settings.little_files)?;
        if little_files.is_empty() {
            emit(
                self.log,
                Level::Warn,
                format_args!("no files found matching pattern: {}", settings.little_files),
            );
            return Err(Error::NoInputImages {
                pattern: settings.little_files.clone(),
            });
        }
        emit(
            self.log,
            Level::Info,
            format_args!("found {} little images", little_files.len()),
        );

        if self.dry_run {
            let big = SourceImage::probe(&settings.big_file)?;
            emit(
                self.log,
                Level::Debug,
                format_args!(
                    "big image {} is {}x{}",
                    settings.big_file.display(),
                    big.width,
                    big.height
                ),
            );
            let natural = little_files
                .iter()
                .map(SourceImage::probe)
                .collect::<Result<Vec<_>, _>>()?;
            let slots = self.layout(settings, &little_files, &natural)?;
            return Ok(Report {
                little_files,
                slots,
                written: None,
            });
        }

        let big = source::decode(&settings.big_file)?;
        emit(
            self.log,
            Level::Debug,
            format_args!(
                "big image {} is {}x{}",
                settings.big_file.display(),
                big.width(),
                big.height()
            ),
        );
        let sources = little_files
            .iter()
            .map(SourceImage::open)
            .collect::<Result<Vec<_>, _>>()?;
        let natural: Vec<Size> = sources.iter().map(SourceImage::natural_size).collect();
        let slots = self.layout(settings, &little_files, &natural)?;

        let canvas = render(&big, &sources, &slots);
        canvas.save(&settings.out_file).map_err(|source| Error::Save {
            path: settings.out_file.clone(),
            source,
        })?;
        emit(
            self.log,
            Level::Info,
            format_args!("output saved to {}", settings.out_file.display()),
        );

        Ok(Report {
            little_files,
            slots,
            written: Some(settings.out_file.clone()),
        })
    }

    fn layout(
        &self,
        settings: &Settings,
        files: &[PathBuf],
        natural: &[Size],
    ) -> Result<Vec<Slot>, LayoutError> {
        let slots = layout(settings.region, settings.gap, settings.step, natural)?;
        for ((file, source), slot) in files.iter().zip(natural).zip(&slots) {
            emit(
                self.log,
                Level::Debug,
                format_args!(
                    "{}: {}x{} -> {}x{} at ({}, {})",
                    file.display(),
                    source.width,
                    source.height,
                    slot.size.width,
                    slot.size.height,
                    slot.placement.x,
                    slot.placement.y
                ),
            );
        }
        Ok(slots)
    }
}
