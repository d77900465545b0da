use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use log::{Level, LevelFilter, Log};

use zenstrip::config::{self, Overrides};
use zenstrip::logging::{Logger, emit};
use zenstrip::{Driver, Error, Region, Step};

/// Place little images in a row inside a bounding box of a big image.
#[derive(Parser, Debug)]
#[command(version)]
struct Cli {
    /// Path to the config file (toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to the big image file.
    #[arg(short, long)]
    big_file: Option<PathBuf>,

    /// Glob pattern matching the little image files.
    #[arg(short, long)]
    little_files: Option<String>,

    /// Path to the output file. Its extension picks the format.
    #[arg(short, long, visible_alias = "output-file")]
    out_file: Option<PathBuf>,

    /// Gap between the little images, in pixels [default: 10].
    #[arg(short, long)]
    gap: Option<u32>,

    /// Bounding box as x,y,w,h.
    #[arg(short = 'x', long = "box", value_parser = config::parse_box)]
    region: Option<Region>,

    /// Advance each image from the end of the previous one.
    #[arg(long)]
    cumulative: bool,

    /// Replace the output file if it already exists.
    #[arg(long)]
    overwrite: bool,

    /// Compute and log the layout without decoding or writing images.
    #[arg(long)]
    dry_run: bool,

    /// Also append log records to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// More output (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,

    /// Only warnings and errors.
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn level(&self) -> LevelFilter {
        match (self.quiet, self.verbose) {
            (true, _) => LevelFilter::Warn,
            (false, 0) => LevelFilter::Info,
            (false, 1) => LevelFilter::Debug,
            (false, _) => LevelFilter::Trace,
        }
    }

    fn overrides(&self) -> Overrides {
        Overrides {
            big_file: self.big_file.clone(),
            little_files: self.little_files.clone(),
            out_file: self.out_file.clone(),
            gap: self.gap,
            region: self.region,
            step: self.cumulative.then_some(Step::Cumulative),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let logger = Logger::new(cli.level());
    let logger = match &cli.log_file {
        Some(path) => match logger.with_file(path) {
            Ok(logger) => logger,
            Err(err) => {
                eprintln!("cannot open log file {}: {err}", path.display());
                return ExitCode::FAILURE;
            }
        },
        None => logger,
    };

    let code = match execute(&cli, &logger) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            emit(&logger, Level::Error, format_args!("{}", chain(&err)));
            ExitCode::FAILURE
        }
    };
    logger.flush();
    code
}

fn execute(cli: &Cli, log: &dyn Log) -> Result<(), Error> {
    let settings = config::resolve(cli.config.as_deref(), cli.overrides())?;
    match &cli.config {
        Some(path) => emit(log, Level::Info, format_args!("configuration loaded from {}", path.display())),
        None => emit(log, Level::Info, format_args!("configuration taken from the command line")),
    }
    emit(log, Level::Debug, format_args!("configuration: {settings:?}"));

    let report = Driver::new(log)
        .overwrite(cli.overwrite)
        .dry_run(cli.dry_run)
        .execute(&settings)?;

    if report.written.is_none() {
        for (file, slot) in report.little_files.iter().zip(&report.slots) {
            emit(
                log,
                Level::Info,
                format_args!(
                    "{} -> {}x{} at ({}, {})",
                    file.display(),
                    slot.size.width,
                    slot.size.height,
                    slot.placement.x,
                    slot.placement.y
                ),
            );
        }
    }
    Ok(())
}

/// `err` followed by each of its sources.
fn chain(err: &dyn std::error::Error) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}
