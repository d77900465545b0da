//! Console and file logger handed to the pipeline driver.
//!
//! Nothing here installs a global logger. The binary builds one [`Logger`]
//! and passes it down as `&dyn Log`.

use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;

use colored::{Color, Colorize};
use log::{Level, LevelFilter, Log, Metadata, Record};
use time::macros;

pub struct Logger {
    level: LevelFilter,
    file: Option<Mutex<BufWriter<File>>>,
}

impl Logger {
    pub fn new(level: LevelFilter) -> Self {
        Self { level, file: None }
    }

    /// Also append every record to `path`, creating it if needed.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> io::Result<Self> {
        let file = File::options().create(true).append(true).open(path)?;
        self.file = Some(Mutex::new(BufWriter::new(file)));
        Ok(self)
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let timestamp = time::OffsetDateTime::now_utc()
            .format(macros::format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"))
            .unwrap_or_default();
        let target = record.target();
        let level = record.level().as_str();
        let args = record.args();

        let color = match record.level() {
            Level::Error => Color::BrightRed,
            Level::Warn => Color::BrightYellow,
            Level::Info => Color::BrightCyan,
            Level::Debug => Color::Magenta,
            Level::Trace => Color::Green,
        };

        eprintln!("{} {} {args}", timestamp.color(Color::BrightBlack), level.color(color));
        if let Some(file) = &self.file
            && let Ok(mut file) = file.lock()
        {
            // Log file write errors are ignored.
            let _ = writeln!(file, "{timestamp} [{target} {level}] {args}");
        }
    }

    fn flush(&self) {
        if let Some(file) = &self.file
            && let Ok(mut file) = file.lock()
        {
            let _ = file.flush();
        }
    }
}

/// Send one record to `log`.
pub fn emit(log: &dyn Log, level: Level, args: fmt::Arguments<'_>) {
    log.log(
        &Record::builder()
            .args(args)
            .level(level)
            .target(env!("CARGO_PKG_NAME"))
            .build(),
    );
}
