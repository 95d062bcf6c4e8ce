//! # Logger
//!
//! Installs the process-wide `tracing` subscriber: a compact console layer and,
//! when a log directory is given, a daily rolling file written by a non-blocking
//! worker. Keep the returned [`Logger`] alive until shutdown so buffered lines
//! reach the file.
//!
//! ## Filtering
//! A non-empty, valid `RUST_LOG` replaces the programmatic filter. Otherwise the
//! filter is the default level followed by the directives passed to
//! [`LoggerBuilder::directives`]. An invalid `RUST_LOG` is reported once the
//! subscriber is up and the programmatic filter is kept.
//!
//! ## Example
//!
//! ```rust
//! use ninja_logger::{LevelFilter, Logger};
//!
//! let _logger = Logger::builder("ninja-server")
//!     .level(LevelFilter::DEBUG)
//!     .directives("sqlx=debug,hyper=info")
//!     .init()
//!     .unwrap();
//! ```

mod error;

pub use crate::error::LoggerError;
pub use tracing::level_filters::LevelFilter;

use std::fs;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Daily files kept in the log directory.
const MAX_LOG_FILES: usize = 14;
const LOG_FILE_SUFFIX: &str = "log";

/// Configures the global subscriber. Created by [`Logger::builder`].
#[derive(Debug)]
#[must_use = "builders do nothing unless you call .init()"]
pub struct LoggerBuilder {
    name: String,
    level: LevelFilter,
    directives: Option<String>,
    console: bool,
    file: Option<FileSink>,
}

#[derive(Debug)]
struct FileSink {
    dir: PathBuf,
    json: bool,
}

impl LoggerBuilder {
    /// Level for targets without a matching directive. Defaults to `INFO`.
    pub const fn level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    /// Per-target directives, e.g. `sqlx=debug,hyper=info`.
    pub fn directives(mut self, directives: impl Into<String>) -> Self {
        self.directives = Some(directives.into());
        self
    }

    /// Console output is on unless disabled here.
    pub const fn console(mut self, enabled: bool) -> Self {
        self.console = enabled;
        self
    }

    /// Also writes to daily rolling files `{name}.{date}.log` under `dir`.
    pub fn file(mut self, dir: impl Into<PathBuf>) -> Self {
        self.file = Some(FileSink { dir: dir.into(), json: false });
        self
    }

    /// Writes file entries as JSON lines. Has no effect without [`file`](Self::file).
    pub fn json(mut self, enabled: bool) -> Self {
        if let Some(sink) = &mut self.file {
            sink.json = enabled;
        }
        self
    }

    /// Installs the global subscriber.
    ///
    /// # Errors
    /// * [`LoggerError::InvalidConfiguration`] for an empty name, invalid directives,
    ///   or when both console and file output are disabled.
    /// * [`LoggerError::Io`] / [`LoggerError::Appender`] if the log directory cannot be used.
    /// * [`LoggerError::Subscriber`] if a global subscriber is already installed.
    pub fn init(self) -> Result<Logger, LoggerError> {
        if self.name.trim().is_empty() {
            return Err(LoggerError::InvalidConfiguration {
                message: "Logger name cannot be empty".into(),
                context: None,
            });
        }
        if !self.console && self.file.is_none() {
            return Err(LoggerError::InvalidConfiguration {
                message: "No output enabled, keep the console or add a log directory".into(),
                context: None,
            });
        }

        let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
        let selection = select_filter(self.level, self.directives.as_deref(), rust_log.as_deref())?;

        let mut layers = Vec::new();
        if self.console {
            layers.push(layer().compact().with_ansi(true).boxed());
        }

        let guard = match &self.file {
            Some(sink) => {
                let (file_layer, guard) = file_layer(&self.name, sink)?;
                layers.push(file_layer);
                Some(guard)
            },
            None => None,
        };

        tracing_subscriber::registry().with(layers).with(selection.filter).try_init()?;

        if let Some(rejected) = selection.rejected_env {
            tracing::warn!(%rejected, "Ignoring invalid RUST_LOG");
        }

        Ok(Logger { guard })
    }
}

type BoxedLayer = Box<dyn Layer<tracing_subscriber::Registry> + Send + Sync>;

fn file_layer(name: &str, sink: &FileSink) -> Result<(BoxedLayer, WorkerGuard), LoggerError> {
    fs::create_dir_all(&sink.dir).map_err(|source| LoggerError::Io {
        source,
        context: Some(format!("Creating {}", sink.dir.display()).into()),
    })?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(name)
        .filename_suffix(LOG_FILE_SUFFIX)
        .max_log_files(MAX_LOG_FILES)
        .build(&sink.dir)?;

    let (writer, guard) = tracing_appender::non_blocking(appender);
    let base = layer().with_writer(writer).with_ansi(false);
    let boxed = if sink.json { base.json().boxed() } else { base.boxed() };
    Ok((boxed, guard))
}

#[derive(Debug)]
struct FilterSelection {
    filter: EnvFilter,
    /// `RUST_LOG` value that failed to parse.
    rejected_env: Option<String>,
}

fn select_filter(
    level: LevelFilter,
    directives: Option<&str>,
    rust_log: Option<&str>,
) -> Result<FilterSelection, LoggerError> {
    let programmatic = match directives.filter(|d| !d.trim().is_empty()) {
        Some(directives) => format!("{level},{directives}"),
        None => level.to_string(),
    };
    let filter = EnvFilter::builder().parse(&programmatic).map_err(|e| {
        LoggerError::InvalidConfiguration {
            message: format!("Invalid filter directives '{programmatic}': {e}").into(),
            context: None,
        }
    })?;

    match rust_log.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => match EnvFilter::builder().parse(value) {
            Ok(env) => Ok(FilterSelection { filter: env, rejected_env: None }),
            Err(_) => Ok(FilterSelection { filter, rejected_env: Some(value.to_owned()) }),
        },
        None => Ok(FilterSelection { filter, rejected_env: None }),
    }
}

/// Handle to the installed subscriber.
#[must_use = "Dropping this handle stops the background file writer."]
#[derive(Debug)]
pub struct Logger {
    guard: Option<WorkerGuard>,
}

impl Logger {
    /// Starts configuring a subscriber; `name` prefixes the log files.
    pub fn builder(name: impl Into<String>) -> LoggerBuilder {
        LoggerBuilder {
            name: name.into(),
            level: LevelFilter::INFO,
            directives: None,
            console: true,
            file: None,
        }
    }

    #[must_use]
    pub const fn has_file_output(&self) -> bool {
        self.guard.is_some()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if self.guard.is_some() {
            tracing::info!("Flushing log files");
        }
    }
}
