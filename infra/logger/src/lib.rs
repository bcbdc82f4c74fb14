//! # Logger
//!
//! Installs the global `tracing` subscriber for applications embedding Strata.
//!
//! * Console output is compact and colored.
//! * File output goes through a non-blocking rolling appender, as plain text
//!   or JSON lines.
//! * `RUST_LOG` is honored unless an explicit filter is given with
//!   [`LoggerBuilder::env_filter`] (e.g. `"strata_registry=debug,info"`).
//!
//! ## Example
//!
//! ```rust
//! # use strata_logger::{Logger, LevelFilter};
//! let _logger = Logger::builder()
//!     .name("strata-demo")
//!     .level(LevelFilter::DEBUG)
//!     .init()
//!     .unwrap();
//! ```

mod error;

pub use crate::error::{LoggerError, LoggerErrorExt};
pub use tracing::level_filters::LevelFilter;
pub use tracing_appender::rolling::Rotation;

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const DEFAULT_MAX_FILES: usize = 7;
const LOG_FILE_SUFFIX: &str = "log";

/// Line format of the file sink.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FileFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for FileFormat {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(LoggerError::invalid(format!("unknown log format '{other}'"))),
        }
    }
}

/// Parses a level name such as `"info"` or `"off"`.
///
/// # Errors
/// Returns [`LoggerError::InvalidConfiguration`] for unknown names.
pub fn parse_level(level: &str) -> Result<LevelFilter, LoggerError> {
    LevelFilter::from_str(level.trim()).map_err(|e| LoggerError::InvalidConfiguration {
        message: format!("unknown log level '{level}'").into(),
        context: Some(e.to_string().into()),
    })
}

#[derive(Debug)]
struct FileSink {
    directory: PathBuf,
    rotation: Rotation,
    max_files: usize,
    format: FileFormat,
}

/// Builder state before a name is given.
#[derive(Debug)]
pub struct Unnamed;
/// Builder state once the name is set.
#[derive(Debug)]
pub struct Named(String);

mod sealed {
    pub trait State {}
    impl State for super::Unnamed {}
    impl State for super::Named {}
}

/// Configures and installs the global subscriber.
///
/// The name must be set before [`LoggerBuilder::init`] becomes available; it
/// also prefixes rolling log files (`<name>.<date>.log`).
#[derive(Debug)]
pub struct LoggerBuilder<S: sealed::State = Unnamed> {
    name: S,
    console: bool,
    level: LevelFilter,
    env_filter: Option<String>,
    file: Option<FileSink>,
}

impl LoggerBuilder<Unnamed> {
    pub fn name(self, name: impl Into<String>) -> LoggerBuilder<Named> {
        LoggerBuilder {
            name: Named(name.into()),
            console: self.console,
            level: self.level,
            env_filter: self.env_filter,
            file: self.file,
        }
    }
}

impl LoggerBuilder<Named> {
    #[must_use = "the builder does nothing until `init` is called"]
    pub const fn level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    /// Explicit filter directives. Takes precedence over `RUST_LOG`.
    #[must_use = "the builder does nothing until `init` is called"]
    pub fn env_filter(mut self, directives: impl Into<String>) -> Self {
        self.env_filter = Some(directives.into());
        self
    }

    #[must_use = "the builder does nothing until `init` is called"]
    pub const fn console(mut self, enabled: bool) -> Self {
        self.console = enabled;
        self
    }

    /// Enables file output into `directory`, rotated daily.
    #[must_use = "the builder does nothing until `init` is called"]
    pub fn directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.file = Some(FileSink {
            directory: directory.into(),
            rotation: Rotation::DAILY,
            max_files: DEFAULT_MAX_FILES,
            format: FileFormat::Text,
        });
        self
    }

    /// Rotation of the file sink. Ignored without [`LoggerBuilder::directory`].
    #[must_use = "the builder does nothing until `init` is called"]
    pub fn rotation(mut self, rotation: Rotation) -> Self {
        if let Some(file) = self.file.as_mut() {
            file.rotation = rotation;
        }
        self
    }

    /// Number of rotated files to keep. Ignored without [`LoggerBuilder::directory`].
    #[must_use = "the builder does nothing until `init` is called"]
    pub const fn max_files(mut self, max_files: usize) -> Self {
        if let Some(file) = self.file.as_mut() {
            file.max_files = max_files;
        }
        self
    }

    /// Line format of the file sink. Ignored without [`LoggerBuilder::directory`].
    #[must_use = "the builder does nothing until `init` is called"]
    pub const fn format(mut self, format: FileFormat) -> Self {
        if let Some(file) = self.file.as_mut() {
            file.format = format;
        }
        self
    }

    /// Validates the settings and installs the global subscriber.
    ///
    /// The returned [`Logger`] owns the background writer of the file sink and
    /// must be kept alive for as long as logs should be written.
    ///
    /// # Errors
    /// * [`LoggerError::InvalidConfiguration`] for an empty name, a malformed
    ///   filter, `max_files == 0`, or when no output is enabled.
    /// * [`LoggerError::Internal`] if the log directory cannot be created.
    /// * [`LoggerError::Appender`] if the rolling appender fails to start.
    /// * [`LoggerError::Subscriber`] if a global subscriber is already set.
    pub fn init(self) -> Result<Logger, LoggerError> {
        let name = self.name.0.trim();
        if name.is_empty() {
            return Err(LoggerError::invalid("logger name cannot be empty"));
        }
        if !self.console && self.file.is_none() {
            return Err(LoggerError::invalid("enable console or file output"));
        }
        let filter = self.build_filter()?;

        let mut layers = Vec::new();
        if self.console {
            layers.push(layer().compact().with_ansi(true).boxed());
        }

        let (guard, directory) = match self.file {
            Some(sink) => {
                let (layer, guard) = file_layer(name, &sink)?;
                layers.push(layer);
                (Some(guard), Some(sink.directory))
            },
            None => (None, None),
        };

        tracing_subscriber::registry().with(filter).with(layers).try_init()?;
        tracing::debug!(logger = name, "Logging initialized");

        Ok(Logger { guard, directory })
    }

    fn build_filter(&self) -> Result<EnvFilter, LoggerError> {
        let builder = EnvFilter::builder().with_default_directive(self.level.into());
        match &self.env_filter {
            Some(directives) => builder.parse(directives).map_err(|e| {
                LoggerError::InvalidConfiguration {
                    message: format!("invalid filter '{directives}'").into(),
                    context: Some(e.to_string().into()),
                }
            }),
            None => Ok(builder.from_env_lossy()),
        }
    }
}

type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync>;

fn file_layer<S>(name: &str, sink: &FileSink) -> Result<(BoxedLayer<S>, WorkerGuard), LoggerError>
where
    S: Subscriber + for<'a> LookupSpan<'a> + 'static,
{
    if sink.max_files == 0 {
        return Err(LoggerError::invalid("max_files must be greater than zero"));
    }
    fs::create_dir_all(&sink.directory).map_err(|e| LoggerError::Internal {
        message: e.to_string().into(),
        context: Some(format!("creating {}", sink.directory.display()).into()),
    })?;

    let appender = RollingFileAppender::builder()
        .rotation(sink.rotation.clone())
        .filename_prefix(name)
        .filename_suffix(LOG_FILE_SUFFIX)
        .max_log_files(sink.max_files)
        .build(&sink.directory)?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let base = layer().with_writer(writer).with_ansi(false);
    let boxed = match sink.format {
        FileFormat::Text => base.boxed(),
        FileFormat::Json => base.json().boxed(),
    };
    Ok((boxed, guard))
}

/// Handle to the installed logging pipeline.
///
/// Dropping it flushes and stops the file writer; console output keeps working.
#[must_use = "dropping the logger stops file output"]
#[derive(Debug)]
pub struct Logger {
    guard: Option<WorkerGuard>,
    directory: Option<PathBuf>,
}

impl Logger {
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder {
            name: Unnamed,
            console: true,
            level: LevelFilter::INFO,
            env_filter: None,
            file: None,
        }
    }

    /// Directory of the file sink, if file output is enabled.
    #[must_use]
    pub fn directory(&self) -> Option<&Path> {
        self.directory.as_deref()
    }

    #[must_use]
    pub const fn writes_files(&self) -> bool {
        self.guard.is_some()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if self.guard.is_some() {
            tracing::debug!("Flushing file logs");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let builder = Logger::builder().name("defaults");
        assert!(builder.console);
        assert_eq!(builder.level, LevelFilter::INFO);
        assert!(builder.env_filter.is_none());
        assert!(builder.file.is_none());
    }

    #[test]
    fn file_options_require_directory() {
        let builder = Logger::builder().name("files").max_files(3).format(FileFormat::Json);
        assert!(builder.file.is_none());

        let builder = builder.directory("logs").max_files(3).format(FileFormat::Json);
        let file = builder.file.as_ref().unwrap();
        assert_eq!(file.max_files, 3);
        assert_eq!(file.format, FileFormat::Json);
        assert_eq!(file.directory, PathBuf::from("logs"));
    }

    #[test]
    fn levels_and_formats_parse() {
        assert_eq!(parse_level("debug").unwrap(), LevelFilter::DEBUG);
        assert_eq!(parse_level(" WARN ").unwrap(), LevelFilter::WARN);
        assert_eq!(parse_level("off").unwrap(), LevelFilter::OFF);
        assert!(matches!(parse_level("loud"), Err(LoggerError::InvalidConfiguration { .. })));

        assert_eq!("JSON".parse::<FileFormat>().unwrap(), FileFormat::Json);
        assert_eq!("text".parse::<FileFormat>().unwrap(), FileFormat::Text);
        assert!("xml".parse::<FileFormat>().is_err());
    }

    #[test]
    fn invalid_settings_fail_before_install() {
        let err = Logger::builder().name("  ").init().unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));

        let err = Logger::builder().name("silent").console(false).init().unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));

        let err = Logger::builder().name("filtered").env_filter("strata=loudest").init().unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }
}
