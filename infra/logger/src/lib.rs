//! # Logger
//!
//! Installs the global `tracing` subscriber for DayQHI binaries: a compact console layer,
//! an optional non-blocking rolling file layer (plain or JSON), and an [`EnvFilter`] built
//! from a programmatic default that `RUST_LOG` can override.
//!
//! ```rust
//! use dayqhi_logger::{LevelFilter, Logger};
//!
//! let _logger = Logger::builder()
//!     .name("dayqhi-server")
//!     .level(LevelFilter::DEBUG)
//!     .init()
//!     .unwrap();
//! ```

mod error;

pub use crate::error::{LoggerError, LoggerErrorExt};
pub use tracing::level_filters::LevelFilter;
pub use tracing_appender::rolling::Rotation;

use std::fs;
use std::marker::PhantomData;
use std::path::PathBuf;
use std::str::FromStr;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

const DEFAULT_MAX_FILES: usize = 10;
const LOG_FILE_SUFFIX: &str = "log";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

#[derive(Debug)]
struct LoggerConfig {
    console: bool,
    path: Option<PathBuf>,
    level: LevelFilter,
    rotation: Rotation,
    max_files: usize,
    json: bool,
    env_filter: Option<String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            console: true,
            path: None,
            level: LevelFilter::INFO,
            rotation: Rotation::DAILY,
            max_files: DEFAULT_MAX_FILES,
            json: false,
            env_filter: None,
        }
    }
}

/// Builder state: no name given yet.
#[derive(Debug)]
pub struct Unnamed;
/// Builder state: named.
#[derive(Debug)]
pub struct Named(String);
/// Builder state: console only.
#[derive(Debug)]
pub struct ConsoleOnly;
/// Builder state: writes to a log directory.
#[derive(Debug)]
pub struct WithFile;

mod private {
    pub trait Sealed {}
}
impl private::Sealed for Unnamed {}
impl private::Sealed for Named {}
impl private::Sealed for ConsoleOnly {}
impl private::Sealed for WithFile {}

/// Configures the global subscriber. A name is required before [`LoggerBuilder::init`]
/// becomes available; file-specific knobs appear once [`LoggerBuilder::path`] is set.
#[derive(Debug)]
pub struct LoggerBuilder<N: private::Sealed = Unnamed, F: private::Sealed = ConsoleOnly> {
    config: LoggerConfig,
    name: N,
    output: PhantomData<F>,
}

impl<F: private::Sealed> LoggerBuilder<Unnamed, F> {
    /// Names the logger; the name prefixes rolling log files.
    pub fn name(self, name: impl Into<String>) -> LoggerBuilder<Named, F> {
        LoggerBuilder { config: self.config, name: Named(name.into()), output: PhantomData }
    }
}

impl LoggerBuilder<Named, WithFile> {
    #[must_use]
    pub const fn max_files(mut self, max: usize) -> Self {
        self.config.max_files = max;
        self
    }

    #[must_use]
    pub const fn rotation(mut self, rotation: Rotation) -> Self {
        self.config.rotation = rotation;
        self
    }

    /// Writes file output as JSON lines.
    #[must_use]
    pub const fn json(mut self, enabled: bool) -> Self {
        self.config.json = enabled;
        self
    }
}

impl<F: private::Sealed> LoggerBuilder<Named, F> {
    #[must_use]
    pub const fn level(mut self, level: LevelFilter) -> Self {
        self.config.level = level;
        self
    }

    /// Programmatic filter directives (e.g. `dayqhi=debug,hyper=info`).
    ///
    /// Invalid directives make [`LoggerBuilder::init`] fail.
    #[must_use]
    pub fn env_filter(mut self, filter: impl Into<String>) -> Self {
        self.config.env_filter = Some(filter.into());
        self
    }

    #[must_use]
    pub const fn console(mut self, enabled: bool) -> Self {
        self.config.console = enabled;
        self
    }

    /// Enables rolling file output under `path`.
    pub fn path(self, path: impl Into<PathBuf>) -> LoggerBuilder<Named, WithFile> {
        let mut config = self.config;
        config.path = Some(path.into());
        LoggerBuilder { config, name: self.name, output: PhantomData }
    }

    /// Installs the subscriber.
    ///
    /// Keep the returned [`Logger`] alive for the whole program; it owns the file writer's
    /// worker guard.
    ///
    /// # Errors
    /// * [`LoggerError::InvalidConfiguration`] for an empty name, `max_files == 0`, a bad
    ///   filter, or when every output is disabled.
    /// * [`LoggerError::Subscriber`] if a global subscriber already exists.
    pub fn init(self) -> Result<Logger, LoggerError> {
        let Self { config, name: Named(name), .. } = self;
        validate(&config, &name)?;

        let filter = env_filter(&config)?;
        let mut layers: Vec<BoxedLayer> = Vec::new();

        if config.console {
            layers.push(fmt::layer().compact().with_ansi(true).boxed());
        }

        let guard = match &config.path {
            Some(dir) => {
                let (layer, guard) = file_layer(&config, dir, &name)?;
                layers.push(layer);
                Some(guard)
            },
            None => None,
        };

        if layers.is_empty() {
            return Err(LoggerError::InvalidConfiguration {
                message: "No logging output enabled; enable the console or set a path".into(),
                context: None,
            });
        }

        tracing_subscriber::registry().with(layers).with(filter).try_init()?;

        Ok(Logger { guard })
    }
}

fn file_layer(
    config: &LoggerConfig,
    dir: &PathBuf,
    name: &str,
) -> Result<(BoxedLayer, WorkerGuard), LoggerError> {
    fs::create_dir_all(dir).map_err(|e| LoggerError::Internal {
        message: e.to_string().into(),
        context: Some(format!("Failed to create log directory {}", dir.display()).into()),
    })?;

    let appender = RollingFileAppender::builder()
        .rotation(config.rotation.clone())
        .filename_prefix(name)
        .filename_suffix(LOG_FILE_SUFFIX)
        .max_log_files(config.max_files)
        .build(dir)
        .context("Building rolling file appender")?;

    let (writer, guard) = tracing_appender::non_blocking(appender);
    let layer = fmt::layer().with_writer(writer).with_ansi(false);
    let boxed = if config.json { layer.json().boxed() } else { layer.boxed() };

    Ok((boxed, guard))
}

/// Handle to the installed logging system.
#[must_use = "Dropping this handle stops the background log writer"]
#[derive(Debug)]
pub struct Logger {
    guard: Option<WorkerGuard>,
}

impl Logger {
    /// Starts configuring the global subscriber.
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder { config: LoggerConfig::default(), name: Unnamed, output: PhantomData }
    }

    /// Returns the file writer guard when file output is enabled.
    #[must_use]
    pub const fn guard(&self) -> Option<&WorkerGuard> {
        self.guard.as_ref()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if self.guard.is_some() {
            tracing::info!("Logging system shutting down, flushing buffers");
        }
    }
}

/// Parses a level name such as `"info"` or `"DEBUG"`.
///
/// # Errors
/// Returns [`LoggerError::InvalidConfiguration`] for unknown names.
pub fn parse_level(level: &str) -> Result<LevelFilter, LoggerError> {
    LevelFilter::from_str(level.trim()).map_err(|e| LoggerError::InvalidConfiguration {
        message: format!("Unknown log level '{level}': {e}").into(),
        context: None,
    })
}

fn validate(config: &LoggerConfig, name: &str) -> Result<(), LoggerError> {
    if name.trim().is_empty() {
        return Err(LoggerError::InvalidConfiguration {
            message: "Logger name cannot be empty".into(),
            context: None,
        });
    }
    if config.max_files == 0 {
        return Err(LoggerError::InvalidConfiguration {
            message: "max_files must be greater than zero".into(),
            context: None,
        });
    }
    Ok(())
}

fn env_filter(config: &LoggerConfig) -> Result<EnvFilter, LoggerError> {
    let builder = EnvFilter::builder().with_default_directive(config.level.into());
    match &config.env_filter {
        None => Ok(builder.from_env_lossy()),
        Some(directives) => builder.parse(directives).map_err(|e| {
            LoggerError::InvalidConfiguration {
                message: format!("Invalid env filter '{directives}': {e}").into(),
                context: None,
            }
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn defaults_are_console_info() {
        let builder = Logger::builder().name("dayqhi-test");
        assert!(builder.config.console);
        assert_eq!(builder.config.level, LevelFilter::INFO);
        assert!(builder.config.path.is_none());
        assert_eq!(builder.config.max_files, DEFAULT_MAX_FILES);
    }

    #[test]
    fn file_options_are_recorded() {
        let builder = Logger::builder()
            .name("dayqhi-test")
            .env_filter("dayqhi=debug")
            .path("/tmp/dayqhi-logs")
            .max_files(3)
            .json(true);

        assert_eq!(builder.config.max_files, 3);
        assert!(builder.config.json);
        assert_eq!(builder.config.env_filter.as_deref(), Some("dayqhi=debug"));
        assert_eq!(builder.config.path, Some(PathBuf::from("/tmp/dayqhi-logs")));
    }

    #[test]
    #[serial]
    fn empty_name_is_rejected_before_install() {
        let err = Logger::builder().name("  ").init().unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }

    #[test]
    #[serial]
    fn zero_max_files_is_rejected() {
        let err = Logger::builder().name("dayqhi-test").path("/tmp/x").max_files(0).init();
        assert!(matches!(err, Err(LoggerError::InvalidConfiguration { .. })));
    }

    #[test]
    #[serial]
    fn disabling_every_output_is_rejected() {
        let err = Logger::builder().name("dayqhi-test").console(false).init().unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }

    #[test]
    #[serial]
    fn bad_filter_is_rejected() {
        let err = Logger::builder().name("dayqhi-test").env_filter("dayqhi=loud").init();
        assert!(matches!(err, Err(LoggerError::InvalidConfiguration { .. })));
    }

    #[test]
    fn levels_parse_case_insensitively() {
        assert_eq!(parse_level("DEBUG").unwrap(), LevelFilter::DEBUG);
        assert_eq!(parse_level(" warn ").unwrap(), LevelFilter::WARN);
        assert!(parse_level("chatty").is_err());
    }
}
