//! # Logger
//!
//! Installs the global `tracing` subscriber for the toggles service: console output
//! (compact or JSON), an optional non-blocking rolling log file, and
//! environment-based filtering on top of the configured level.
//!
//! Use [`LoggerBuilder::env_filter`] for module-directed filters
//! (e.g., `"toggles_flags=debug,hyper=info"`); `RUST_LOG` applies when none is given.
//!
//! ## Example
//!
//! ```rust
//! # use toggles_logger::{Logger, LevelFilter};
//!
//! let _logger = Logger::builder()
//!     .name("toggles")
//!     .level(LevelFilter::DEBUG)
//!     .init()
//!     .unwrap();
//! ```

mod error;

pub use crate::error::{LoggerError, LoggerErrorExt};
pub use tracing::level_filters::LevelFilter;
pub use tracing_appender::rolling::Rotation;

use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use toggles_domain::config::LogConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const DEFAULT_MAX_FILES: usize = 10;
const LOG_FILE_SUFFIX: &str = "log";

#[derive(Debug)]
struct Settings {
    console: bool,
    json: bool,
    path: Option<PathBuf>,
    level: LevelFilter,
    rotation: Rotation,
    max_files: usize,
    env_filter: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            console: true,
            json: false,
            path: None,
            level: LevelFilter::INFO,
            rotation: Rotation::DAILY,
            max_files: DEFAULT_MAX_FILES,
            env_filter: None,
        }
    }
}

#[derive(Debug)]
pub struct NoName;
#[derive(Debug)]
pub struct WithName(String);

/// Configures and installs the global tracing subscriber.
///
/// A name is required before [`LoggerBuilder::init`] becomes available; it prefixes
/// rolling log files (`toggles-server.2026-10-16.log`).
#[derive(Debug)]
pub struct LoggerBuilder<N = NoName> {
    settings: Settings,
    name: N,
}

impl LoggerBuilder<NoName> {
    pub fn name(self, name: impl Into<String>) -> LoggerBuilder<WithName> {
        LoggerBuilder { settings: self.settings, name: WithName(name.into()) }
    }
}

impl LoggerBuilder<WithName> {
    /// Minimum level emitted when no filter directive says otherwise.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn level(mut self, level: LevelFilter) -> Self {
        self.settings.level = level;
        self
    }

    /// Explicit filter directives; invalid ones make [`LoggerBuilder::init`] fail.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn env_filter(mut self, filter: impl Into<String>) -> Self {
        self.settings.env_filter = Some(filter.into());
        self
    }

    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn console(mut self, enabled: bool) -> Self {
        self.settings.console = enabled;
        self
    }

    /// JSON lines on every output instead of the compact human format.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn json(mut self, enabled: bool) -> Self {
        self.settings.json = enabled;
        self
    }

    /// Also writes to rolling files under `path`.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.settings.path = Some(path.into());
        self
    }

    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn rotation(mut self, rotation: Rotation) -> Self {
        self.settings.rotation = rotation;
        self
    }

    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn max_files(mut self, max: usize) -> Self {
        self.settings.max_files = max;
        self
    }

    /// Applies a `[log]` configuration section.
    ///
    /// # Errors
    /// Returns [`LoggerError::InvalidConfiguration`] if the level is not a valid level name.
    pub fn config(mut self, config: &LogConfig, json: bool) -> Result<Self, LoggerError> {
        self.settings.level = parse_level(&config.level)?;
        self.settings.json = json;
        self.settings.path.clone_from(&config.path);
        self.settings.env_filter.clone_from(&config.filter);
        Ok(self)
    }

    /// Consumes the builder and installs the global tracing subscriber.
    ///
    /// Keep the returned [`Logger`] alive for the whole program so that buffered
    /// file output is flushed on shutdown.
    ///
    /// # Errors
    /// * [`LoggerError::InvalidConfiguration`] for invalid settings or filters.
    /// * [`LoggerError::Appender`] if the log file cannot be created.
    /// * [`LoggerError::Subscriber`] if a global subscriber is already installed.
    pub fn init(self) -> Result<Logger, LoggerError> {
        let Self { settings, name: WithName(name) } = self;
        validate(&settings, &name)?;
        let env_filter = build_env_filter(&settings)?;

        let mut layers = Vec::new();
        if settings.console {
            let console = layer().with_target(true);
            layers.push(if settings.json {
                console.json().boxed()
            } else {
                console.compact().with_ansi(true).boxed()
            });
        }

        let guard = if let Some(path) = settings.path {
            fs::create_dir_all(&path).map_err(|e| LoggerError::Internal {
                message: e.to_string().into(),
                context: Some(format!("Failed to create path: {}", path.display()).into()),
            })?;

            let appender = RollingFileAppender::builder()
                .rotation(settings.rotation)
                .filename_prefix(&name)
                .filename_suffix(LOG_FILE_SUFFIX)
                .max_log_files(settings.max_files)
                .build(&path)
                .context(format!("Opening log directory {}", path.display()))?;

            let (writer, guard) = tracing_appender::non_blocking(appender);
            let file = layer().with_writer(writer).with_ansi(false);
            layers.push(if settings.json { file.json().boxed() } else { file.boxed() });
            Some(guard)
        } else {
            None
        };

        if layers.is_empty() {
            return Err(LoggerError::InvalidConfiguration {
                message: "No logging output enabled. Enable the console or a log path.".into(),
                context: None,
            });
        }

        tracing_subscriber::registry().with(env_filter).with(layers).try_init()?;

        Ok(Logger { guard })
    }
}

/// Handle to the installed logging system. Dropping it flushes pending file output.
#[must_use = "Dropping this handle will stop background logging threads."]
#[derive(Debug)]
pub struct Logger {
    guard: Option<WorkerGuard>,
}

impl Logger {
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder { settings: Settings::default(), name: NoName }
    }

    /// Installs the subscriber described by a `[log]` configuration section.
    ///
    /// # Errors
    /// See [`LoggerBuilder::config`] and [`LoggerBuilder::init`].
    pub fn from_config(
        name: impl Into<String>,
        config: &LogConfig,
        json: bool,
    ) -> Result<Self, LoggerError> {
        Self::builder().name(name).config(config, json)?.init()
    }

    /// Whether file output is active.
    #[must_use]
    pub const fn has_file_output(&self) -> bool {
        self.guard.is_some()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if self.guard.is_some() {
            tracing::info!("Logging system shutting down, flushing buffers...");
        }
    }
}

fn parse_level(raw: &str) -> Result<LevelFilter, LoggerError> {
    LevelFilter::from_str(raw.trim()).map_err(|e| LoggerError::InvalidConfiguration {
        message: format!("Invalid log level '{raw}': {e}").into(),
        context: None,
    })
}

fn validate(settings: &Settings, name: &str) -> Result<(), LoggerError> {
    if name.trim().is_empty() {
        return Err(LoggerError::InvalidConfiguration {
            message: "Logger name cannot be empty".into(),
            context: None,
        });
    }
    if settings.max_files == 0 {
        return Err(LoggerError::InvalidConfiguration {
            message: "max_files must be greater than zero".into(),
            context: None,
        });
    }
    Ok(())
}

fn build_env_filter(settings: &Settings) -> Result<EnvFilter, LoggerError> {
    let builder = EnvFilter::builder().with_default_directive(settings.level.into());
    settings.env_filter.as_ref().map_or_else(
        || Ok(builder.from_env_lossy()),
        |filter| {
            builder.parse(filter).map_err(|e| LoggerError::InvalidConfiguration {
                message: format!("Invalid env filter '{filter}': {e}").into(),
                context: None,
            })
        },
    )
}
