//! Logging setup for roster
//!
//! Wraps `tracing-subscriber` so every binary initializes logging the same
//! way, and exposes the active threshold as a [`LogLevelHandle`] so the
//! `debug` command can raise or lower it while the session runs.
//!
//! # Quick Start
//!
//! ```ignore
//! use roster_logging::{LogConfig, RosterSubscriberBuilder, Verbosity};
//!
//! let logging = RosterSubscriberBuilder::new()
//!     .with_config(LogConfig::development())
//!     .try_init()?;
//!
//! logging.level().set(Verbosity::Trace)?;
//! ```

pub mod config;
pub mod verbosity;

pub use config::{ConsoleConfig, FileConfig, LogConfig, RotationStrategy};
pub use verbosity::Verbosity;

use std::fs::{self, File};
use std::sync::{Arc, Mutex};

use thiserror::Error;
use tracing::Subscriber;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{
    EnvFilter, Layer, Registry, layer::SubscriberExt, reload, util::SubscriberInitExt,
};

/// Errors raised while setting up or adjusting logging
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Failed to open log file: {0}")]
    File(String),

    #[error("Failed to install subscriber: {0}")]
    Init(String),

    #[error("Failed to change log level: {0}")]
    Reload(String),
}

/// Handle for changing the threshold of an installed subscriber
#[derive(Clone)]
pub struct LogLevelHandle {
    handle: reload::Handle<EnvFilter, Registry>,
    current: Arc<Mutex<Verbosity>>,
}

impl LogLevelHandle {
    /// The threshold last set through this handle
    pub fn current(&self) -> Verbosity {
        self.current.lock().map(|v| *v).unwrap_or_default()
    }

    /// Replace the active filter with `level`
    pub fn set(&self, level: Verbosity) -> Result<(), LoggingError> {
        self.handle
            .reload(EnvFilter::new(level.as_directive()))
            .map_err(|e| LoggingError::Reload(e.to_string()))?;
        if let Ok(mut current) = self.current.lock() {
            *current = level;
        }
        tracing::info!(level = %level, "Log level changed");
        Ok(())
    }
}

impl std::fmt::Debug for LogLevelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogLevelHandle")
            .field("current", &self.current())
            .finish()
    }
}

/// An installed subscriber
///
/// Keep it alive for the life of the program: dropping it flushes and
/// stops the background file writer.
#[derive(Debug)]
pub struct RosterLogging {
    level: LogLevelHandle,
    _guard: Option<WorkerGuard>,
}

impl RosterLogging {
    pub fn level(&self) -> &LogLevelHandle {
        &self.level
    }
}

/// Builder for configuring and initializing the roster logging subscriber
pub struct RosterSubscriberBuilder {
    config: LogConfig,
}

impl RosterSubscriberBuilder {
    /// Create a new subscriber builder with default configuration
    pub fn new() -> Self {
        Self {
            config: LogConfig::default(),
        }
    }

    /// Use a specific configuration
    pub fn with_config(mut self, config: LogConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the default threshold
    pub fn with_level(mut self, level: Verbosity) -> Self {
        self.config.default_level = level;
        self
    }

    /// Enable or disable console output
    pub fn with_console(mut self, enabled: bool) -> Self {
        self.config.console.enabled = enabled;
        self
    }

    /// Configure file output
    pub fn with_file_output(mut self, config: FileConfig) -> Self {
        self.config.file = Some(config);
        self
    }

    /// Install the subscriber globally
    ///
    /// Fails if a global subscriber has already been set.
    pub fn try_init(self) -> Result<RosterLogging, LoggingError> {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.config.default_level.as_directive()));
        let (filter, handle) = reload::Layer::new(env_filter);

        let (file_writer, guard) = match &self.config.file {
            Some(file_config) => {
                let (writer, guard) = file_writer(file_config)?;
                (Some(writer), Some(guard))
            }
            None => (None, None),
        };

        Registry::default()
            .with(filter)
            .with(console_layer(&self.config.console))
            .with(file_writer.map(|writer| {
                tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
                    .json()
                    .boxed()
            }))
            .try_init()
            .map_err(|e| LoggingError::Init(e.to_string()))?;

        Ok(RosterLogging {
            level: LogLevelHandle {
                handle,
                current: Arc::new(Mutex::new(self.config.default_level)),
            },
            _guard: guard,
        })
    }
}

impl Default for RosterSubscriberBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn console_layer<S>(config: &ConsoleConfig) -> Option<Box<dyn Layer<S> + Send + Sync>>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    if !config.enabled {
        return None;
    }
    let layer = tracing_subscriber::fmt::layer()
        .with_ansi(config.ansi)
        .with_target(true);
    Some(if config.pretty {
        layer.compact().boxed()
    } else {
        layer.json().boxed()
    })
}

// Truncates for Never rotation, appends for the rolling strategies
fn file_writer(config: &FileConfig) -> Result<(NonBlocking, WorkerGuard), LoggingError> {
    fs::create_dir_all(&config.directory).map_err(|e| LoggingError::File(e.to_string()))?;
    let rotation = match config.rotation {
        RotationStrategy::Never => {
            let path = config.directory.join(format!("{}.log", config.prefix));
            let file = File::create(&path).map_err(|e| LoggingError::File(e.to_string()))?;
            return Ok(tracing_appender::non_blocking(file));
        }
        RotationStrategy::Daily => Rotation::DAILY,
        RotationStrategy::Hourly => Rotation::HOURLY,
    };
    let appender = RollingFileAppender::new(rotation, &config.directory, &config.prefix);
    Ok(tracing_appender::non_blocking(appender))
}

/// Initialize logging for testing (minimal output), ignoring repeat calls
pub fn init_testing() -> Option<RosterLogging> {
    RosterSubscriberBuilder::new()
        .with_config(LogConfig::testing())
        .try_init()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_creation() {
        let builder = RosterSubscriberBuilder::new();
        assert_eq!(builder.config.default_level, Verbosity::Info);
    }

    #[test]
    fn test_builder_with_level() {
        let builder = RosterSubscriberBuilder::new().with_level(Verbosity::Trace);
        assert_eq!(builder.config.default_level, Verbosity::Trace);
    }

    #[test]
    fn test_builder_with_console() {
        let builder = RosterSubscriberBuilder::new().with_console(false);
        assert!(!builder.config.console.enabled);
    }

    #[test]
    fn test_file_writer_never_rotation_creates_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = FileConfig {
            directory: dir.path().join("logs"),
            prefix: "session".to_string(),
            rotation: RotationStrategy::Never,
        };
        let (_writer, _guard) = file_writer(&config).unwrap();
        assert!(dir.path().join("logs").join("session.log").exists());
    }
}
