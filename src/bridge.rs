//! Handler for the [`log`] crate facade.
//!
//! Routes `log::info!` and friends from third-party crates into the same
//! pipeline as native records. The record target becomes the component and
//! the last module path segment the function tag.

use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

use crate::config::CHANNEL_CAPACITY;
use crate::level::LogLevel;
use crate::logger::Logger;
use crate::port::Port;

/// `log::Log` adapter over a `'static` [`Logger`].
pub struct LogBridge<P: Port + 'static, const N: usize = CHANNEL_CAPACITY> {
    logger: &'static Logger<P, N>,
}

impl<P: Port + 'static, const N: usize> LogBridge<P, N> {
    pub const fn new(logger: &'static Logger<P, N>) -> Self {
        Self { logger }
    }

    /// Register as the global `log` handler.
    ///
    /// Can only succeed once per process.
    pub fn install(&'static self) -> Result<(), SetLoggerError> {
        log::set_logger(self)?;
        self.sync_max_level();
        Ok(())
    }

    /// Align the facade's static filter with the logger threshold.
    ///
    /// Call after `Logger::set_level` so the facade stops discarding levels
    /// that became enabled.
    pub fn sync_max_level(&self) {
        log::set_max_level(level_filter(self.logger.level()));
    }
}

/// Map a facade level onto the pipeline's levels.
pub fn from_log_level(level: log::Level) -> LogLevel {
    match level {
        log::Level::Error => LogLevel::Error,
        log::Level::Warn => LogLevel::Warn,
        log::Level::Info => LogLevel::Info,
        log::Level::Debug => LogLevel::Debug,
        log::Level::Trace => LogLevel::Trace,
    }
}

/// Facade filter letting through everything at or above `threshold`.
pub fn level_filter(threshold: LogLevel) -> LevelFilter {
    match threshold {
        LogLevel::Trace => LevelFilter::Trace,
        LogLevel::Debug => LevelFilter::Debug,
        LogLevel::Info => LevelFilter::Info,
        LogLevel::Warn => LevelFilter::Warn,
        LogLevel::Error | LogLevel::Crit | LogLevel::Test => LevelFilter::Error,
        LogLevel::Disabled => LevelFilter::Off,
    }
}

impl<P: Port + 'static, const N: usize> Log for LogBridge<P, N> {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        self.logger.enabled(from_log_level(metadata.level()))
    }

    fn log(&self, record: &Record<'_>) {
        let level = from_log_level(record.level());
        let function = record
            .module_path()
            .and_then(|path| path.rsplit("::").next())
            .unwrap_or("");
        // The facade has no way to return a status.
        let _ = self
            .logger
            .log(level, record.target(), function, *record.args());
    }

    // Records are queued; the dispatcher owns the sinks.
    fn flush(&self) {}
}
