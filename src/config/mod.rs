//! Module: config
//!
//! Purpose: Compile-time sizing and runtime defaults for the log pipeline.
//!
//! Architecture:
//! - Buffer sizes are constants: no allocation, everything sized at build time
//! - `LoggerConfig` is built with `const fn` so a `static` Logger can own it
//! - The default threshold is picked by Cargo feature (`level-trace`,
//!   `level-debug`, `level-warn`), Info otherwise

use crate::format::{NoTime, TimeSource};
use crate::level::LogLevel;

/// Transfer channel capacity in bytes. Must be a power of 2.
pub const CHANNEL_CAPACITY: usize = 4096;

/// Maximum rendered record length, terminator included.
pub const MAX_LINE_LEN: usize = 224;

/// Bounded wait for the producer lock.
pub const LOCK_TIMEOUT_MS: u32 = 100;

/// Bytes rendered per line by `dump_buffer`.
pub const DUMP_BYTES_PER_LINE: usize = 16;

/// Upper bound on registered sinks (one bit each in the active mask).
pub const MAX_SINKS: usize = 32;

/// Threshold applied by `Logger::init`.
pub const DEFAULT_LEVEL: LogLevel = if cfg!(feature = "level-trace") {
    LogLevel::Trace
} else if cfg!(feature = "level-debug") {
    LogLevel::Debug
} else if cfg!(feature = "level-warn") {
    LogLevel::Warn
} else {
    LogLevel::Info
};

/// Logger runtime configuration.
#[derive(Clone, Copy)]
pub struct LoggerConfig {
    /// Threshold set at init
    pub default_level: LogLevel,
    /// Wrap records in ANSI color sequences
    pub color: bool,
    /// Bounded wait for the producer lock
    pub lock_timeout_ms: u32,
    /// Human readable time prefix
    pub time_source: &'static dyn TimeSource,
}

impl LoggerConfig {
    /// Build defaults: compiled level, colors on, 100ms lock wait, no time string.
    pub const DEFAULT: Self = Self {
        default_level: DEFAULT_LEVEL,
        color: true,
        lock_timeout_ms: LOCK_TIMEOUT_MS,
        time_source: &NoTime,
    };

    /// Same as [`LoggerConfig::DEFAULT`].
    pub const fn new() -> Self {
        Self::DEFAULT
    }

    /// Override the threshold applied at init.
    pub const fn with_level(mut self, level: LogLevel) -> Self {
        self.default_level = level;
        self
    }

    /// Enable or disable ANSI colors.
    pub const fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Override the producer lock timeout.
    pub const fn with_lock_timeout_ms(mut self, timeout_ms: u32) -> Self {
        self.lock_timeout_ms = timeout_ms;
        self
    }

    /// Plug in a time string provider.
    pub const fn with_time_source(mut self, source: &'static dyn TimeSource) -> Self {
        self.time_source = source;
        self
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl core::fmt::Debug for LoggerConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LoggerConfig")
            .field("default_level", &self.default_level)
            .field("color", &self.color)
            .field("lock_timeout_ms", &self.lock_timeout_ms)
            .finish_non_exhaustive()
    }
}

/// UART configuration for the device sink.
#[derive(Clone, Copy, Debug)]
pub struct UartSinkConfig {
    pub baud_rate: u32,
    /// Driver TX ring size; also bounds what one dispatch step may write.
    pub tx_buffer_size: usize,
}

impl Default for UartSinkConfig {
    fn default() -> Self {
        Self {
            baud_rate: 115200,
            tx_buffer_size: 1024,
        }
    }
}
