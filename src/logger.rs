//! Producer side of the pipeline and its lifecycle.
//!
//! # Architecture
//!
//! ```text
//! any task             Logger                       Dispatcher
//! ────────             ──────                       ──────────
//!
//! log() ─▶ filter ─▶ lock ─▶ render ─▶ ByteRing ──▶ step() ─▶ sinks
//!          (no-op)   (≤100ms) (224 B     (4 KiB)    (single
//!                     Busy     scratch)             consumer)
//! ```
//!
//! # Rules
//!
//! - Logging from interrupt context is refused (`Unsupported`)
//! - A record is rendered once, under the lock, and appended in one piece
//! - Producers never wait for channel space: a full channel truncates
//! - The Dispatcher is the only reader of the channel

use core::cell::UnsafeCell;
use core::fmt;
use core::sync::atomic::{AtomicU8, Ordering};

use crate::channel::ByteRing;
use crate::config::{LoggerConfig, CHANNEL_CAPACITY, MAX_LINE_LEN, MAX_SINKS, DUMP_BYTES_PER_LINE};
use crate::dispatch::Dispatcher;
use crate::format::{render_record, HexChunk, RecordHeader};
use crate::level::LogLevel;
use crate::port::{Port, PortLock};
use crate::sink::SinkSet;
use crate::status::{LogResult, Status};

/// Component tag used for the pipeline's own diagnostics.
pub(crate) const COMPONENT: &str = "Logger";

/// How a rendered record goes into the channel.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Append {
    /// Whatever fits; the rest is counted as dropped.
    Truncate,
    /// Whole record or nothing.
    Whole,
}

/// Lifecycle state of a [`Logger`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum LifecycleState {
    Uninitialized = 0,
    Initializing = 1,
    Ready = 2,
}

impl LifecycleState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => LifecycleState::Initializing,
            2 => LifecycleState::Ready,
            _ => LifecycleState::Uninitialized,
        }
    }
}

/// Thread-safe, allocation-free logger.
///
/// Shared by every producer (`&Logger` is all they need). The single
/// consumer is the [`Dispatcher`] returned by [`Logger::init`].
///
/// # Usage
///
/// ```ignore
/// static LOGGER: Logger<EspPort> = Logger::new(EspPort::new(), LoggerConfig::DEFAULT);
///
/// // Log task:
/// let mut dispatcher = LOGGER.init((UartSink::new(uart, tx, UartSinkConfig::default()),))?;
/// loop {
///     let _ = dispatcher.step();
/// }
///
/// // Anywhere else:
/// rt_info!(LOGGER, "Net", "link up after {} ms", elapsed);
/// ```
pub struct Logger<P: Port, const N: usize = CHANNEL_CAPACITY> {
    port: P,
    config: LoggerConfig,
    /// Current threshold; relaxed, a stale read only affects one decision.
    threshold: AtomicU8,
    state: AtomicU8,
    channel: ByteRing<N>,
    /// Producer scratch, only touched while the port lock is held.
    scratch: UnsafeCell<[u8; MAX_LINE_LEN]>,
}

// SAFETY: `scratch` is only accessed while holding the port lock, the
// channel write side is serialized by the same lock, and the read side is
// owned by the single Dispatcher. Everything else is atomic.
unsafe impl<P: Port, const N: usize> Sync for Logger<P, N> {}

impl<P: Port, const N: usize> Logger<P, N> {
    /// Create an uninitialized logger.
    pub const fn new(port: P, config: LoggerConfig) -> Self {
        Self {
            port,
            threshold: AtomicU8::new(config.default_level as u8),
            config,
            state: AtomicU8::new(LifecycleState::Uninitialized as u8),
            channel: ByteRing::new(),
            scratch: UnsafeCell::new([0; MAX_LINE_LEN]),
        }
    }

    /// Bring the pipeline up and hand back its dispatcher.
    ///
    /// Steps: threshold to default, port hook, sinks in registry order
    /// (failures are skipped), channel wake-up, Ready. Fails with
    /// [`Status::Failed`] when no sink came up. On any failure the logger
    /// stays uninitialized.
    ///
    /// Calling `init` while another `init` runs returns [`Status::Busy`];
    /// calling it on a ready logger returns [`Status::Unsupported`].
    pub fn init<S: SinkSet>(&self, mut sinks: S) -> Result<Dispatcher<'_, P, S, N>, Status> {
        if let Err(current) = self.state.compare_exchange(
            LifecycleState::Uninitialized as u8,
            LifecycleState::Initializing as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            return Err(match LifecycleState::from_u8(current) {
                LifecycleState::Initializing => Status::Busy,
                _ => Status::Unsupported,
            });
        }

        match self.bring_up(&mut sinks) {
            Ok(active) => {
                self.state
                    .store(LifecycleState::Ready as u8, Ordering::Release);
                self.report_failed_sinks(&sinks, active);
                Ok(Dispatcher::new(self, sinks, active))
            }
            Err(status) => {
                self.state
                    .store(LifecycleState::Uninitialized as u8, Ordering::Release);
                Err(status)
            }
        }
    }

    /// Returns the bitmask of sinks that initialized.
    fn bring_up<S: SinkSet>(&self, sinks: &mut S) -> Result<u32, Status> {
        self.threshold
            .store(self.config.default_level as u8, Ordering::Relaxed);

        self.port.init()?;

        let count = sinks.count();
        if count > MAX_SINKS {
            return Err(Status::InvalidArgument);
        }

        let mut active = 0u32;
        for index in 0..count {
            if let Some(sink) = sinks.sink_mut(index) {
                if sink.init().is_ok() {
                    active |= 1 << index;
                }
            }
        }
        if active == 0 {
            return Err(Status::Failed);
        }

        self.port.create_channel().map_err(|_| Status::Failed)?;
        Ok(active)
    }

    fn report_failed_sinks<S: SinkSet>(&self, sinks: &S, active: u32) {
        for index in 0..sinks.count() {
            if active & (1 << index) != 0 {
                continue;
            }
            if let Some(sink) = sinks.sink(index) {
                let _ = self.log(
                    LogLevel::Warn,
                    COMPONENT,
                    "init",
                    format_args!("Error initializing {} sink", sink.name()),
                );
            }
        }
    }

    /// Log a record.
    ///
    /// Levels below the threshold return `Ok(())` without doing any work.
    ///
    /// # Errors
    ///
    /// - [`Status::NotInitialized`] before a successful `init`
    /// - [`Status::Unsupported`] from interrupt context
    /// - [`Status::Busy`] when the producer lock is not acquired in time
    /// - [`Status::Failed`] when rendering fails; nothing is enqueued
    pub fn log(
        &self,
        level: LogLevel,
        component: &str,
        function: &str,
        args: fmt::Arguments<'_>,
    ) -> LogResult {
        self.admit()?;
        self.emit(level, component, function, args, Append::Truncate)
    }

    /// Log a diagnostic only if it fits in the channel in one piece.
    ///
    /// Returns [`Status::Busy`] and enqueues nothing when the channel does
    /// not have room for the whole record.
    pub(crate) fn log_whole(
        &self,
        level: LogLevel,
        component: &str,
        function: &str,
        args: fmt::Arguments<'_>,
    ) -> LogResult {
        self.admit()?;
        self.emit(level, component, function, args, Append::Whole)
    }

    /// Log with a raw numeric level (console commands, FFI).
    ///
    /// A value outside the enumeration returns [`Status::InvalidArgument`]
    /// and is itself reported as a warning.
    pub fn log_raw(
        &self,
        level: u8,
        component: &str,
        function: &str,
        args: fmt::Arguments<'_>,
    ) -> LogResult {
        self.admit()?;
        match LogLevel::from_u8(level) {
            Some(level) => self.emit(level, component, function, args, Append::Truncate),
            None => {
                let _ = self.emit(
                    LogLevel::Warn,
                    COMPONENT,
                    "log",
                    format_args!("Unknown level: {}", level),
                    Append::Truncate,
                );
                Err(Status::InvalidArgument)
            }
        }
    }

    /// Log `buffer` as hex, one record per 16 bytes.
    ///
    /// Stops at the first failing record and returns its status.
    pub fn dump_buffer(
        &self,
        level: LogLevel,
        component: &str,
        function: &str,
        buffer: &[u8],
    ) -> LogResult {
        buffer.chunks(DUMP_BYTES_PER_LINE).try_for_each(|chunk| {
            self.log(level, component, function, format_args!("{}", HexChunk(chunk)))
        })
    }

    /// Set the threshold. Safe from any context, even before `init`.
    pub fn set_level(&self, level: LogLevel) {
        self.threshold.store(level as u8, Ordering::Relaxed);
    }

    /// Set the threshold from a raw value.
    pub fn set_level_raw(&self, level: u8) -> LogResult {
        match LogLevel::from_u8(level) {
            Some(level) => {
                self.set_level(level);
                Ok(())
            }
            None => {
                let _ = self.log(
                    LogLevel::Warn,
                    COMPONENT,
                    "set_level",
                    format_args!("Invalid log level: {}", level),
                );
                Err(Status::InvalidArgument)
            }
        }
    }

    /// Current threshold.
    pub fn level(&self) -> LogLevel {
        LogLevel::from_u8(self.threshold.load(Ordering::Relaxed)).unwrap_or(LogLevel::Disabled)
    }

    /// True when a record at `level` would be emitted.
    #[inline]
    pub fn enabled(&self, level: LogLevel) -> bool {
        level != LogLevel::Disabled && level as u8 >= self.threshold.load(Ordering::Relaxed)
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        LifecycleState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// True once `init` succeeded.
    pub fn is_initialized(&self) -> bool {
        self.state() == LifecycleState::Ready
    }

    /// Bytes waiting in the channel.
    pub fn pending_bytes(&self) -> usize {
        self.channel.len()
    }

    /// Bytes lost to a full channel since the last report.
    pub fn dropped_bytes(&self) -> u32 {
        self.channel.dropped()
    }

    /// Configuration given to [`Logger::new`].
    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }

    /// Platform port.
    pub fn port(&self) -> &P {
        &self.port
    }

    pub(crate) fn channel(&self) -> &ByteRing<N> {
        &self.channel
    }

    // ========== Internal helpers ==========

    fn admit(&self) -> LogResult {
        if !self.is_initialized() {
            return Err(Status::NotInitialized);
        }
        if self.port.in_isr() {
            return Err(Status::Unsupported);
        }
        Ok(())
    }

    fn emit(
        &self,
        level: LogLevel,
        component: &str,
        function: &str,
        args: fmt::Arguments<'_>,
        append: Append,
    ) -> LogResult {
        if !self.enabled(level) {
            return Ok(());
        }

        let _lock = PortLock::acquire(&self.port, self.config.lock_timeout_ms)
            .ok_or(Status::Busy)?;

        // SAFETY: the port lock is held for the rest of this scope.
        let scratch = unsafe { &mut *self.scratch.get() };
        let header = RecordHeader {
            level,
            uptime_ms: self.port.uptime_ms(),
            component,
            function,
            color: self.config.color,
            time: self.config.time_source,
        };
        let len = render_record(scratch, &header, args)?;

        // Free space only grows while the lock is held.
        if append == Append::Whole && self.channel.free() < len {
            return Err(Status::Busy);
        }

        // SAFETY: appends are serialized by the port lock.
        unsafe {
            self.channel.append(&scratch[..len]);
        }
        self.port.signal_data();
        Ok(())
    }
}
