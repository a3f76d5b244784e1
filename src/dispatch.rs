//! Consumer side: drain the channel and fan out to every sink.
//!
//! The dispatcher never loops on its own. The driving task calls
//! [`Dispatcher::step`] repeatedly and decides scheduling; a step blocks only
//! while the channel is empty.

use crate::config::{MAX_LINE_LEN, MAX_SINKS};
use crate::level::LogLevel;
use crate::logger::{Logger, COMPONENT};
use crate::port::Port;
use crate::sink::{Sink, SinkSet};
use crate::status::LogResult;

/// Single consumer of a [`Logger`]'s channel.
///
/// Created by [`Logger::init`]; owns the sink registry and the consumer
/// scratch buffer, so neither needs locking.
pub struct Dispatcher<'a, P: Port, S: SinkSet, const N: usize> {
    logger: &'a Logger<P, N>,
    sinks: S,
    /// Bit i set when sink i initialized.
    active: u32,
    scratch: [u8; MAX_LINE_LEN],
}

impl<'a, P: Port, S: SinkSet, const N: usize> Dispatcher<'a, P, S, N> {
    pub(crate) fn new(logger: &'a Logger<P, N>, sinks: S, active: u32) -> Self {
        Self {
            logger,
            sinks,
            active,
            scratch: [0; MAX_LINE_LEN],
        }
    }

    /// Process one dispatch step.
    ///
    /// 1. Smallest write size over the active sinks
    /// 2. Zero: return without draining (backpressure)
    /// 3. Drain up to that many bytes, blocking while the channel is empty
    /// 4. Write to every active sink, warn on short writes
    ///
    /// Always returns `Ok(())`: sink trouble is reported as log records.
    pub fn step(&mut self) -> LogResult {
        let safe_size = self.min_write_size();
        if safe_size == 0 {
            return Ok(());
        }

        let to_receive = safe_size.min(MAX_LINE_LEN);
        let logger = self.logger;
        // SAFETY: a Logger hands out exactly one Dispatcher, and `step`
        // takes `&mut self`, so this is the only reader.
        let received = unsafe {
            logger
                .channel()
                .drain(&mut self.scratch[..to_receive], || logger.port().wait_data())
        };

        self.write_all(received);
        self.report_dropped();
        Ok(())
    }

    /// Smallest write size over the active sinks (`usize::MAX` if none).
    pub fn min_write_size(&self) -> usize {
        (0..self.sinks.count())
            .filter(|&index| self.is_active(index))
            .filter_map(|index| self.sinks.sink(index))
            .map(|sink| sink.write_size())
            .min()
            .unwrap_or(usize::MAX)
    }

    /// True when sink `index` came up during init.
    pub fn is_active(&self, index: usize) -> bool {
        index < MAX_SINKS && self.active & (1 << index) != 0
    }

    pub fn logger(&self) -> &'a Logger<P, N> {
        self.logger
    }

    pub fn sinks(&self) -> &S {
        &self.sinks
    }

    pub fn sinks_mut(&mut self) -> &mut S {
        &mut self.sinks
    }

    /// Give the sinks back (e.g., to flush or inspect them).
    pub fn into_sinks(self) -> S {
        self.sinks
    }

    fn write_all(&mut self, len: usize) {
        let bytes = &self.scratch[..len];
        for index in 0..self.sinks.count() {
            if !self.is_active(index) {
                continue;
            }
            let Some(sink) = self.sinks.sink_mut(index) else {
                continue;
            };
            let written = sink.write(bytes);
            if written != len {
                warn_short_write(self.logger, sink, len, written);
            }
        }
    }

    /// Report truncated bytes once the report fits whole; until then the
    /// count keeps accumulating.
    fn report_dropped(&self) {
        let channel = self.logger.channel();
        let dropped = channel.dropped();
        if dropped == 0 {
            return;
        }
        let reported = self.logger.log_whole(
            LogLevel::Warn,
            COMPONENT,
            "step",
            format_args!("Dropped {} bytes (channel full)", dropped),
        );
        if reported.is_ok() {
            channel.forget_dropped(dropped);
        }
    }
}

fn warn_short_write<P: Port, const N: usize>(
    logger: &Logger<P, N>,
    sink: &dyn Sink,
    requested: usize,
    written: usize,
) {
    // Skipped rather than cut short when the channel is nearly full.
    let _ = logger.log_whole(
        LogLevel::Warn,
        COMPONENT,
        "step",
        format_args!(
            "Failure writing to sink {}: tried to write: {}, written: {}",
            sink.name(),
            requested,
            written
        ),
    );
}
