//! Host port for std targets: desktop tools, simulators and tests.
//!
//! - Producer lock: `Mutex<bool>` + `Condvar`, timed wait
//! - Data signal: binary semaphore on `Mutex<bool>` + `Condvar`
//! - Interrupt context: simulated per thread (`enter_isr`/`leave_isr`)

use core::fmt;
use std::cell::Cell;
use std::io::Write as _;
use std::sync::{Condvar, Mutex, OnceLock};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use crate::format::TimeSource;
use crate::port::Port;
use crate::sink::Sink;
use crate::status::LogResult;

std::thread_local! {
    static IN_ISR: Cell<bool> = const { Cell::new(false) };
}

/// [`Port`] built on std synchronization primitives.
pub struct HostPort {
    held: Mutex<bool>,
    released: Condvar,
    data: Mutex<bool>,
    data_ready: Condvar,
    epoch: OnceLock<Instant>,
}

impl HostPort {
    pub const fn new() -> Self {
        Self {
            held: Mutex::new(false),
            released: Condvar::new(),
            data: Mutex::new(false),
            data_ready: Condvar::new(),
            epoch: OnceLock::new(),
        }
    }

    /// Mark the calling thread as running in interrupt context.
    pub fn enter_isr() {
        IN_ISR.with(|flag| flag.set(true));
    }

    /// Leave simulated interrupt context.
    pub fn leave_isr() {
        IN_ISR.with(|flag| flag.set(false));
    }
}

impl Default for HostPort {
    fn default() -> Self {
        Self::new()
    }
}

impl Port for HostPort {
    fn init(&self) -> LogResult {
        self.epoch.get_or_init(Instant::now);
        Ok(())
    }

    fn lock(&self, timeout_ms: u32) -> bool {
        let Ok(held) = self.held.lock() else {
            return false;
        };
        let timeout = Duration::from_millis(u64::from(timeout_ms));
        match self.released.wait_timeout_while(held, timeout, |held| *held) {
            Ok((mut held, _)) if !*held => {
                *held = true;
                true
            }
            _ => false,
        }
    }

    fn unlock(&self) {
        if let Ok(mut held) = self.held.lock() {
            *held = false;
        }
        self.released.notify_one();
    }

    fn uptime_ms(&self) -> u32 {
        let epoch = self.epoch.get_or_init(Instant::now);
        // low 32 bits: wraps like the device timer field
        (epoch.elapsed().as_millis() & u128::from(u32::MAX)) as u32
    }

    fn in_isr(&self) -> bool {
        IN_ISR.with(Cell::get)
    }

    fn create_channel(&self) -> LogResult {
        if let Ok(mut ready) = self.data.lock() {
            *ready = false;
        }
        Ok(())
    }

    fn signal_data(&self) {
        if let Ok(mut ready) = self.data.lock() {
            *ready = true;
        }
        self.data_ready.notify_one();
    }

    fn wait_data(&self) {
        let Ok(ready) = self.data.lock() else {
            return;
        };
        if let Ok(mut ready) = self.data_ready.wait_while(ready, |ready| !*ready) {
            *ready = false;
        }
    }
}

/// Sink writing to the process stdout.
#[derive(Debug, Default)]
pub struct StdoutSink;

impl Sink for StdoutSink {
    fn name(&self) -> &str {
        "Stdout"
    }

    fn init(&mut self) -> LogResult {
        Ok(())
    }

    fn write_size(&self) -> usize {
        usize::MAX
    }

    fn write(&mut self, bytes: &[u8]) -> usize {
        let mut out = std::io::stdout().lock();
        match out.write_all(bytes).and_then(|_| out.flush()) {
            Ok(()) => bytes.len(),
            Err(_) => 0,
        }
    }
}

/// Wall-clock `HH:MM:SS` (UTC) time prefix.
#[derive(Clone, Copy, Debug, Default)]
pub struct UtcClock;

impl TimeSource for UtcClock {
    fn write_time(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let day = secs % 86_400;
        write!(out, "{:02}:{:02}:{:02}", day / 3600, (day / 60) % 60, day % 60)
    }
}
