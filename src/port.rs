//! Platform port: the OS services the pipeline consumes.
//!
//! Implementations:
//! - [`crate::host::HostPort`] on std targets
//! - [`crate::esp::EspPort`] on ESP-IDF (FreeRTOS)

use crate::status::LogResult;

/// Platform services needed by the Logger.
///
/// The lock is a plain mutual-exclusion lock with a bounded wait; it does not
/// need to be reentrant. The data signal behaves like a binary semaphore:
/// `signal_data` may be called any number of times before `wait_data`, and a
/// signal sent before the wait starts must not be lost.
pub trait Port: Sync {
    /// Platform-specific bring-up hook, called first by `Logger::init`.
    fn init(&self) -> LogResult;

    /// Try to take the producer lock within `timeout_ms`.
    fn lock(&self, timeout_ms: u32) -> bool;

    /// Release the producer lock.
    fn unlock(&self);

    /// Milliseconds since boot, modulo 2^32.
    ///
    /// Wraps to zero after about 49.7 days; the record field shows the
    /// wrapped value.
    fn uptime_ms(&self) -> u32;

    /// True when called from interrupt context.
    fn in_isr(&self) -> bool;

    /// Create the wake-up primitive used by `wait_data`/`signal_data`.
    fn create_channel(&self) -> LogResult;

    /// Wake the consumer blocked in `wait_data`.
    fn signal_data(&self);

    /// Park the consumer until the next `signal_data`.
    fn wait_data(&self);
}

/// Held producer lock, released on drop.
pub(crate) struct PortLock<'a, P: Port> {
    port: &'a P,
}

impl<'a, P: Port> PortLock<'a, P> {
    pub(crate) fn acquire(port: &'a P, timeout_ms: u32) -> Option<Self> {
        port.lock(timeout_ms).then_some(Self { port })
    }
}

impl<P: Port> Drop for PortLock<'_, P> {
    fn drop(&mut self) {
        self.port.unlock();
    }
}
