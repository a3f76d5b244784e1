//! Transfer channel: bounded byte FIFO between producers and the dispatcher.
//!
//! # Architecture
//!
//! ```text
//! Producers            ByteRing             Dispatcher
//! ─────────            ────────             ──────────
//!
//! log() ──(lock)────▶ [rec0][rec1][re…] ──▶ drain() ──▶ sinks
//! never waits          fixed N bytes         blocks while empty
//! for space            truncates when full
//! ```
//!
//! The ring itself is single-producer/single-consumer. Producers are
//! serialized by the Logger's producer lock; the Dispatcher is the only
//! reader. A record is copied in full before the write index moves, so the
//! reader never sees half of an append.

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

use crate::config::CHANNEL_CAPACITY;

/// Lock-free SPSC byte ring.
pub struct ByteRing<const N: usize = CHANNEL_CAPACITY> {
    bytes: UnsafeCell<[u8; N]>,
    /// Total bytes ever written (wraps, masked on use).
    write_idx: AtomicUsize,
    /// Total bytes ever read (wraps, masked on use).
    read_idx: AtomicUsize,
    /// Bytes discarded because the ring was full.
    dropped: AtomicU32,
}

// SAFETY: One writer at a time and one reader, coordinated through the
// indices. `append` and `read` are unsafe and state that contract.
unsafe impl<const N: usize> Sync for ByteRing<N> {}
unsafe impl<const N: usize> Send for ByteRing<N> {}

impl<const N: usize> ByteRing<N> {
    const MASK: usize = N - 1;

    /// Create a new empty ring.
    ///
    /// # Panics
    ///
    /// Panics if N is not a power of 2 (at compile time for a `static`).
    pub const fn new() -> Self {
        assert!(N.is_power_of_two(), "Channel capacity must be power of 2");

        Self {
            bytes: UnsafeCell::new([0; N]),
            write_idx: AtomicUsize::new(0),
            read_idx: AtomicUsize::new(0),
            dropped: AtomicU32::new(0),
        }
    }

    /// Copy as many bytes as fit, never blocks.
    ///
    /// Returns the number of bytes accepted; the rest is counted as dropped.
    ///
    /// # Safety
    ///
    /// At most one context may call `append` at a time.
    pub unsafe fn append(&self, data: &[u8]) -> usize {
        let write = self.write_idx.load(Ordering::Relaxed);
        let read = self.read_idx.load(Ordering::Acquire);
        let free = N - write.wrapping_sub(read);
        let accepted = data.len().min(free);

        if accepted < data.len() {
            self.dropped
                .fetch_add((data.len() - accepted) as u32, Ordering::Relaxed);
        }
        if accepted == 0 {
            return 0;
        }

        let start = write & Self::MASK;
        let first = accepted.min(N - start);
        // SAFETY: single writer; the region [write, write + accepted) is free
        // so the reader does not touch it until write_idx is published.
        unsafe {
            let ring = &mut *self.bytes.get();
            ring[start..start + first].copy_from_slice(&data[..first]);
            ring[..accepted - first].copy_from_slice(&data[first..accepted]);
        }

        self.write_idx
            .store(write.wrapping_add(accepted), Ordering::Release);
        accepted
    }

    /// Read up to `buf.len()` bytes without blocking.
    ///
    /// # Safety
    ///
    /// At most one context may call `read` (or `drain`) at a time.
    pub unsafe fn read(&self, buf: &mut [u8]) -> usize {
        let read = self.read_idx.load(Ordering::Relaxed);
        let write = self.write_idx.load(Ordering::Acquire);
        let count = buf.len().min(write.wrapping_sub(read));
        if count == 0 {
            return 0;
        }

        let start = read & Self::MASK;
        let first = count.min(N - start);
        // SAFETY: single reader; [read, read + count) was published by the
        // writer's Release store and is not reused until read_idx moves.
        unsafe {
            let ring = &*self.bytes.get();
            buf[..first].copy_from_slice(&ring[start..start + first]);
            buf[first..count].copy_from_slice(&ring[..count - first]);
        }

        self.read_idx.store(read.wrapping_add(count), Ordering::Release);
        count
    }

    /// Block until at least one byte is available, then read up to
    /// `buf.len()` bytes.
    ///
    /// `wait` parks the caller until a producer signals new data. Spurious
    /// returns from `wait` are fine: the ring is re-checked every time.
    ///
    /// # Safety
    ///
    /// Same contract as [`ByteRing::read`].
    pub unsafe fn drain(&self, buf: &mut [u8], mut wait: impl FnMut()) -> usize {
        if buf.is_empty() {
            return 0;
        }
        loop {
            // SAFETY: forwarded from the caller.
            let count = unsafe { self.read(buf) };
            if count > 0 {
                return count;
            }
            wait();
        }
    }

    /// Bytes waiting to be drained.
    #[inline]
    pub fn len(&self) -> usize {
        let read = self.read_idx.load(Ordering::Acquire);
        let write = self.write_idx.load(Ordering::Acquire);
        write.wrapping_sub(read)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes that can be appended right now.
    #[inline]
    pub fn free(&self) -> usize {
        N - self.len()
    }

    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Get count of dropped bytes.
    #[inline]
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Return the dropped count and reset it (e.g., after reporting).
    #[inline]
    pub fn take_dropped(&self) -> u32 {
        self.dropped.swap(0, Ordering::Relaxed)
    }

    /// Subtract `count` already reported bytes, keeping drops that happened
    /// since the count was read.
    #[inline]
    pub fn forget_dropped(&self, count: u32) {
        self.dropped.fetch_sub(count, Ordering::Relaxed);
    }
}

impl<const N: usize> Default for ByteRing<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_all<const N: usize>(ring: &ByteRing<N>) -> Vec<u8> {
        let mut out = Vec::new();
        let mut buf = [0u8; 7];
        loop {
            let n = unsafe { ring.read(&mut buf) };
            if n == 0 {
                return out;
            }
            out.extend_from_slice(&buf[..n]);
        }
    }

    #[test]
    fn test_ring_basic_fifo() {
        let ring = ByteRing::<16>::new();

        assert_eq!(unsafe { ring.append(b"abc") }, 3);
        assert_eq!(unsafe { ring.append(b"def") }, 3);
        assert_eq!(ring.len(), 6);
        assert_eq!(ring.free(), 10);

        assert_eq!(read_all(&ring), b"abcdef");
        assert!(ring.is_empty());
    }

    #[test]
    fn test_ring_full_truncates_and_counts() {
        let ring = ByteRing::<8>::new();

        assert_eq!(unsafe { ring.append(b"12345") }, 5);
        assert_eq!(unsafe { ring.append(b"6789") }, 3);
        assert_eq!(ring.dropped(), 1);
        assert_eq!(unsafe { ring.append(b"x") }, 0);
        assert_eq!(ring.dropped(), 2);

        assert_eq!(read_all(&ring), b"12345678");
        assert_eq!(ring.take_dropped(), 2);
        assert_eq!(ring.dropped(), 0);
    }

    #[test]
    fn test_forget_dropped_keeps_newer_drops() {
        let ring = ByteRing::<4>::new();

        unsafe { ring.append(b"123456") };
        let reported = ring.dropped();
        assert_eq!(reported, 2);

        unsafe { ring.append(b"7") };
        ring.forget_dropped(reported);
        assert_eq!(ring.dropped(), 1);
    }

    #[test]
    fn test_ring_wrap_around() {
        let ring = ByteRing::<8>::new();
        let mut buf = [0u8; 8];

        unsafe {
            ring.append(b"abcdef");
            assert_eq!(ring.read(&mut buf[..4]), 4);
            assert_eq!(&buf[..4], b"abcd");

            // crosses the end of the backing array
            assert_eq!(ring.append(b"ghijk"), 5);
        }
        assert_eq!(read_all(&ring), b"efghijk");
    }

    #[test]
    fn test_drain_returns_without_waiting_when_data_present() {
        let ring = ByteRing::<16>::new();
        unsafe { ring.append(b"hello") };

        let mut buf = [0u8; 3];
        let n = unsafe { ring.drain(&mut buf, || panic!("must not wait")) };
        assert_eq!(&buf[..n], b"hel");
    }

    #[test]
    fn test_drain_blocks_until_producer_appends() {
        use std::sync::atomic::{AtomicBool, Ordering};
        use std::sync::Arc;
        use std::thread;
        use std::time::Duration;

        let ring = Arc::new(ByteRing::<64>::new());
        let started = Arc::new(AtomicBool::new(false));

        let producer = {
            let ring = Arc::clone(&ring);
            let started = Arc::clone(&started);
            thread::spawn(move || {
                while !started.load(Ordering::Acquire) {
                    thread::yield_now();
                }
                thread::sleep(Duration::from_millis(10));
                unsafe { ring.append(b"late") };
            })
        };

        let mut buf = [0u8; 16];
        let n = unsafe {
            ring.drain(&mut buf, || {
                started.store(true, Ordering::Release);
                thread::sleep(Duration::from_millis(1));
            })
        };
        producer.join().unwrap();

        assert!(n > 0);
        assert!(b"late".starts_with(&buf[..n]));
    }
}
