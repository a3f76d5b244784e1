//! Output sinks and the build-time sink registry.
//!
//! A sink receives raw rendered bytes from the dispatcher. The registry is a
//! [`SinkSet`]: a fixed array of one sink type, or a tuple of up to four
//! different sink types. Both are resolved statically.

use crate::status::LogResult;

/// Output destination for rendered log bytes.
pub trait Sink {
    /// Name used in diagnostics.
    fn name(&self) -> &str;

    /// Bring the sink up. Called once, in registry order.
    fn init(&mut self) -> LogResult;

    /// Bytes the sink can accept right now without blocking.
    fn write_size(&self) -> usize;

    /// Write `bytes`, returning how many were accepted.
    fn write(&mut self, bytes: &[u8]) -> usize;
}

impl<T: Sink + ?Sized> Sink for &mut T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn init(&mut self) -> LogResult {
        (**self).init()
    }

    fn write_size(&self) -> usize {
        (**self).write_size()
    }

    fn write(&mut self, bytes: &[u8]) -> usize {
        (**self).write(bytes)
    }
}

/// Fixed collection of sinks known at build time.
pub trait SinkSet {
    /// Number of registered sinks.
    fn count(&self) -> usize;

    /// Sink at `index`, in registry order.
    fn sink(&self, index: usize) -> Option<&dyn Sink>;

    /// Mutable sink at `index`, in registry order.
    fn sink_mut(&mut self, index: usize) -> Option<&mut dyn Sink>;
}

impl<S: Sink, const K: usize> SinkSet for [S; K] {
    fn count(&self) -> usize {
        K
    }

    fn sink(&self, index: usize) -> Option<&dyn Sink> {
        self.get(index).map(|s| s as &dyn Sink)
    }

    fn sink_mut(&mut self, index: usize) -> Option<&mut dyn Sink> {
        self.get_mut(index).map(|s| s as &mut dyn Sink)
    }
}

macro_rules! impl_sink_set_for_tuple {
    ($count:expr; $($idx:tt $ty:ident),+) => {
        impl<$($ty: Sink),+> SinkSet for ($($ty,)+) {
            fn count(&self) -> usize {
                $count
            }

            fn sink(&self, index: usize) -> Option<&dyn Sink> {
                match index {
                    $($idx => Some(&self.$idx as &dyn Sink),)+
                    _ => None,
                }
            }

            fn sink_mut(&mut self, index: usize) -> Option<&mut dyn Sink> {
                match index {
                    $($idx => Some(&mut self.$idx as &mut dyn Sink),)+
                    _ => None,
                }
            }
        }
    };
}

impl_sink_set_for_tuple!(1; 0 A);
impl_sink_set_for_tuple!(2; 0 A, 1 B);
impl_sink_set_for_tuple!(3; 0 A, 1 B, 2 C);
impl_sink_set_for_tuple!(4; 0 A, 1 B, 2 C, 3 D);

/// RAM sink with a fixed capacity.
///
/// Accepts bytes until full, then reports zero write size. Useful for
/// capturing the log in memory (crash dumps, tests).
pub struct MemorySink<const N: usize> {
    name: &'static str,
    buf: [u8; N],
    len: usize,
}

impl<const N: usize> MemorySink<N> {
    /// Create empty sink
    pub const fn new() -> Self {
        Self::named("Memory")
    }

    pub const fn named(name: &'static str) -> Self {
        Self {
            name,
            buf: [0; N],
            len: 0,
        }
    }

    /// Captured bytes.
    pub fn contents(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// Captured bytes as text (empty if not UTF-8).
    pub fn as_str(&self) -> &str {
        core::str::from_utf8(self.contents()).unwrap_or("")
    }

    /// Iterate over captured records, terminators stripped.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.as_str()
            .split("\r\n")
            .filter(|line| !line.is_empty())
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Forget captured bytes
    pub fn clear(&mut self) {
        self.len = 0;
    }
}

impl<const N: usize> Default for MemorySink<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Sink for MemorySink<N> {
    fn name(&self) -> &str {
        self.name
    }

    fn init(&mut self) -> LogResult {
        self.len = 0;
        Ok(())
    }

    fn write_size(&self) -> usize {
        N - self.len
    }

    fn write(&mut self, bytes: &[u8]) -> usize {
        let count = bytes.len().min(N - self.len);
        self.buf[self.len..self.len + count].copy_from_slice(&bytes[..count]);
        self.len += count;
        count
    }
}
