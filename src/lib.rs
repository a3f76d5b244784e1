//! # RtLogPipeline
//!
//! Allocation-free log pipeline for real-time, memory-constrained devices.
//!
//! ## Architecture
//!
//! ```text
//! producers (any task)         channel            log task
//! ────────────────────         ───────            ────────
//! rt_info!() ─▶ Logger ───▶ [ 4 KiB bytes ] ───▶ Dispatcher::step() ─▶ sinks
//!               filter, lock,                      min write size,
//!               render 224 B                       drain, fan out
//! ```
//!
//! - Producers never wait on I/O: the only wait is the bounded producer lock
//! - The dispatcher is the single consumer and idles inside the drain
//! - Worst case is loss (truncation on a full channel), never corruption
//!
//! Platform services come from a [`Port`]: [`host::HostPort`] on std,
//! `esp::EspPort` on ESP-IDF.

#![cfg_attr(not(any(test, feature = "std")), no_std)]

#[macro_use]
pub mod macros;

pub mod bridge;
pub mod channel;
pub mod config;
pub mod dispatch;
pub mod format;
pub mod level;
pub mod logger;
pub mod port;
pub mod sink;
pub mod status;

#[cfg(feature = "std")]
pub mod host;

#[cfg(target_os = "espidf")]
pub mod esp;

pub use bridge::LogBridge;
pub use channel::ByteRing;
pub use config::{LoggerConfig, UartSinkConfig};
pub use dispatch::Dispatcher;
pub use format::{NoTime, TimeSource};
pub use level::LogLevel;
pub use logger::{LifecycleState, Logger};
pub use port::Port;
pub use sink::{MemorySink, Sink, SinkSet};
pub use status::{LogResult, Status};
