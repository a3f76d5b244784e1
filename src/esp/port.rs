//! FreeRTOS port.
//!
//! - Producer lock: FreeRTOS mutex (priority inheritance), bounded take
//! - Data signal: binary semaphore given by producers, taken by the log task
//! - Uptime: `esp_timer_get_time()`
//! - ISR detection: `interrupt::active()`
//!
//! Both handles are created once and never deleted.

use core::ptr;
use core::sync::atomic::{AtomicPtr, Ordering};

use esp_idf_svc::hal::delay::{TickType, BLOCK};
use esp_idf_svc::hal::interrupt;
use esp_idf_svc::sys;

use crate::port::Port;
use crate::status::{LogResult, Status};

// queue.h: queueQUEUE_TYPE_MUTEX / queueQUEUE_TYPE_BINARY_SEMAPHORE / queueSEND_TO_BACK
const QUEUE_TYPE_MUTEX: u8 = 1;
const QUEUE_TYPE_BINARY_SEMAPHORE: u8 = 3;
const SEND_TO_BACK: sys::BaseType_t = 0;
const PD_TRUE: sys::BaseType_t = 1;

/// [`Port`] on top of ESP-IDF FreeRTOS.
pub struct EspPort {
    mutex: AtomicPtr<sys::QueueDefinition>,
    data: AtomicPtr<sys::QueueDefinition>,
}

impl EspPort {
    pub const fn new() -> Self {
        Self {
            mutex: AtomicPtr::new(ptr::null_mut()),
            data: AtomicPtr::new(ptr::null_mut()),
        }
    }

    fn give(handle: sys::QueueHandle_t) {
        if handle.is_null() {
            return;
        }
        // SAFETY: handle was created by xQueueCreateMutex/xQueueGenericCreate
        // and is never deleted.
        unsafe {
            sys::xQueueGenericSend(handle, ptr::null(), 0, SEND_TO_BACK);
        }
    }

    fn take(handle: sys::QueueHandle_t, ticks: sys::TickType_t) -> bool {
        if handle.is_null() {
            return false;
        }
        // SAFETY: see `give`.
        unsafe { sys::xQueueSemaphoreTake(handle, ticks) == PD_TRUE }
    }
}

impl Default for EspPort {
    fn default() -> Self {
        Self::new()
    }
}

impl Port for EspPort {
    fn init(&self) -> LogResult {
        if !self.mutex.load(Ordering::Acquire).is_null() {
            return Ok(());
        }
        // SAFETY: plain FreeRTOS object creation.
        let handle = unsafe { sys::xQueueCreateMutex(QUEUE_TYPE_MUTEX) };
        if handle.is_null() {
            return Err(Status::Failed);
        }
        self.mutex.store(handle, Ordering::Release);
        Ok(())
    }

    fn lock(&self, timeout_ms: u32) -> bool {
        let ticks = TickType::new_millis(u64::from(timeout_ms)).ticks();
        Self::take(self.mutex.load(Ordering::Acquire), ticks)
    }

    fn unlock(&self) {
        Self::give(self.mutex.load(Ordering::Acquire));
    }

    fn uptime_ms(&self) -> u32 {
        // SAFETY: esp_timer_get_time is always safe to call
        let now_us = unsafe { sys::esp_timer_get_time() };
        // low 32 bits, wraps after ~49.7 days
        ((now_us / 1000) as u64 & u64::from(u32::MAX)) as u32
    }

    fn in_isr(&self) -> bool {
        interrupt::active()
    }

    fn create_channel(&self) -> LogResult {
        if !self.data.load(Ordering::Acquire).is_null() {
            return Ok(());
        }
        // SAFETY: plain FreeRTOS object creation.
        let handle = unsafe { sys::xQueueGenericCreate(1, 0, QUEUE_TYPE_BINARY_SEMAPHORE) };
        if handle.is_null() {
            return Err(Status::Failed);
        }
        self.data.store(handle, Ordering::Release);
        Ok(())
    }

    fn signal_data(&self) {
        Self::give(self.data.load(Ordering::Acquire));
    }

    fn wait_data(&self) {
        Self::take(self.data.load(Ordering::Acquire), BLOCK);
    }
}
