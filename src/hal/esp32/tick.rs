//! FreeRTOS tick counter.

use esp_idf_sys::{
    configTICK_RATE_HZ, vTaskSetTimeOutState, xPortInIsrContext, xTaskGetTickCountFromISR,
    TickType_t, TimeOut_t,
};

use crate::traits::{TickSnapshot, TickSource};

/// Tick source backed by the FreeRTOS scheduler tick.
///
/// `snapshot` uses `vTaskSetTimeOutState`, which reads the tick count and
/// the scheduler's overflow count together inside a critical section.
///
/// # Example
///
/// ```ignore
/// use device_layer::hal::esp32::FreeRtosTickSource;
/// use device_layer::TickClock;
///
/// let clock = TickClock::new(FreeRtosTickSource::new())?;
/// let uptime_ms = clock.monotonic_ms();
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct FreeRtosTickSource;

impl FreeRtosTickSource {
    /// Creates a new FreeRTOS tick source.
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl TickSource for FreeRtosTickSource {
    #[inline]
    fn tick_bits(&self) -> u32 {
        (core::mem::size_of::<TickType_t>() * 8) as u32
    }

    #[inline]
    fn tick_rate_hz(&self) -> u32 {
        configTICK_RATE_HZ
    }

    fn snapshot(&self) -> TickSnapshot {
        let mut timeout = TimeOut_t::default();
        // Safe: fills a caller-owned struct under the scheduler lock. Task context only.
        unsafe { vTaskSetTimeOutState(&mut timeout) };
        TickSnapshot {
            raw: timeout.xTimeOnEntering as u32,
            overflow_count: timeout.xOverflowCount as u32,
        }
    }

    #[inline]
    fn raw_ticks_from_isr(&self) -> u32 {
        // Safe: the ISR variant of the tick read has no preconditions.
        unsafe { xTaskGetTickCountFromISR() as u32 }
    }

    #[inline]
    fn in_interrupt(&self) -> bool {
        // Safe: reads the current core's interrupt nesting state.
        unsafe { xPortInIsrContext() != 0 }
    }
}
