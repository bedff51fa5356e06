//! ESP32 clock implementation using the ESP-IDF timer.

use crate::traits::Clock;

/// ESP32 clock using the high-resolution hardware timer.
///
/// Uses `esp_timer_get_time()`, which returns microseconds since boot. Use
/// this where sub-tick resolution matters; [`TickClock`](crate::TickClock)
/// over [`FreeRtosTickSource`](super::FreeRtosTickSource) only advances once
/// per scheduler tick.
///
/// # Example
///
/// ```ignore
/// use device_layer::hal::esp32::Esp32Clock;
/// use device_layer::RealTimeClock;
///
/// let mut rt = RealTimeClock::new(Esp32Clock::new());
/// rt.set_real_time(sntp_time_us);
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct Esp32Clock;

impl Esp32Clock {
    /// Creates a new ESP32 clock instance.
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl Clock for Esp32Clock {
    #[inline]
    fn now_us(&self) -> u64 {
        // Safe: this is a simple read of the hardware timer, no side effects
        let micros = unsafe { esp_idf_hal::sys::esp_timer_get_time() };
        micros.max(0) as u64
    }
}
