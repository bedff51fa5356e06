//! Platform time primitives.
//!
//! This module defines the only hardware interfaces the device layer
//! consumes. Everything above them (overflow correction, unit conversion,
//! real-time offsetting) is platform independent.
//!
//! # Key Traits
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | [`TickSource`] | Narrow, wrapping hardware tick counter |
//! | [`Clock`] | Monotonic microsecond/millisecond time source |
//!
//! # Implementation
//!
//! For testing and desktop development, use the mock implementations
//! from [`crate::hal::mock`]. For FreeRTOS on ESP32, use the
//! implementations from `hal::esp32` (requires `esp32` feature).
//!
//! # Example
//!
//! ```rust
//! use device_layer::traits::TickSource;
//! use device_layer::hal::MockTickSource;
//!
//! let mut ticks = MockTickSource::new(16, 1000);
//! ticks.advance(70_000); // wraps once at 65_536
//!
//! let snap = ticks.snapshot();
//! assert_eq!(snap.overflow_count, 1);
//! assert_eq!(snap.raw, 70_000 - 65_536);
//! ```

/// Raw tick value paired with the overflow count observed at the same instant.
///
/// Produced by [`TickSource::snapshot`], which the platform guarantees to be
/// atomic with respect to preemption.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct TickSnapshot {
    /// Raw counter value, less than `2^tick_bits`.
    pub raw: u32,
    /// Number of counter wraps since boot.
    pub overflow_count: u32,
}

impl TickSnapshot {
    /// Combine into a 64-bit tick count: `raw + (overflow_count << tick_bits)`.
    #[inline]
    pub const fn combine(&self, tick_bits: u32) -> u64 {
        self.raw as u64 + ((self.overflow_count as u64) << tick_bits)
    }
}

/// Hardware tick counter.
///
/// Abstracts the narrow, wrapping counter an RTOS scheduler maintains.
/// Implement this once per platform; [`TickClock`] turns it into a
/// monotonic 64-bit clock.
///
/// # Implementation Notes
///
/// - `snapshot()` must read the raw counter and the definitive overflow count
///   together, atomically with respect to preemption. It is only called from
///   normal (task) context.
/// - `raw_ticks_from_isr()` must be safe in interrupt context. It returns the
///   raw counter only; the overflow count is not available there.
/// - `in_interrupt()` should report the current execution context where the
///   platform can tell. Platforms that cannot should keep the default, which
///   always reports task context.
///
/// [`TickClock`]: crate::TickClock
pub trait TickSource {
    /// Width of the raw counter in bits (typically 16 or 32).
    fn tick_bits(&self) -> u32;

    /// Counter increment rate in Hz.
    fn tick_rate_hz(&self) -> u32;

    /// Read the raw counter together with the definitive overflow count.
    ///
    /// Task context only.
    fn snapshot(&self) -> TickSnapshot;

    /// Read the raw counter from interrupt context.
    fn raw_ticks_from_isr(&self) -> u32;

    /// Returns true when executing in interrupt context.
    fn in_interrupt(&self) -> bool {
        false
    }
}

/// Monotonic time source.
///
/// Provides time since boot in microseconds and milliseconds. The real-time
/// clock offsets one of these to produce absolute time.
///
/// # Example
///
/// ```rust
/// use device_layer::traits::Clock;
/// use device_layer::hal::MockClock;
///
/// let mut clock = MockClock::new();
/// assert_eq!(clock.now_us(), 0);
///
/// clock.advance_ms(100);
/// assert_eq!(clock.now_ms(), 100);
/// assert_eq!(clock.now_us(), 100_000);
/// ```
pub trait Clock {
    /// Returns microseconds since boot.
    ///
    /// Must be monotonically non-decreasing.
    fn now_us(&self) -> u64;

    /// Returns milliseconds since boot.
    fn now_ms(&self) -> u64 {
        self.now_us() / 1000
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    #[inline]
    fn now_us(&self) -> u64 {
        (**self).now_us()
    }

    #[inline]
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}
