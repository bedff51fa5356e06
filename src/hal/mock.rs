//! Mock implementations for testing without hardware.
//!
//! These test doubles let the clocks and the device layer run on a desktop
//! host with fully controlled time.
//!
//! # Available Mocks
//!
//! | Mock | Trait | Purpose |
//! |------|-------|---------|
//! | [`MockTickSource`] | [`TickSource`] | Wrapping counter with controllable overflow and context |
//! | [`MockClock`] | [`Clock`] | Controllable microsecond time source |
//!
//! # Example
//!
//! ```rust
//! use device_layer::{Config, DeviceLayer};
//! use device_layer::hal::MockTickSource;
//!
//! let mut device = DeviceLayer::new(MockTickSource::new(16, 1000), &Config::default()).unwrap();
//! device.tick_source_mut().advance(2_500);
//!
//! assert_eq!(device.monotonic_ms(), 2_500);
//! assert!(device.real_time_ms().is_err());
//! ```
//!
//! [`TickSource`]: crate::traits::TickSource
//! [`Clock`]: crate::traits::Clock

use crate::config::ClockConfig;
use crate::traits::{Clock, TickSnapshot, TickSource};

// ============================================================================
// Time Mocks
// ============================================================================

/// Mock tick counter.
///
/// Wraps at `2^tick_bits` like a hardware counter and counts the wraps.
/// The interrupt-context flag and the overflow count can be set directly to
/// drive the interrupt-context path.
///
/// # Example
///
/// ```rust
/// use device_layer::hal::MockTickSource;
/// use device_layer::traits::TickSource;
///
/// let mut ticks = MockTickSource::new(16, 1000);
/// ticks.advance(65_535);
/// assert_eq!(ticks.raw(), 65_535);
///
/// ticks.advance(2);
/// assert_eq!(ticks.raw(), 1);
/// assert_eq!(ticks.overflow_count(), 1);
/// assert_eq!(ticks.raw_ticks_from_isr(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct MockTickSource {
    raw: u32,
    overflow_count: u32,
    tick_bits: u32,
    tick_rate_hz: u32,
    in_interrupt: bool,
}

impl MockTickSource {
    /// Creates a counter of `tick_bits` width at zero.
    ///
    /// Invalid widths and rates are accepted here so that clock construction
    /// can be tested against them.
    pub fn new(tick_bits: u32, tick_rate_hz: u32) -> Self {
        Self {
            raw: 0,
            overflow_count: 0,
            tick_bits,
            tick_rate_hz,
            in_interrupt: false,
        }
    }

    /// Creates a counter with the configured width and rate.
    pub fn from_config(config: &ClockConfig) -> Self {
        Self::new(config.tick_bits, config.tick_rate_hz)
    }

    fn modulus(&self) -> u64 {
        1u64 << self.tick_bits.min(32)
    }

    /// Advances the counter, wrapping and counting overflows.
    pub fn advance(&mut self, ticks: u64) {
        let modulus = self.modulus();
        let total = u64::from(self.raw) + ticks;
        let wraps = u32::try_from(total / modulus).unwrap_or(u32::MAX);
        self.overflow_count = self.overflow_count.wrapping_add(wraps);
        self.raw = (total % modulus) as u32;
    }

    /// Current raw counter value.
    pub fn raw(&self) -> u32 {
        self.raw
    }

    /// Wraps counted so far.
    pub fn overflow_count(&self) -> u32 {
        self.overflow_count
    }

    /// Forces the overflow count.
    pub fn set_overflow_count(&mut self, count: u32) {
        self.overflow_count = count;
    }

    /// Simulates entering or leaving interrupt context.
    pub fn set_in_interrupt(&mut self, in_interrupt: bool) {
        self.in_interrupt = in_interrupt;
    }
}

impl TickSource for MockTickSource {
    fn tick_bits(&self) -> u32 {
        self.tick_bits
    }

    fn tick_rate_hz(&self) -> u32 {
        self.tick_rate_hz
    }

    fn snapshot(&self) -> TickSnapshot {
        TickSnapshot {
            raw: self.raw,
            overflow_count: self.overflow_count,
        }
    }

    fn raw_ticks_from_isr(&self) -> u32 {
        self.raw
    }

    fn in_interrupt(&self) -> bool {
        self.in_interrupt
    }
}

/// Mock clock for testing.
///
/// Provides controllable time for testing timeouts and real-time offsets.
///
/// # Example
///
/// ```rust
/// use device_layer::hal::MockClock;
/// use device_layer::traits::Clock;
///
/// let mut clock = MockClock::new();
/// assert_eq!(clock.now_ms(), 0);
///
/// clock.set_ms(1000);
/// assert_eq!(clock.now_ms(), 1000);
///
/// clock.advance_us(500);
/// assert_eq!(clock.now_us(), 1_000_500);
/// ```
#[derive(Debug, Clone)]
pub struct MockClock {
    current_us: u64,
}

impl MockClock {
    /// Creates a new mock clock starting at 0.
    pub fn new() -> Self {
        Self { current_us: 0 }
    }

    /// Sets the current time in microseconds.
    pub fn set_us(&mut self, us: u64) {
        self.current_us = us;
    }

    /// Sets the current time in milliseconds.
    pub fn set_ms(&mut self, ms: u64) {
        self.current_us = ms * 1000;
    }

    /// Advances the clock by the given number of microseconds.
    pub fn advance_us(&mut self, us: u64) {
        self.current_us += us;
    }

    /// Advances the clock by the given number of milliseconds.
    pub fn advance_ms(&mut self, ms: u64) {
        self.current_us += ms * 1000;
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now_us(&self) -> u64 {
        self.current_us
    }
}
