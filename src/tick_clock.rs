//! Overflow-corrected monotonic clock.
//!
//! [`TickClock`] turns a narrow, wrapping [`TickSource`] into a 64-bit tick
//! count and derives microsecond and millisecond time from it.
//!
//! # Interrupt Context
//!
//! The definitive overflow count can only be read from task context. Every
//! task-context read caches it; interrupt-context reads combine the raw
//! counter with that cached value. If the counter wrapped since the last
//! task-context read, an interrupt-context reading is one wrap period short.
//! Readings taken this way are tagged [`Accuracy::BestEffort`].
//!
//! # Example
//!
//! ```rust
//! use device_layer::{TickClock, Accuracy};
//! use device_layer::hal::MockTickSource;
//!
//! let mut clock = TickClock::new(MockTickSource::new(16, 1000)).unwrap();
//! clock.source_mut().advance(65_536 + 10);
//!
//! let reading = clock.read_ticks();
//! assert_eq!(reading.ticks, 65_546);
//! assert_eq!(reading.accuracy, Accuracy::Exact);
//! assert_eq!(clock.monotonic_ms(), 65_546);
//! ```

use core::sync::atomic::{AtomicU32, Ordering};

use crate::error::{Error, Result};
use crate::traits::{Clock, TickSource};

const US_PER_SEC: u128 = 1_000_000;
const MS_PER_SEC: u128 = 1_000;

/// How much a [`TickReading`] can be trusted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Accuracy {
    /// Read in task context with the definitive overflow count.
    Exact,
    /// Read in interrupt context with the cached overflow count. May be one
    /// wrap period behind.
    BestEffort,
}

/// A 64-bit tick count and how it was obtained.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickReading {
    /// Overflow-corrected ticks since boot.
    pub ticks: u64,
    /// Whether the overflow count was definitive.
    pub accuracy: Accuracy,
}

/// Monotonic clock over a wrapping hardware counter.
///
/// Owns its tick source and the cached overflow count. Monotonicity across
/// calls holds as long as the counter wraps at most once between two
/// task-context reads.
#[derive(Debug)]
pub struct TickClock<S: TickSource> {
    source: S,
    tick_bits: u32,
    tick_rate_hz: u32,
    cached_overflows: AtomicU32,
}

impl<S: TickSource> TickClock<S> {
    /// Wrap a tick source.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidParameter`] if the source reports a zero tick rate or
    /// a counter width outside `1..=32`.
    pub fn new(source: S) -> Result<Self> {
        let tick_rate_hz = source.tick_rate_hz();
        let tick_bits = source.tick_bits();
        if tick_rate_hz == 0 {
            return Err(Error::InvalidParameter("tick rate must be non-zero"));
        }
        if !(1..=32).contains(&tick_bits) {
            return Err(Error::InvalidParameter("tick width must be 1..=32 bits"));
        }
        Ok(Self {
            source,
            tick_bits,
            tick_rate_hz,
            cached_overflows: AtomicU32::new(0),
        })
    }

    /// Borrow the tick source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Mutably borrow the tick source.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Consume the clock and return its tick source.
    pub fn into_source(self) -> S {
        self.source
    }

    /// Counter width in bits.
    pub fn tick_bits(&self) -> u32 {
        self.tick_bits
    }

    /// Counter rate in Hz.
    pub fn tick_rate_hz(&self) -> u32 {
        self.tick_rate_hz
    }

    /// Read ticks since boot, choosing the path by execution context.
    pub fn read_ticks(&self) -> TickReading {
        if self.source.in_interrupt() {
            self.ticks_from_isr()
        } else {
            let snap = self.source.snapshot();
            self.cached_overflows
                .store(snap.overflow_count, Ordering::Relaxed);
            TickReading {
                ticks: snap.combine(self.tick_bits),
                accuracy: Accuracy::Exact,
            }
        }
    }

    /// Interrupt-context read using the cached overflow count.
    ///
    /// Always [`Accuracy::BestEffort`], even when called from task context.
    pub fn ticks_from_isr(&self) -> TickReading {
        let raw = self.source.raw_ticks_from_isr();
        let overflows = self.cached_overflows.load(Ordering::Relaxed);
        TickReading {
            ticks: combine(raw, overflows, self.tick_bits),
            accuracy: Accuracy::BestEffort,
        }
    }

    /// Overflow-corrected ticks since boot.
    #[inline]
    pub fn ticks_since_boot(&self) -> u64 {
        self.read_ticks().ticks
    }

    /// Microseconds since boot.
    pub fn monotonic_us(&self) -> u64 {
        self.ticks_to_units(self.ticks_since_boot(), US_PER_SEC)
    }

    /// Milliseconds since boot.
    pub fn monotonic_ms(&self) -> u64 {
        self.ticks_to_units(self.ticks_since_boot(), MS_PER_SEC)
    }

    /// High-resolution monotonic time. Tick-based platforms have no finer
    /// source, so this equals [`monotonic_us`](Self::monotonic_us).
    pub fn monotonic_hires_us(&self) -> u64 {
        self.monotonic_us()
    }

    /// Convert a tick count to `units_per_sec` units, truncating.
    ///
    /// The product is computed in 128 bits so it cannot overflow.
    fn ticks_to_units(&self, ticks: u64, units_per_sec: u128) -> u64 {
        let units = u128::from(ticks) * units_per_sec / u128::from(self.tick_rate_hz);
        u64::try_from(units).unwrap_or(u64::MAX)
    }
}

impl<S: TickSource> Clock for TickClock<S> {
    fn now_us(&self) -> u64 {
        self.monotonic_us()
    }

    fn now_ms(&self) -> u64 {
        self.monotonic_ms()
    }
}

#[inline]
fn combine(raw: u32, overflows: u32, tick_bits: u32) -> u64 {
    u64::from(raw) + (u64::from(overflows) << tick_bits)
}
