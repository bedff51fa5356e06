//! Real (wall-clock) time as an offset from boot.
//!
//! [`RealTimeClock`] stores the real time at which the device booted and adds
//! monotonic elapsed time to it. Until a sync arrives there is no real time,
//! and reads fail with [`Error::NotSynced`].
//!
//! # Example
//!
//! ```rust
//! use device_layer::{RealTimeClock, Error};
//! use device_layer::hal::MockClock;
//!
//! let mut clock = MockClock::new();
//! clock.advance_ms(5);
//!
//! let mut rt = RealTimeClock::new(clock);
//! assert_eq!(rt.real_time_us(), Err(Error::NotSynced));
//!
//! rt.set_real_time(1_700_000_000_000_000);
//! assert_eq!(rt.real_time_us(), Ok(1_700_000_000_000_000));
//!
//! rt.clock_mut().advance_ms(1);
//! assert_eq!(rt.real_time_ms(), Ok(1_700_000_000_001));
//! ```

use log::debug;

use crate::error::{Error, Result};
use crate::traits::Clock;

/// Real-time clock layered over a monotonic [`Clock`].
#[derive(Debug)]
pub struct RealTimeClock<C: Clock> {
    clock: C,
    boot_offset_us: Option<u64>,
}

impl<C: Clock> RealTimeClock<C> {
    /// Create an unsynchronized real-time clock.
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            boot_offset_us: None,
        }
    }

    /// Borrow the underlying monotonic clock.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Mutably borrow the underlying monotonic clock.
    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    /// Consume and return the underlying monotonic clock.
    pub fn into_clock(self) -> C {
        self.clock
    }

    /// Returns true once a valid sync has been applied.
    pub fn is_synced(&self) -> bool {
        self.boot_offset_us.is_some()
    }

    /// Real time at boot, in microseconds, if synchronized.
    pub fn boot_offset_us(&self) -> Option<u64> {
        self.boot_offset_us
    }

    /// Current real time in microseconds.
    ///
    /// # Errors
    ///
    /// [`Error::NotSynced`] before the first valid sync or after a desync.
    pub fn real_time_us(&self) -> Result<u64> {
        let offset = self.boot_offset_us.ok_or(Error::NotSynced)?;
        Ok(offset.saturating_add(self.clock.now_us()))
    }

    /// Current real time in milliseconds, truncating.
    pub fn real_time_ms(&self) -> Result<u64> {
        self.real_time_us().map(|us| us / 1000)
    }

    /// Synchronize to an absolute time in microseconds.
    ///
    /// A value not strictly after the current monotonic time would place the
    /// boot instant at or before zero. The clock is desynchronized instead.
    pub fn set_real_time(&mut self, absolute_us: u64) {
        let since_boot_us = self.clock.now_us();
        if absolute_us > since_boot_us {
            self.boot_offset_us = Some(absolute_us - since_boot_us);
        } else {
            debug!(
                "real time {} us predates boot ({} us elapsed); desynchronizing",
                absolute_us, since_boot_us
            );
            self.boot_offset_us = None;
        }
    }

    /// Drop synchronization.
    pub fn clear(&mut self) {
        self.boot_offset_us = None;
    }
}
