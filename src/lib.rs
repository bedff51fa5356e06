//! # device-layer
//!
//! Device-local time and connectivity core for RTOS-based connected devices.
//!
//! ## Features
//!
//! - **Overflow-corrected ticks**: 64-bit tick counts from a narrow wrapping
//!   RTOS counter, with a visible best-effort path for interrupt context
//! - **Monotonic time**: microseconds and milliseconds since boot without
//!   intermediate overflow
//! - **Real time**: wall-clock time as an offset from boot, with explicit
//!   "not synchronized" results
//! - **Connectivity state**: per-subsystem modes and driver status, with
//!   derived internet and service reachability facts
//!
//! ## Architecture
//!
//! The crate is structured to allow testing on desktop without hardware:
//!
//! - `traits` - Platform tick source, clock and connectivity facts
//! - `tick_clock` - Overflow correction and unit conversion
//! - `real_time` - Boot-offset real-time clock
//! - `connectivity` - Modes, status updates and derived facts
//! - `device` - The owned aggregate that ties everything together
//! - `hal` - Concrete implementations (mock for testing, esp32 for hardware)
//!
//! ## Example
//!
//! ```rust
//! use device_layer::{
//!     Config, ConnectivityManager, DeviceLayer, Mode, StatusUpdate,
//!     config::MeshConfig,
//!     hal::MockTickSource,
//! };
//!
//! let config = Config::default().with_mesh(MeshConfig::default().with_mode(Mode::Enabled));
//! let mut device = DeviceLayer::new(MockTickSource::new(16, 1000), &config).unwrap();
//!
//! // Time keeps counting across the 16-bit wrap.
//! device.tick_source_mut().advance(70_000);
//! assert_eq!(device.monotonic_ms(), 70_000);
//!
//! // Drivers report status; derived facts follow.
//! device.apply_status(StatusUpdate::MeshAttached(true));
//! device.apply_status(StatusUpdate::MeshServiceBridge(true));
//! assert!(device.have_service_connectivity_via_mesh());
//!
//! // Disabling a subsystem drops its contribution immediately.
//! device.connectivity_mut().set_mesh_mode(Mode::Disabled).unwrap();
//! assert!(!device.have_service_connectivity());
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

/// Connectivity modes, status updates and derived facts.
pub mod connectivity;
/// Owned device-layer aggregate and status snapshots.
pub mod device;
/// Error taxonomy.
pub mod error;
/// Hardware abstraction layer with mock implementations for testing.
pub mod hal;
/// Real-time clock as an offset from boot.
pub mod real_time;
/// Critical-section wrappers for concurrent access.
pub mod shared;
/// Overflow-corrected monotonic tick clock.
pub mod tick_clock;
/// Core traits for platform abstraction.
pub mod traits;

/// Configuration system for desktop and ESP32.
pub mod config;

// Re-exports for convenience
pub use connectivity::{
    ConnectivityState, LinkStatus, MeshDeviceType, Mode, ModeSet, PollingConfig, StatusOutcome,
    StatusUpdate, Subsystem, MAX_DEVICE_NAME_LEN,
};
pub use device::{DeviceLayer, DeviceStatus};
pub use error::{Error, Result};
pub use real_time::RealTimeClock;
pub use shared::{Shared, SharedDeviceLayer};
pub use tick_clock::{Accuracy, TickClock, TickReading};
pub use traits::{Clock, ConnectivityManager, TickSnapshot, TickSource};

// Config re-exports
pub use config::{
    AccessPointConfig, AdvertisingConfig, ClockConfig, Config, DeviceConfig, MeshConfig,
    StationConfig, TunnelConfig, UserModeConfig,
};
