//! Trait definitions for platform time and connectivity.
//!
//! This module defines the seams that let the device layer run on different
//! platforms (FreeRTOS on ESP32, desktop mock).
//!
//! # Submodules
//!
//! - `hardware`: Tick counter and monotonic clock
//! - `network`: Connectivity facts surface
//!
//! # Key Traits
//!
//! - [`TickSource`]: Narrow wrapping tick counter provided by the RTOS
//! - [`Clock`]: Monotonic time source
//! - [`ConnectivityManager`]: Modes, link status and derived connectivity facts

pub mod hardware;
pub mod network;

pub use hardware::*;
pub use network::*;
