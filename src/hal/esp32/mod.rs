//! ESP32 (ESP-IDF / FreeRTOS) implementations.
//!
//! # Contents
//!
//! - [`FreeRtosTickSource`]: scheduler tick counter for [`TickClock`](crate::TickClock)
//! - [`Esp32Clock`]: microsecond hardware timer
//! - [`Esp32StationDriver`]: WiFi station driver that reports into
//!   [`ConnectivityState`](crate::ConnectivityState) (requires `wifi` feature)

mod clock;
mod tick;

pub use clock::Esp32Clock;
pub use tick::FreeRtosTickSource;

#[cfg(feature = "wifi")]
mod wifi;
#[cfg(feature = "wifi")]
pub use wifi::Esp32StationDriver;
