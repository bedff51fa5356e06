//! ESP32 device-layer firmware.
//!
//! This is the main entry point for the hardware build. It runs a 10Hz loop
//! that:
//! - Keeps the station link in line with its configured mode (if enabled)
//! - Tracks monotonic and real time over the FreeRTOS tick
//! - Logs a status line whenever connectivity facts change
//!
//! # Build
//!
//! ```bash
//! # Clocks only
//! cargo build --release --features esp32
//!
//! # With WiFi station
//! WIFI_SSID=home WIFI_PASSWORD=secret cargo build --release --features wifi
//! ```

use std::thread;
use std::time::Duration;

use device_layer::hal::esp32::FreeRtosTickSource;
use device_layer::{Config, DeviceLayer, DeviceStatus, Mode, StationConfig};
use log::info;

/// Main loop interval in milliseconds (10Hz = 100ms)
const LOOP_INTERVAL_MS: u64 = 100;

fn main() -> anyhow::Result<()> {
    // Initialize ESP-IDF
    esp_idf_hal::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();

    info!("device-layer firmware starting");

    // =========================================================================
    // Configuration
    // =========================================================================
    let ssid = option_env!("WIFI_SSID").unwrap_or("");
    let station_mode = if ssid.is_empty() {
        Mode::Disabled
    } else {
        Mode::Enabled
    };
    let config = Config::default().with_station(
        StationConfig::default()
            .with_mode(station_mode)
            .with_ssid(ssid)
            .with_password(option_env!("WIFI_PASSWORD").unwrap_or("")),
    );
    info!(
        "Device {} ({})",
        config.device.name.as_str(),
        config.device.id.as_str()
    );

    // Owned by the loop; the station driver blocks and stays outside any
    // critical section.
    #[allow(unused_mut)]
    let mut device = DeviceLayer::new(FreeRtosTickSource::new(), &config)
        .map_err(|err| anyhow::anyhow!("device layer: {}", err))?;
    info!(
        "[OK] Tick clock at {} Hz, {}-bit",
        device.tick_clock().tick_rate_hz(),
        device.tick_clock().tick_bits()
    );

    // =========================================================================
    // Initialize WiFi station - Optional
    // =========================================================================
    #[cfg(feature = "wifi")]
    let mut station = {
        use device_layer::hal::esp32::Esp32StationDriver;
        use esp_idf_hal::peripherals::Peripherals;
        use esp_idf_svc::eventloop::EspSystemEventLoop;
        use esp_idf_svc::nvs::EspDefaultNvsPartition;

        let peripherals = Peripherals::take()?;
        let sysloop = EspSystemEventLoop::take()?;
        let nvs = EspDefaultNvsPartition::take()?;
        let station =
            Esp32StationDriver::new(peripherals.modem, sysloop, Some(nvs), &config.station)?;
        info!("[OK] WiFi station driver ready");
        station
    };

    // =========================================================================
    // Main Loop
    // =========================================================================
    info!("Starting main loop (10Hz)...");

    let mut last_status: Option<DeviceStatus> = None;

    loop {
        #[cfg(feature = "wifi")]
        if let Err(err) = station.sync(device.connectivity_mut()) {
            log::warn!("station sync failed: {}", err);
        }

        let status = device.status();
        let changed = last_status
            .as_ref()
            .map(|prev| status.connectivity_changed(prev))
            .unwrap_or(true);
        if changed {
            log_status(&status);
            last_status = Some(status);
        }

        thread::sleep(Duration::from_millis(LOOP_INTERVAL_MS));
    }
}

fn log_status(status: &DeviceStatus) {
    info!(
        "t={}ms real={:?} station={} ap={} mesh={} tunnel={} ipv4={} ipv6={} service={}",
        status.monotonic_ms,
        status.real_time_ms,
        status.modes.station.as_str(),
        status.modes.access_point.as_str(),
        status.modes.mesh.as_str(),
        status.modes.tunnel.as_str(),
        status.ipv4_internet,
        status.ipv6_internet,
        status.service_connectivity,
    );
}
