//! WiFi station driver for ESP32.
//!
//! Drives the station link according to the station [`Mode`] held in
//! [`ConnectivityState`], and reports link status back as
//! [`StatusUpdate`]s.
//!
//! # Example
//!
//! ```ignore
//! use device_layer::hal::esp32::Esp32StationDriver;
//! use device_layer::config::StationConfig;
//!
//! let config = StationConfig::default()
//!     .with_mode(Mode::Enabled)
//!     .with_ssid("MyNetwork")
//!     .with_password("secret123");
//!
//! let mut station = Esp32StationDriver::new(modem, sysloop, nvs, &config)?;
//! station.sync(device.connectivity_mut())?;
//! ```

use std::net::Ipv4Addr;

use esp_idf_hal::modem::Modem;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{BlockingWifi, ClientConfiguration, Configuration, EspWifi};
use log::{info, warn};

use crate::config::StationConfig;
use crate::connectivity::{ConnectivityState, LinkStatus, Mode, StatusUpdate};

/// WiFi station driver.
///
/// Owns the ESP-IDF WiFi driver. Nothing happens on the radio until
/// [`sync`](Self::sync) sees the station mode `Enabled`.
pub struct Esp32StationDriver<'a> {
    wifi: BlockingWifi<EspWifi<'a>>,
    provisioned: bool,
}

impl<'a> Esp32StationDriver<'a> {
    /// Create the driver and load the station credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if WiFi initialization or configuration fails.
    pub fn new(
        modem: Modem,
        sysloop: EspSystemEventLoop,
        nvs: Option<EspDefaultNvsPartition>,
        config: &StationConfig,
    ) -> anyhow::Result<Self> {
        let esp_wifi = EspWifi::new(modem, sysloop.clone(), nvs)?;
        let mut wifi = BlockingWifi::wrap(esp_wifi, sysloop)?;

        let mut ssid: heapless::String<32> = heapless::String::new();
        if ssid.push_str(config.ssid.as_str()).is_err() {
            anyhow::bail!("ssid longer than 32 bytes");
        }
        let mut password: heapless::String<64> = heapless::String::new();
        if password.push_str(config.password.as_str()).is_err() {
            anyhow::bail!("password longer than 64 bytes");
        }

        wifi.set_configuration(&Configuration::Client(ClientConfiguration {
            ssid,
            password,
            ..Default::default()
        }))?;

        Ok(Self {
            wifi,
            provisioned: config.is_provisioned(),
        })
    }

    /// Bring the radio in line with the station mode and report status.
    ///
    /// - `Enabled`: start, connect if provisioned, wait for DHCP.
    /// - Anything else: disconnect and stop if running.
    pub fn sync(&mut self, conn: &mut ConnectivityState) -> anyhow::Result<()> {
        conn.apply_status(StatusUpdate::StationProvisioned(self.provisioned));

        if conn.wifi_station_mode() != Mode::Enabled {
            if self.wifi.is_started()? {
                info!("station: stopping");
                if let Err(err) = self.wifi.disconnect() {
                    warn!("station: disconnect failed: {}", err);
                }
                self.wifi.stop()?;
            }
            conn.apply_status(StatusUpdate::StationLink(LinkStatus::DOWN));
            return Ok(());
        }

        if !self.wifi.is_started()? {
            info!("station: starting");
            self.wifi.start()?;
        }

        if self.provisioned && !self.wifi.is_connected()? {
            info!("station: connecting");
            match self.wifi.connect().and_then(|_| self.wifi.wait_netif_up()) {
                Ok(()) => {
                    if let Some(ip) = self.ip_addr() {
                        info!("station: connected, ip {}", ip);
                    }
                }
                Err(err) => warn!("station: connect failed: {}", err),
            }
        }

        conn.apply_status(StatusUpdate::StationLink(self.link_status()));
        Ok(())
    }

    /// Current link status as seen by the driver.
    pub fn link_status(&self) -> LinkStatus {
        let connected = self.wifi.is_connected().unwrap_or(false);
        let has_ipv4 = self.ip_addr().is_some();
        LinkStatus {
            established: connected,
            restricted: false,
            ipv4: connected && has_ipv4,
            ipv6: false,
        }
    }

    /// Get the current IP address, if assigned.
    pub fn ip_addr(&self) -> Option<Ipv4Addr> {
        self.wifi
            .wifi()
            .sta_netif()
            .get_ip_info()
            .ok()
            .map(|info| info.ip)
            .filter(|ip| !ip.is_unspecified())
    }

    /// Disconnect and forget that credentials exist.
    ///
    /// The connectivity state is updated through
    /// [`ConnectivityState::clear_wifi_station_provision`].
    pub fn clear_provision(&mut self, conn: &mut ConnectivityState) -> anyhow::Result<()> {
        if self.wifi.is_connected()? {
            self.wifi.disconnect()?;
        }
        self.provisioned = false;
        conn.clear_wifi_station_provision();
        Ok(())
    }

    /// Get the underlying WiFi driver for advanced operations.
    pub fn driver(&self) -> &EspWifi<'a> {
        self.wifi.wifi()
    }
}
