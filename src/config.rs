//! Shared configuration system for desktop and ESP32.
//!
//! Uses `heapless::String` for `no_std` compatibility while remaining
//! ergonomic to use on desktop with `std`.
//!
//! A configured mode of [`Mode::NotSupported`] marks that subsystem as absent
//! on the platform; any other mode must be in the subsystem's supported set.
//!
//! # Example
//!
//! ```rust
//! use device_layer::config::{AccessPointConfig, Config, StationConfig};
//! use device_layer::Mode;
//!
//! // Use defaults
//! let config = Config::default();
//! assert!(config.validate().is_ok());
//!
//! // Or customize
//! let config = Config::default()
//!     .with_station(StationConfig::default().with_mode(Mode::Enabled).with_ssid("home"))
//!     .with_access_point(AccessPointConfig::default().with_mode(Mode::OnDemand));
//! let conn = config.connectivity().unwrap();
//! assert_eq!(conn.wifi_ap_mode(), Mode::OnDemand);
//! ```

use heapless::String as HString;

use crate::connectivity::{
    ConnectivityState, MeshDeviceType, Mode, PollingConfig, Subsystem,
    DEFAULT_AP_IDLE_TIMEOUT_MS, DEFAULT_RECONNECT_INTERVAL_MS, DEFAULT_USER_MODE_TIMEOUT_SECS,
    MAX_DEVICE_NAME_LEN,
};
use crate::error::{Error, Result};

/// Maximum length for short config strings (names, SSIDs, passwords)
pub const MAX_SHORT_STRING: usize = 64;

/// Type alias for short config strings
pub type ShortString = HString<MAX_SHORT_STRING>;

/// Type alias for advertised device names
pub type NameString = HString<MAX_DEVICE_NAME_LEN>;

// ============================================================================
// Helper for creating heapless strings
// ============================================================================

/// Copy the longest prefix of `s` that fits into `N` bytes on a char boundary.
fn truncated<const N: usize>(s: &str) -> HString<N> {
    let mut hs = HString::new();
    let mut end = s.len().min(N);
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    let _ = hs.push_str(&s[..end]);
    hs
}

/// Create a ShortString from a &str, truncating if too long
pub fn short_string(s: &str) -> ShortString {
    truncated(s)
}

// ============================================================================
// Main Config
// ============================================================================

/// Complete device-layer configuration
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    /// Tick counter parameters
    pub clock: ClockConfig,
    /// WiFi station
    pub station: StationConfig,
    /// WiFi access point
    pub access_point: AccessPointConfig,
    /// Mesh network
    pub mesh: MeshConfig,
    /// Service tunnel
    pub tunnel: TunnelConfig,
    /// Short-range advertising
    pub advertising: AdvertisingConfig,
    /// User-selected mode
    pub user_mode: UserModeConfig,
    /// Device identification
    pub device: DeviceConfig,
}

impl Config {
    /// Set clock configuration
    pub fn with_clock(mut self, clock: ClockConfig) -> Self {
        self.clock = clock;
        self
    }

    /// Set station configuration
    pub fn with_station(mut self, station: StationConfig) -> Self {
        self.station = station;
        self
    }

    /// Set access point configuration
    pub fn with_access_point(mut self, access_point: AccessPointConfig) -> Self {
        self.access_point = access_point;
        self
    }

    /// Set mesh configuration
    pub fn with_mesh(mut self, mesh: MeshConfig) -> Self {
        self.mesh = mesh;
        self
    }

    /// Set tunnel configuration
    pub fn with_tunnel(mut self, tunnel: TunnelConfig) -> Self {
        self.tunnel = tunnel;
        self
    }

    /// Set advertising configuration
    pub fn with_advertising(mut self, advertising: AdvertisingConfig) -> Self {
        self.advertising = advertising;
        self
    }

    /// Set user-selected mode configuration
    pub fn with_user_mode(mut self, user_mode: UserModeConfig) -> Self {
        self.user_mode = user_mode;
        self
    }

    /// Set device configuration
    pub fn with_device(mut self, device: DeviceConfig) -> Self {
        self.device = device;
        self
    }

    /// Configured mode for a subsystem
    pub fn mode(&self, subsystem: Subsystem) -> Mode {
        match subsystem {
            Subsystem::Station => self.station.mode,
            Subsystem::AccessPoint => self.access_point.mode,
            Subsystem::Mesh => self.mesh.mode,
            Subsystem::Tunnel => self.tunnel.mode,
            Subsystem::Advertising => self.advertising.mode,
        }
    }

    /// Check every value without building anything.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidParameter`] for a zero tick rate, a tick width
    ///   outside `1..=32`, a zero reconnect interval, a half-set polling config
    ///   or a mesh device type of `NotSupported` on a supported mesh.
    /// - [`Error::InvalidMode`] for a mode outside its subsystem's set.
    pub fn validate(&self) -> Result<()> {
        self.clock.validate()?;
        for subsystem in Subsystem::ALL {
            let mode = self.mode(subsystem);
            if mode != Mode::NotSupported && !subsystem.supports(mode) {
                return Err(Error::InvalidMode { subsystem, mode });
            }
        }
        if self.station.reconnect_interval_ms == 0 {
            return Err(Error::InvalidParameter("reconnect interval must be non-zero"));
        }
        if self.mesh.mode != Mode::NotSupported {
            if self.mesh.device_type == MeshDeviceType::NotSupported {
                return Err(Error::InvalidParameter("mesh device type not requestable"));
            }
            self.mesh.polling.validate()?;
        }
        Ok(())
    }

    /// Build the initial connectivity state.
    ///
    /// Validates first. Subsystems configured `NotSupported` are marked
    /// unsupported and their settings are skipped.
    pub fn connectivity(&self) -> Result<ConnectivityState> {
        self.validate()?;
        let mut conn = ConnectivityState::new();

        for subsystem in Subsystem::ALL {
            match self.mode(subsystem) {
                Mode::NotSupported => conn.mark_unsupported(subsystem),
                mode => conn.set_mode(subsystem, mode)?,
            }
        }

        conn.set_wifi_station_reconnect_interval_ms(self.station.reconnect_interval_ms)?;
        conn.set_wifi_ap_idle_timeout_ms(self.access_point.idle_timeout_ms);
        conn.set_user_selected_mode_timeout_secs(self.user_mode.timeout_secs);

        if self.mesh.mode != Mode::NotSupported {
            conn.set_mesh_device_type(self.mesh.device_type)?;
            conn.set_mesh_polling_config(self.mesh.polling)?;
        }
        if self.advertising.mode != Mode::NotSupported {
            conn.set_ble_advertising_enabled(self.advertising.advertising_enabled)?;
            conn.set_ble_fast_advertising_enabled(self.advertising.fast_advertising)?;
            if self.advertising.device_name.is_empty() {
                let name: NameString = truncated(self.device.name.as_str());
                conn.set_ble_device_name(name.as_str())?;
            } else {
                conn.set_ble_device_name(self.advertising.device_name.as_str())?;
            }
        }
        Ok(conn)
    }
}

// ============================================================================
// Clock Config
// ============================================================================

/// Tick counter parameters for platforms that take them from configuration
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClockConfig {
    /// Counter rate in Hz
    pub tick_rate_hz: u32,
    /// Counter width in bits
    pub tick_bits: u32,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 1000,
            tick_bits: 32,
        }
    }
}

impl ClockConfig {
    /// Set the tick rate
    pub fn with_tick_rate_hz(mut self, hz: u32) -> Self {
        self.tick_rate_hz = hz;
        self
    }

    /// Set the counter width
    pub fn with_tick_bits(mut self, bits: u32) -> Self {
        self.tick_bits = bits;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.tick_rate_hz == 0 {
            return Err(Error::InvalidParameter("tick rate must be non-zero"));
        }
        if !(1..=32).contains(&self.tick_bits) {
            return Err(Error::InvalidParameter("tick width must be 1..=32 bits"));
        }
        Ok(())
    }
}

// ============================================================================
// Station Config
// ============================================================================

/// WiFi station configuration
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StationConfig {
    /// Station mode
    pub mode: Mode,
    /// Network SSID
    pub ssid: ShortString,
    /// Network password
    pub password: ShortString,
    /// Delay between reconnect attempts in milliseconds
    pub reconnect_interval_ms: u32,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Disabled,
            ssid: ShortString::new(),
            password: ShortString::new(),
            reconnect_interval_ms: DEFAULT_RECONNECT_INTERVAL_MS,
        }
    }
}

impl StationConfig {
    /// Set the mode
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the SSID
    pub fn with_ssid(mut self, ssid: &str) -> Self {
        self.ssid = short_string(ssid);
        self
    }

    /// Set the password
    pub fn with_password(mut self, password: &str) -> Self {
        self.password = short_string(password);
        self
    }

    /// Set the reconnect interval
    pub fn with_reconnect_interval_ms(mut self, ms: u32) -> Self {
        self.reconnect_interval_ms = ms;
        self
    }

    /// Check if credentials are configured
    pub fn is_provisioned(&self) -> bool {
        !self.ssid.is_empty()
    }
}

// ============================================================================
// Access Point Config
// ============================================================================

/// WiFi access point configuration
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AccessPointConfig {
    /// Access point mode
    pub mode: Mode,
    /// Idle timeout for on-demand operation in milliseconds
    pub idle_timeout_ms: u32,
}

impl Default for AccessPointConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Disabled,
            idle_timeout_ms: DEFAULT_AP_IDLE_TIMEOUT_MS,
        }
    }
}

impl AccessPointConfig {
    /// Set the mode
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the idle timeout
    pub fn with_idle_timeout_ms(mut self, ms: u32) -> Self {
        self.idle_timeout_ms = ms;
        self
    }
}

// ============================================================================
// Mesh Config
// ============================================================================

/// Mesh network configuration
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MeshConfig {
    /// Mesh mode
    pub mode: Mode,
    /// Role in the mesh
    pub device_type: MeshDeviceType,
    /// Sleepy end device polling
    pub polling: PollingConfig,
}

impl MeshConfig {
    /// Set the mode
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the device type
    pub fn with_device_type(mut self, device_type: MeshDeviceType) -> Self {
        self.device_type = device_type;
        self
    }

    /// Set the polling intervals
    pub fn with_polling(mut self, polling: PollingConfig) -> Self {
        self.polling = polling;
        self
    }
}

// ============================================================================
// Tunnel Config
// ============================================================================

/// Service tunnel configuration
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TunnelConfig {
    /// Tunnel mode
    pub mode: Mode,
}

impl TunnelConfig {
    /// Set the mode
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }
}

// ============================================================================
// Advertising Config
// ============================================================================

/// Short-range advertising configuration
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AdvertisingConfig {
    /// Advertising service mode
    pub mode: Mode,
    /// Advertise at boot
    pub advertising_enabled: bool,
    /// Use the fast advertising interval
    pub fast_advertising: bool,
    /// Advertised name (empty = driver default)
    pub device_name: NameString,
}

impl AdvertisingConfig {
    /// Set the mode
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Enable or disable advertising at boot
    pub fn with_advertising_enabled(mut self, enabled: bool) -> Self {
        self.advertising_enabled = enabled;
        self
    }

    /// Enable or disable fast advertising
    pub fn with_fast_advertising(mut self, fast: bool) -> Self {
        self.fast_advertising = fast;
        self
    }

    /// Set the device name, truncating to the advertised limit
    pub fn with_device_name(mut self, name: &str) -> Self {
        self.device_name = truncated(name);
        self
    }
}

// ============================================================================
// User Mode Config
// ============================================================================

/// User-selected mode configuration
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UserModeConfig {
    /// Seconds the mode stays active after being selected
    pub timeout_secs: u16,
}

impl Default for UserModeConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_USER_MODE_TIMEOUT_SECS,
        }
    }
}

impl UserModeConfig {
    /// Set the timeout
    pub fn with_timeout_secs(mut self, secs: u16) -> Self {
        self.timeout_secs = secs;
        self
    }
}

// ============================================================================
// Device Config
// ============================================================================

/// Device identification configuration
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeviceConfig {
    /// Human-readable device name
    pub name: ShortString,
    /// Device ID
    pub id: ShortString,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            name: short_string("device-layer"),
            id: short_string("device1"),
        }
    }
}

impl DeviceConfig {
    /// Set the device name
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = short_string(name);
        self
    }

    /// Set the device ID
    pub fn with_id(mut self, id: &str) -> Self {
        self.id = short_string(id);
        self
    }
}

// ============================================================================
// Tests
// ============================================================================
