//! The device layer aggregate.
//!
//! This module provides [`DeviceLayer`], the explicitly owned object that
//! ties the clocks and the connectivity state together for one device
//! process.
//!
//! # Overview
//!
//! The device layer:
//! - Owns the platform tick source through [`TickClock`]
//! - Layers real time on top of it with [`RealTimeClock`]
//! - Holds the [`ConnectivityState`] and stamps time-based decisions
//!   (on-demand AP, user-selected mode) with its own monotonic clock
//! - Provides [`DeviceStatus`] snapshots for status broadcasting
//!
//! There is no global instance: construct one at startup and pass it by
//! reference. Shutdown is [`DeviceLayer::into_parts`] or drop.
//!
//! # Example
//!
//! ```rust
//! use device_layer::{
//!     Config, DeviceLayer, LinkStatus, Mode, StatusUpdate,
//!     config::TunnelConfig,
//!     hal::MockTickSource,
//! };
//!
//! let config = Config::default().with_tunnel(TunnelConfig::default().with_mode(Mode::Enabled));
//! let mut device = DeviceLayer::new(MockTickSource::new(32, 1000), &config).unwrap();
//!
//! device.tick_source_mut().advance(1_500);
//! device.set_real_time(1_700_000_000_000_000);
//! device.apply_status(StatusUpdate::TunnelLink(LinkStatus::up()));
//!
//! let status = device.status();
//! assert_eq!(status.monotonic_ms, 1_500);
//! assert_eq!(status.real_time_ms, Some(1_700_000_000_000));
//! assert!(status.service_connectivity);
//! ```

use log::debug;

use crate::config::Config;
use crate::connectivity::{ConnectivityState, LinkStatus, Mode, ModeSet, StatusOutcome, StatusUpdate, Subsystem};
use crate::error::Result;
use crate::real_time::RealTimeClock;
use crate::tick_clock::TickClock;
use crate::traits::{ConnectivityManager, TickSource};

/// Device-local time and connectivity.
///
/// # Type Parameter
///
/// - `S`: The platform tick counter ([`TickSource`] trait)
///
/// # Thread Safety
///
/// The device layer itself is not synchronized. When several execution
/// contexts mutate it, wrap it in [`SharedDeviceLayer`](crate::SharedDeviceLayer).
#[derive(Debug)]
pub struct DeviceLayer<S: TickSource> {
    time: RealTimeClock<TickClock<S>>,
    connectivity: ConnectivityState,
}

impl<S: TickSource> DeviceLayer<S> {
    /// Create a device layer from a tick source and configuration.
    ///
    /// # Errors
    ///
    /// Any configuration error from [`Config::connectivity`], or
    /// [`Error::InvalidParameter`](crate::Error::InvalidParameter) if the
    /// tick source reports an unusable rate or width.
    pub fn new(source: S, config: &Config) -> Result<Self> {
        let connectivity = config.connectivity()?;
        let clock = TickClock::new(source)?;
        debug!(
            "device layer up: {} Hz, {}-bit ticks",
            clock.tick_rate_hz(),
            clock.tick_bits()
        );
        Ok(Self::from_parts(RealTimeClock::new(clock), connectivity))
    }

    /// Assemble from already-built parts.
    pub fn from_parts(time: RealTimeClock<TickClock<S>>, connectivity: ConnectivityState) -> Self {
        Self { time, connectivity }
    }

    /// Tear down into the clock and the connectivity state.
    pub fn into_parts(self) -> (RealTimeClock<TickClock<S>>, ConnectivityState) {
        (self.time, self.connectivity)
    }

    // ========================================================================
    // Time
    // ========================================================================

    /// Monotonic tick clock.
    pub fn tick_clock(&self) -> &TickClock<S> {
        self.time.clock()
    }

    /// Mutably borrow the tick source.
    pub fn tick_source_mut(&mut self) -> &mut S {
        self.time.clock_mut().source_mut()
    }

    /// Real-time clock.
    pub fn real_time(&self) -> &RealTimeClock<TickClock<S>> {
        &self.time
    }

    /// Overflow-corrected ticks since boot.
    pub fn ticks_since_boot(&self) -> u64 {
        self.time.clock().ticks_since_boot()
    }

    /// Microseconds since boot.
    pub fn monotonic_us(&self) -> u64 {
        self.time.clock().monotonic_us()
    }

    /// Milliseconds since boot.
    pub fn monotonic_ms(&self) -> u64 {
        self.time.clock().monotonic_ms()
    }

    /// Real time in microseconds.
    pub fn real_time_us(&self) -> Result<u64> {
        self.time.real_time_us()
    }

    /// Real time in milliseconds.
    pub fn real_time_ms(&self) -> Result<u64> {
        self.time.real_time_ms()
    }

    /// Synchronize real time. See [`RealTimeClock::set_real_time`].
    pub fn set_real_time(&mut self, absolute_us: u64) {
        self.time.set_real_time(absolute_us);
    }

    // ========================================================================
    // Connectivity
    // ========================================================================

    /// Connectivity state.
    pub fn connectivity(&self) -> &ConnectivityState {
        &self.connectivity
    }

    /// Mutable connectivity state.
    pub fn connectivity_mut(&mut self) -> &mut ConnectivityState {
        &mut self.connectivity
    }

    /// Store a driver-reported status change.
    pub fn apply_status(&mut self, update: StatusUpdate) -> StatusOutcome {
        self.connectivity.apply_status(update)
    }

    /// Record an on-demand access point request now.
    pub fn demand_start_wifi_ap(&mut self) {
        let now_ms = self.monotonic_ms();
        self.connectivity.demand_start_wifi_ap(now_ms);
    }

    /// Refresh the on-demand access point request now.
    pub fn maintain_on_demand_wifi_ap(&mut self) {
        let now_ms = self.monotonic_ms();
        self.connectivity.maintain_on_demand_wifi_ap(now_ms);
    }

    /// Whether the access point should be running now.
    pub fn wifi_ap_wanted(&self) -> bool {
        self.connectivity.wifi_ap_wanted(self.monotonic_ms())
    }

    /// Turn user-selected mode on or off now.
    pub fn set_user_selected_mode(&mut self, active: bool) {
        let now_ms = self.monotonic_ms();
        self.connectivity.set_user_selected_mode(active, now_ms);
    }

    /// Whether user-selected mode is active now.
    pub fn is_user_selected_mode_active(&self) -> bool {
        self.connectivity
            .is_user_selected_mode_active(self.monotonic_ms())
    }

    /// Get the current status for broadcasting.
    pub fn status(&self) -> DeviceStatus {
        let monotonic_ms = self.monotonic_ms();
        let conn = &self.connectivity;
        DeviceStatus {
            monotonic_ms,
            real_time_ms: self.real_time_ms().ok(),
            modes: conn.modes(),
            ipv4_internet: conn.have_ipv4_internet_connectivity(),
            ipv6_internet: conn.have_ipv6_internet_connectivity(),
            service_via_tunnel: conn.have_service_connectivity_via_tunnel(),
            service_via_mesh: conn.have_service_connectivity_via_mesh(),
            service_connectivity: conn.have_service_connectivity(),
            wifi_ap_wanted: conn.wifi_ap_wanted(monotonic_ms),
            user_selected_mode: conn.is_user_selected_mode_active(monotonic_ms),
        }
    }
}

impl<S: TickSource> ConnectivityManager for DeviceLayer<S> {
    fn mode(&self, subsystem: Subsystem) -> Mode {
        self.connectivity.mode(subsystem)
    }

    fn station_link(&self) -> LinkStatus {
        self.connectivity.station_link()
    }

    fn tunnel_link(&self) -> LinkStatus {
        self.connectivity.tunnel_link()
    }

    fn is_mesh_attached(&self) -> bool {
        self.connectivity.is_mesh_attached()
    }

    fn is_mesh_service_bridge_available(&self) -> bool {
        self.connectivity.is_mesh_service_bridge_available()
    }
}

/// Status snapshot for broadcasting.
///
/// Implements `serde::Serialize` when the `serde` feature is enabled, so a
/// host can publish it as JSON.
///
/// # Example
///
/// ```rust
/// use device_layer::{Config, DeviceLayer, Mode, hal::MockTickSource};
///
/// let device = DeviceLayer::new(MockTickSource::new(32, 1000), &Config::default()).unwrap();
///
/// let status = device.status();
/// assert_eq!(status.real_time_ms, None);
/// assert_eq!(status.modes.station, Mode::Disabled);
/// assert!(!status.service_connectivity);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeviceStatus {
    /// Milliseconds since boot.
    pub monotonic_ms: u64,
    /// Real time in milliseconds, if synchronized.
    pub real_time_ms: Option<u64>,
    /// Mode of every subsystem.
    pub modes: ModeSet,
    /// IPv4 internet is reachable.
    pub ipv4_internet: bool,
    /// IPv6 internet is reachable.
    pub ipv6_internet: bool,
    /// Service reachable over the tunnel.
    pub service_via_tunnel: bool,
    /// Service reachable through the mesh.
    pub service_via_mesh: bool,
    /// Service reachable by any path.
    pub service_connectivity: bool,
    /// Access point should be running.
    pub wifi_ap_wanted: bool,
    /// User-selected mode is active.
    pub user_selected_mode: bool,
}

impl DeviceStatus {
    /// Returns true if modes or derived facts differ. Timestamps are ignored.
    pub fn connectivity_changed(&self, other: &DeviceStatus) -> bool {
        self.modes != other.modes
            || self.ipv4_internet != other.ipv4_internet
            || self.ipv6_internet != other.ipv6_internet
            || self.service_via_tunnel != other.service_via_tunnel
            || self.service_via_mesh != other.service_via_mesh
            || self.service_connectivity != other.service_connectivity
            || self.wifi_ap_wanted != other.wifi_ap_wanted
            || self.user_selected_mode != other.user_selected_mode
            || self.real_time_ms.is_some() != other.real_time_ms.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AccessPointConfig, ClockConfig, MeshConfig, StationConfig};
    use crate::hal::MockTickSource;
    use crate::Error;

    fn device(config: &Config) -> DeviceLayer<MockTickSource> {
        DeviceLayer::new(MockTickSource::new(16, 1000), config).unwrap()
    }

    // =========================================================================
    // Construction Tests
    // =========================================================================

    #[test]
    fn new_rejects_bad_config() {
        let config = Config::default()
            .with_mesh(MeshConfig::default().with_mode(Mode::OnDemand));
        let err = DeviceLayer::new(MockTickSource::new(16, 1000), &config).unwrap_err();
        assert!(matches!(err, Error::InvalidMode { .. }));
    }

    #[test]
    fn new_rejects_zero_rate_source() {
        let result = DeviceLayer::new(MockTickSource::new(16, 0), &Config::default());
        assert!(matches!(result, Err(Error::InvalidParameter(_))));
    }

    #[test]
    fn source_built_from_clock_config() {
        let config = Config::default().with_clock(ClockConfig::default().with_tick_rate_hz(100));
        let device = DeviceLayer::new(MockTickSource::from_config(&config.clock), &config).unwrap();
        assert_eq!(device.tick_clock().tick_rate_hz(), 100);
        assert_eq!(device.tick_clock().tick_bits(), 32);
    }

    #[test]
    fn into_parts_keeps_state() {
        let mut device = device(&Config::default());
        device.tick_source_mut().advance(10);
        device.set_real_time(1_000_000);

        let (time, conn) = device.into_parts();
        assert!(time.is_synced());
        assert_eq!(conn.wifi_station_mode(), Mode::Disabled);
    }

    // =========================================================================
    // Time Tests
    // =========================================================================

    #[test]
    fn time_follows_ticks_across_wrap() {
        let mut device = device(&Config::default());
        device.tick_source_mut().advance(65_000);
        assert_eq!(device.monotonic_ms(), 65_000);

        device.tick_source_mut().advance(1_000);
        assert_eq!(device.ticks_since_boot(), 66_000);
        assert_eq!(device.monotonic_us(), 66_000_000);
    }

    #[test]
    fn real_time_desync() {
        let mut device = device(&Config::default());
        device.tick_source_mut().advance(5_000);
        device.set_real_time(10_000_000);
        assert_eq!(device.real_time_ms(), Ok(10_000));

        device.set_real_time(4_000_000);
        assert_eq!(device.real_time_ms(), Err(Error::NotSynced));
    }

    // =========================================================================
    // Timed Connectivity Tests
    // =========================================================================

    #[test]
    fn ap_demand_uses_device_clock() {
        let config = Config::default().with_access_point(
            AccessPointConfig::default()
                .with_mode(Mode::OnDemand)
                .with_idle_timeout_ms(1_000),
        );
        let mut device = device(&config);
        device.tick_source_mut().advance(100);
        device.demand_start_wifi_ap();
        assert!(device.wifi_ap_wanted());

        device.tick_source_mut().advance(999);
        assert!(device.wifi_ap_wanted());
        device.maintain_on_demand_wifi_ap();

        device.tick_source_mut().advance(999);
        assert!(device.wifi_ap_wanted());
        device.tick_source_mut().advance(1);
        assert!(!device.wifi_ap_wanted());
    }

    #[test]
    fn user_selected_mode_uses_device_clock() {
        let mut device = device(&Config::default());
        device.set_user_selected_mode(true);
        assert!(device.is_user_selected_mode_active());

        device.tick_source_mut().advance(30_000);
        assert!(!device.is_user_selected_mode_active());
    }

    // =========================================================================
    // Status Tests
    // =========================================================================

    #[test]
    fn status_reflects_derived_facts() {
        let config = Config::default()
            .with_station(StationConfig::default().with_mode(Mode::Enabled));
        let mut device = device(&config);
        device.apply_status(StatusUpdate::StationLink(LinkStatus::up().ipv4_only()));

        let status = device.status();
        assert!(status.ipv4_internet);
        assert!(!status.ipv6_internet);
        assert!(!status.service_connectivity);
        assert_eq!(status.modes.station, Mode::Enabled);
        assert!(device.have_ipv4_internet_connectivity());
    }

    #[test]
    fn connectivity_changed_ignores_time() {
        let mut device = device(&Config::default());
        let before = device.status();
        device.tick_source_mut().advance(500);
        let after = device.status();
        assert_ne!(before, after);
        assert!(!after.connectivity_changed(&before));

        device.set_real_time(1_000_000);
        assert!(device.status().connectivity_changed(&after));
    }
}
