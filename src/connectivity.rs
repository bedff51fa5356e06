//! Connectivity mode aggregation.
//!
//! [`ConnectivityState`] holds, for each connectivity subsystem, an
//! operator-facing [`Mode`] and the driver-reported status flags. Derived
//! facts ("do we have IPv4 internet", "can we reach the service") are never
//! stored; they are recomputed from the current flags through the
//! [`ConnectivityManager`] trait every time they are asked for.
//!
//! # Subsystems
//!
//! | Subsystem | Supported modes |
//! |-----------|-----------------|
//! | [`Subsystem::Station`] | `ApplicationControlled`, `Disabled`, `Enabled` |
//! | [`Subsystem::AccessPoint`] | `ApplicationControlled`, `Disabled`, `Enabled`, `OnDemand`, `OnDemandNoStationProvision` |
//! | [`Subsystem::Mesh`] | `ApplicationControlled`, `Disabled`, `Enabled` |
//! | [`Subsystem::Tunnel`] | `Disabled`, `Enabled` |
//! | [`Subsystem::Advertising`] | `Disabled`, `Enabled` |
//!
//! `NotSupported` is never requestable. It marks a subsystem the platform
//! lacks, and every mode setter on such a subsystem fails with
//! [`Error::Unsupported`].
//!
//! # Status Updates
//!
//! Drivers report link state through [`ConnectivityState::apply_status`].
//! Disabling a subsystem resets its link flags, and link-up reports for a
//! disabled subsystem are ignored, so a disabled subsystem can never be
//! reported as linked.
//!
//! # Example
//!
//! ```rust
//! use device_layer::{ConnectivityState, ConnectivityManager, LinkStatus, Mode, StatusUpdate};
//!
//! let mut conn = ConnectivityState::new();
//! conn.set_service_tunnel_mode(Mode::Enabled).unwrap();
//! conn.apply_status(StatusUpdate::TunnelLink(LinkStatus::up()));
//! assert!(conn.have_service_connectivity());
//!
//! conn.set_service_tunnel_mode(Mode::Disabled).unwrap();
//! assert!(!conn.is_service_tunnel_connected());
//! assert!(!conn.have_service_connectivity());
//! ```
//!
//! [`ConnectivityManager`]: crate::traits::ConnectivityManager

use heapless::String as HString;
use log::{debug, warn};

use crate::error::{Error, Result};
use crate::traits::ConnectivityManager;

/// Maximum length of the advertised device name in bytes.
pub const MAX_DEVICE_NAME_LEN: usize = 32;

/// Default station reconnect interval.
pub const DEFAULT_RECONNECT_INTERVAL_MS: u32 = 5_000;

/// Default idle timeout for an on-demand access point.
pub const DEFAULT_AP_IDLE_TIMEOUT_MS: u32 = 120_000;

/// Default user-selected mode timeout.
pub const DEFAULT_USER_MODE_TIMEOUT_SECS: u16 = 30;

// ============================================================================
// Mode and Subsystem
// ============================================================================

/// Operator-facing control state of a connectivity subsystem.
///
/// Each subsystem accepts only a subset; see [`Subsystem::supported_modes`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Mode {
    /// The platform does not provide this subsystem.
    NotSupported,
    /// The application owns the link; this layer does not drive it.
    ApplicationControlled,
    /// Switched off.
    #[default]
    Disabled,
    /// Switched on and driven by this layer.
    Enabled,
    /// Access point only: started on demand, stopped when idle.
    OnDemand,
    /// Access point only: on demand, but only while the station is unprovisioned.
    OnDemandNoStationProvision,
}

impl Mode {
    /// Every mode, in declaration order.
    pub const ALL: [Mode; 6] = [
        Mode::NotSupported,
        Mode::ApplicationControlled,
        Mode::Disabled,
        Mode::Enabled,
        Mode::OnDemand,
        Mode::OnDemandNoStationProvision,
    ];

    /// Returns the mode as a snake_case string.
    ///
    /// # Examples
    ///
    /// ```
    /// use device_layer::Mode;
    ///
    /// assert_eq!(Mode::Enabled.as_str(), "enabled");
    /// assert_eq!(Mode::OnDemandNoStationProvision.as_str(), "on_demand_no_station_provision");
    /// ```
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Mode::NotSupported => "not_supported",
            Mode::ApplicationControlled => "application_controlled",
            Mode::Disabled => "disabled",
            Mode::Enabled => "enabled",
            Mode::OnDemand => "on_demand",
            Mode::OnDemandNoStationProvision => "on_demand_no_station_provision",
        }
    }

    /// Parse a mode from text.
    ///
    /// Accepts the [`as_str`](Self::as_str) spellings plus a few short forms
    /// (`"on"`, `"off"`, `"app"`). Input is trimmed and case-insensitive.
    ///
    /// # Examples
    ///
    /// ```
    /// use device_layer::Mode;
    ///
    /// assert_eq!(Mode::from_text("enabled"), Some(Mode::Enabled));
    /// assert_eq!(Mode::from_text(" OFF "), Some(Mode::Disabled));
    /// assert_eq!(Mode::from_text("app"), Some(Mode::ApplicationControlled));
    /// assert_eq!(Mode::from_text("sometimes"), None);
    /// ```
    pub fn from_text(s: &str) -> Option<Self> {
        let s = s.trim();
        let eq = |name: &str| s.eq_ignore_ascii_case(name);
        if eq("not_supported") {
            Some(Mode::NotSupported)
        } else if eq("application_controlled") || eq("app") {
            Some(Mode::ApplicationControlled)
        } else if eq("disabled") || eq("off") {
            Some(Mode::Disabled)
        } else if eq("enabled") || eq("on") {
            Some(Mode::Enabled)
        } else if eq("on_demand") {
            Some(Mode::OnDemand)
        } else if eq("on_demand_no_station_provision") {
            Some(Mode::OnDemandNoStationProvision)
        } else {
            None
        }
    }

    /// Returns true if this layer drives the subsystem in this mode.
    ///
    /// Only these modes may contribute to derived connectivity facts.
    #[inline]
    pub const fn is_driven(&self) -> bool {
        matches!(
            self,
            Mode::Enabled | Mode::OnDemand | Mode::OnDemandNoStationProvision
        )
    }

    /// Returns true for the two access-point on-demand modes.
    #[inline]
    pub const fn is_on_demand(&self) -> bool {
        matches!(self, Mode::OnDemand | Mode::OnDemandNoStationProvision)
    }
}

/// A connectivity subsystem.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Subsystem {
    /// WiFi station link (joins an upstream network).
    Station,
    /// WiFi access point (hosts a local network).
    AccessPoint,
    /// Mesh network link (Thread).
    Mesh,
    /// Cloud service tunnel.
    Tunnel,
    /// Service discovery over short-range radio (BLE advertising).
    Advertising,
}

impl Subsystem {
    /// Every subsystem.
    pub const ALL: [Subsystem; 5] = [
        Subsystem::Station,
        Subsystem::AccessPoint,
        Subsystem::Mesh,
        Subsystem::Tunnel,
        Subsystem::Advertising,
    ];

    /// Returns the subsystem name as a snake_case string.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Subsystem::Station => "station",
            Subsystem::AccessPoint => "access_point",
            Subsystem::Mesh => "mesh",
            Subsystem::Tunnel => "tunnel",
            Subsystem::Advertising => "advertising",
        }
    }

    /// Modes that may be requested for this subsystem.
    pub const fn supported_modes(&self) -> &'static [Mode] {
        match self {
            Subsystem::Station | Subsystem::Mesh => &[
                Mode::ApplicationControlled,
                Mode::Disabled,
                Mode::Enabled,
            ],
            Subsystem::AccessPoint => &[
                Mode::ApplicationControlled,
                Mode::Disabled,
                Mode::Enabled,
                Mode::OnDemand,
                Mode::OnDemandNoStationProvision,
            ],
            Subsystem::Tunnel | Subsystem::Advertising => &[Mode::Disabled, Mode::Enabled],
        }
    }

    /// Returns true if `mode` may be requested for this subsystem.
    ///
    /// # Examples
    ///
    /// ```
    /// use device_layer::{Mode, Subsystem};
    ///
    /// assert!(Subsystem::AccessPoint.supports(Mode::OnDemand));
    /// assert!(!Subsystem::Mesh.supports(Mode::OnDemand));
    /// assert!(!Subsystem::Station.supports(Mode::NotSupported));
    /// ```
    pub fn supports(&self, mode: Mode) -> bool {
        self.supported_modes().contains(&mode)
    }
}

// ============================================================================
// Status types
// ============================================================================

/// Driver-reported state of an IP-carrying link (station or tunnel).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinkStatus {
    /// Link is up.
    pub established: bool,
    /// Link is up but limited (captive portal, restricted tunnel).
    pub restricted: bool,
    /// IPv4 egress available over this link.
    pub ipv4: bool,
    /// IPv6 egress available over this link.
    pub ipv6: bool,
}

impl LinkStatus {
    /// Inactive link. Same as `Default`.
    pub const DOWN: LinkStatus = LinkStatus {
        established: false,
        restricted: false,
        ipv4: false,
        ipv6: false,
    };

    /// Established, unrestricted, dual-stack link.
    pub const fn up() -> Self {
        Self {
            established: true,
            restricted: false,
            ipv4: true,
            ipv6: true,
        }
    }

    /// Mark the link restricted.
    pub const fn restricted(mut self) -> Self {
        self.restricted = true;
        self
    }

    /// Limit the link to IPv4.
    pub const fn ipv4_only(mut self) -> Self {
        self.ipv6 = false;
        self
    }

    /// Limit the link to IPv6.
    pub const fn ipv6_only(mut self) -> Self {
        self.ipv4 = false;
        self
    }

    /// Established and not restricted.
    #[inline]
    pub const fn is_usable(&self) -> bool {
        self.established && !self.restricted
    }
}

/// Mesh network role.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MeshDeviceType {
    /// No mesh support.
    NotSupported,
    /// Routing node.
    #[default]
    Router,
    /// Full end device.
    FullEndDevice,
    /// Minimal end device.
    MinimalEndDevice,
    /// Sleepy end device that polls its parent.
    SleepyEndDevice,
}

impl MeshDeviceType {
    /// Returns the device type as a snake_case string.
    pub const fn as_str(&self) -> &'static str {
        match self {
            MeshDeviceType::NotSupported => "not_supported",
            MeshDeviceType::Router => "router",
            MeshDeviceType::FullEndDevice => "full_end_device",
            MeshDeviceType::MinimalEndDevice => "minimal_end_device",
            MeshDeviceType::SleepyEndDevice => "sleepy_end_device",
        }
    }
}

/// Parent polling intervals for a sleepy mesh end device.
///
/// All-zero means "unset, use the driver default".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PollingConfig {
    /// Poll interval while exchanges are in progress.
    pub active_interval_ms: u32,
    /// Poll interval while idle.
    pub inactive_interval_ms: u32,
}

impl PollingConfig {
    /// Create a polling config.
    pub const fn new(active_interval_ms: u32, inactive_interval_ms: u32) -> Self {
        Self {
            active_interval_ms,
            inactive_interval_ms,
        }
    }

    /// Reset to unset.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Returns true if both intervals are zero.
    pub const fn is_unset(&self) -> bool {
        self.active_interval_ms == 0 && self.inactive_interval_ms == 0
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.is_unset() {
            return Ok(());
        }
        if self.active_interval_ms == 0 || self.inactive_interval_ms == 0 {
            return Err(Error::InvalidParameter("polling intervals must be non-zero"));
        }
        Ok(())
    }
}

/// A driver-reported status change.
///
/// These arrive from the owning drivers as plain values; see
/// [`ConnectivityState::apply_status`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusUpdate {
    /// Station link state changed.
    StationLink(LinkStatus),
    /// Station credentials stored or erased.
    StationProvisioned(bool),
    /// Access point started or stopped.
    AccessPointActive(bool),
    /// Mesh attached to or detached from its network.
    MeshAttached(bool),
    /// Mesh credentials stored or erased.
    MeshProvisioned(bool),
    /// Mesh-to-service bridging became available or was lost.
    MeshServiceBridge(bool),
    /// Tunnel link state changed.
    TunnelLink(LinkStatus),
    /// Advertising started or stopped.
    Advertising(bool),
    /// Number of open short-range connections.
    AdvertisingConnections(u16),
}

impl StatusUpdate {
    /// Subsystem this update belongs to.
    pub const fn subsystem(&self) -> Subsystem {
        match self {
            StatusUpdate::StationLink(_) | StatusUpdate::StationProvisioned(_) => {
                Subsystem::Station
            }
            StatusUpdate::AccessPointActive(_) => Subsystem::AccessPoint,
            StatusUpdate::MeshAttached(_)
            | StatusUpdate::MeshProvisioned(_)
            | StatusUpdate::MeshServiceBridge(_) => Subsystem::Mesh,
            StatusUpdate::TunnelLink(_) => Subsystem::Tunnel,
            StatusUpdate::Advertising(_) | StatusUpdate::AdvertisingConnections(_) => {
                Subsystem::Advertising
            }
        }
    }

    /// Returns true if the update reports an active link.
    ///
    /// Provisioning changes are configuration, not link activity, and are
    /// accepted in every mode.
    pub const fn reports_activity(&self) -> bool {
        match self {
            StatusUpdate::StationLink(link) | StatusUpdate::TunnelLink(link) => link.established,
            StatusUpdate::AccessPointActive(v)
            | StatusUpdate::MeshAttached(v)
            | StatusUpdate::MeshServiceBridge(v)
            | StatusUpdate::Advertising(v) => *v,
            StatusUpdate::AdvertisingConnections(n) => *n > 0,
            StatusUpdate::StationProvisioned(_) | StatusUpdate::MeshProvisioned(_) => false,
        }
    }
}

/// Result of [`ConnectivityState::apply_status`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusOutcome {
    /// The update was stored.
    Applied,
    /// The update reported activity on a disabled or unsupported subsystem
    /// and was dropped.
    Ignored,
}

/// Modes of every subsystem at one instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModeSet {
    /// Station mode.
    pub station: Mode,
    /// Access point mode.
    pub access_point: Mode,
    /// Mesh mode.
    pub mesh: Mode,
    /// Tunnel mode.
    pub tunnel: Mode,
    /// Advertising mode.
    pub advertising: Mode,
}

// ============================================================================
// Per-subsystem state
// ============================================================================

#[derive(Clone, Debug)]
struct StationState {
    mode: Mode,
    link: LinkStatus,
    provisioned: bool,
    reconnect_interval_ms: u32,
}

#[derive(Clone, Debug)]
struct AccessPointState {
    mode: Mode,
    active: bool,
    demand_since_ms: Option<u64>,
    idle_timeout_ms: u32,
}

#[derive(Clone, Debug)]
struct MeshState {
    mode: Mode,
    attached: bool,
    provisioned: bool,
    service_bridge: bool,
    device_type: MeshDeviceType,
    polling: PollingConfig,
}

#[derive(Clone, Debug)]
struct TunnelState {
    mode: Mode,
    link: LinkStatus,
}

#[derive(Clone, Debug)]
struct AdvertisingState {
    mode: Mode,
    advertising_enabled: bool,
    fast_advertising: bool,
    advertising: bool,
    connections: u16,
    device_name: HString<MAX_DEVICE_NAME_LEN>,
}

#[derive(Clone, Debug)]
struct UserSelectedMode {
    active_since_ms: Option<u64>,
    timeout_secs: u16,
}

// ============================================================================
// ConnectivityState
// ============================================================================

/// Per-subsystem modes and statuses with derived connectivity facts.
///
/// Construct one per device process and pass it by reference to whatever
/// needs it; there is no global instance.
///
/// # Thread Safety
///
/// Setters take `&mut self` and assume no concurrent mutator. When several
/// execution contexts mutate the state, wrap the owning
/// [`DeviceLayer`](crate::DeviceLayer) in
/// [`SharedDeviceLayer`](crate::SharedDeviceLayer).
#[derive(Clone, Debug)]
pub struct ConnectivityState {
    station: StationState,
    access_point: AccessPointState,
    mesh: MeshState,
    tunnel: TunnelState,
    advertising: AdvertisingState,
    user_mode: UserSelectedMode,
}

impl Default for ConnectivityState {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectivityState {
    /// Create state with every subsystem supported and `Disabled`.
    pub fn new() -> Self {
        Self {
            station: StationState {
                mode: Mode::Disabled,
                link: LinkStatus::DOWN,
                provisioned: false,
                reconnect_interval_ms: DEFAULT_RECONNECT_INTERVAL_MS,
            },
            access_point: AccessPointState {
                mode: Mode::Disabled,
                active: false,
                demand_since_ms: None,
                idle_timeout_ms: DEFAULT_AP_IDLE_TIMEOUT_MS,
            },
            mesh: MeshState {
                mode: Mode::Disabled,
                attached: false,
                provisioned: false,
                service_bridge: false,
                device_type: MeshDeviceType::default(),
                polling: PollingConfig::default(),
            },
            tunnel: TunnelState {
                mode: Mode::Disabled,
                link: LinkStatus::DOWN,
            },
            advertising: AdvertisingState {
                mode: Mode::Disabled,
                advertising_enabled: false,
                fast_advertising: false,
                advertising: false,
                connections: 0,
                device_name: HString::new(),
            },
            user_mode: UserSelectedMode {
                active_since_ms: None,
                timeout_secs: DEFAULT_USER_MODE_TIMEOUT_SECS,
            },
        }
    }

    /// Mark a subsystem as not provided by this platform.
    ///
    /// Resets its status flags. Afterwards every mode setter for it fails
    /// with [`Error::Unsupported`].
    pub fn mark_unsupported(&mut self, subsystem: Subsystem) {
        *self.mode_slot(subsystem) = Mode::NotSupported;
        self.reset_status(subsystem);
        if subsystem == Subsystem::Mesh {
            self.mesh.device_type = MeshDeviceType::NotSupported;
        }
    }

    // ========================================================================
    // Generic mode access
    // ========================================================================

    /// Current mode of a subsystem.
    pub fn mode(&self, subsystem: Subsystem) -> Mode {
        match subsystem {
            Subsystem::Station => self.station.mode,
            Subsystem::AccessPoint => self.access_point.mode,
            Subsystem::Mesh => self.mesh.mode,
            Subsystem::Tunnel => self.tunnel.mode,
            Subsystem::Advertising => self.advertising.mode,
        }
    }

    /// Modes of every subsystem.
    pub fn modes(&self) -> ModeSet {
        ModeSet {
            station: self.station.mode,
            access_point: self.access_point.mode,
            mesh: self.mesh.mode,
            tunnel: self.tunnel.mode,
            advertising: self.advertising.mode,
        }
    }

    /// Set the mode of a subsystem.
    ///
    /// # Errors
    ///
    /// - [`Error::Unsupported`] if the platform lacks the subsystem.
    /// - [`Error::InvalidMode`] if `mode` is outside the subsystem's
    ///   supported set. State is left unchanged.
    ///
    /// Switching to [`Mode::Disabled`] resets the subsystem's link flags, as
    /// does leaving [`Mode::ApplicationControlled`]: status the application
    /// reported is not carried over to a driven mode.
    pub fn set_mode(&mut self, subsystem: Subsystem, mode: Mode) -> Result<()> {
        let current = self.mode(subsystem);
        if current == Mode::NotSupported {
            warn!("{}: mode change on unsupported subsystem", subsystem.as_str());
            return Err(Error::Unsupported(subsystem));
        }
        if !subsystem.supports(mode) {
            warn!(
                "{}: rejected mode {}",
                subsystem.as_str(),
                mode.as_str()
            );
            return Err(Error::InvalidMode { subsystem, mode });
        }
        if current == mode {
            return Ok(());
        }

        debug!(
            "{}: mode {} -> {}",
            subsystem.as_str(),
            current.as_str(),
            mode.as_str()
        );
        *self.mode_slot(subsystem) = mode;

        if mode == Mode::Disabled || current == Mode::ApplicationControlled {
            self.reset_status(subsystem);
        }
        if subsystem == Subsystem::AccessPoint && !mode.is_on_demand() {
            self.access_point.demand_since_ms = None;
        }
        Ok(())
    }

    fn mode_slot(&mut self, subsystem: Subsystem) -> &mut Mode {
        match subsystem {
            Subsystem::Station => &mut self.station.mode,
            Subsystem::AccessPoint => &mut self.access_point.mode,
            Subsystem::Mesh => &mut self.mesh.mode,
            Subsystem::Tunnel => &mut self.tunnel.mode,
            Subsystem::Advertising => &mut self.advertising.mode,
        }
    }

    /// Force link flags to their inactive defaults. Provisioning is kept.
    fn reset_status(&mut self, subsystem: Subsystem) {
        debug!("{}: status reset", subsystem.as_str());
        match subsystem {
            Subsystem::Station => self.station.link = LinkStatus::DOWN,
            Subsystem::AccessPoint => {
                self.access_point.active = false;
                self.access_point.demand_since_ms = None;
            }
            Subsystem::Mesh => {
                self.mesh.attached = false;
                self.mesh.service_bridge = false;
            }
            Subsystem::Tunnel => self.tunnel.link = LinkStatus::DOWN,
            Subsystem::Advertising => {
                self.advertising.advertising = false;
                self.advertising.connections = 0;
            }
        }
    }

    fn require_supported(&self, subsystem: Subsystem) -> Result<()> {
        if self.mode(subsystem) == Mode::NotSupported {
            Err(Error::Unsupported(subsystem))
        } else {
            Ok(())
        }
    }

    // ========================================================================
    // Status updates
    // ========================================================================

    /// Store a driver-reported status change.
    ///
    /// Reports of link activity for a `Disabled` or `NotSupported` subsystem
    /// are dropped and return [`StatusOutcome::Ignored`]. Reports of
    /// inactivity and provisioning changes are always stored.
    pub fn apply_status(&mut self, update: StatusUpdate) -> StatusOutcome {
        let subsystem = update.subsystem();
        let mode = self.mode(subsystem);
        if update.reports_activity() && matches!(mode, Mode::Disabled | Mode::NotSupported) {
            debug!(
                "{}: ignoring {:?} while {}",
                subsystem.as_str(),
                update,
                mode.as_str()
            );
            return StatusOutcome::Ignored;
        }

        match update {
            StatusUpdate::StationLink(link) => self.station.link = link,
            StatusUpdate::StationProvisioned(v) => self.station.provisioned = v,
            StatusUpdate::AccessPointActive(v) => self.access_point.active = v,
            StatusUpdate::MeshAttached(v) => {
                self.mesh.attached = v;
                if !v {
                    self.mesh.service_bridge = false;
                }
            }
            StatusUpdate::MeshProvisioned(v) => self.mesh.provisioned = v,
            StatusUpdate::MeshServiceBridge(v) => self.mesh.service_bridge = v,
            StatusUpdate::TunnelLink(link) => self.tunnel.link = link,
            StatusUpdate::Advertising(v) => self.advertising.advertising = v,
            StatusUpdate::AdvertisingConnections(n) => self.advertising.connections = n,
        }
        StatusOutcome::Applied
    }

    // ========================================================================
    // Station
    // ========================================================================

    /// Station mode.
    pub fn wifi_station_mode(&self) -> Mode {
        self.station.mode
    }

    /// Set the station mode.
    pub fn set_wifi_station_mode(&mut self, mode: Mode) -> Result<()> {
        self.set_mode(Subsystem::Station, mode)
    }

    /// Station mode is `Enabled`.
    pub fn is_wifi_station_enabled(&self) -> bool {
        self.station.mode == Mode::Enabled
    }

    /// Station mode is `ApplicationControlled`.
    pub fn is_wifi_station_application_controlled(&self) -> bool {
        self.station.mode == Mode::ApplicationControlled
    }

    /// Station link is established.
    pub fn is_wifi_station_connected(&self) -> bool {
        self.station.link.established
    }

    /// Station has stored credentials.
    pub fn is_wifi_station_provisioned(&self) -> bool {
        self.station.provisioned
    }

    /// Erase station provisioning. The link is reported down.
    pub fn clear_wifi_station_provision(&mut self) {
        self.station.provisioned = false;
        self.station.link = LinkStatus::DOWN;
    }

    /// Interval between station reconnect attempts.
    pub fn wifi_station_reconnect_interval_ms(&self) -> u32 {
        self.station.reconnect_interval_ms
    }

    /// Set the interval between station reconnect attempts.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidParameter`] for zero.
    pub fn set_wifi_station_reconnect_interval_ms(&mut self, ms: u32) -> Result<()> {
        if ms == 0 {
            return Err(Error::InvalidParameter("reconnect interval must be non-zero"));
        }
        self.station.reconnect_interval_ms = ms;
        Ok(())
    }

    // ========================================================================
    // Access point
    // ========================================================================

    /// Access point mode.
    pub fn wifi_ap_mode(&self) -> Mode {
        self.access_point.mode
    }

    /// Set the access point mode.
    pub fn set_wifi_ap_mode(&mut self, mode: Mode) -> Result<()> {
        self.set_mode(Subsystem::AccessPoint, mode)
    }

    /// Access point is running, as reported by its driver.
    pub fn is_wifi_ap_active(&self) -> bool {
        self.access_point.active
    }

    /// Access point mode is `ApplicationControlled`.
    pub fn is_wifi_ap_application_controlled(&self) -> bool {
        self.access_point.mode == Mode::ApplicationControlled
    }

    /// Record a demand for the on-demand access point.
    ///
    /// Only an intent: the driver polls [`wifi_ap_wanted`](Self::wifi_ap_wanted)
    /// and reports [`StatusUpdate::AccessPointActive`] once it has acted.
    /// Ignored outside the on-demand modes.
    pub fn demand_start_wifi_ap(&mut self, now_ms: u64) {
        if self.access_point.mode.is_on_demand() {
            debug!("access_point: demand start at {} ms", now_ms);
            self.access_point.demand_since_ms = Some(now_ms);
        }
    }

    /// Withdraw the on-demand access point demand.
    pub fn stop_on_demand_wifi_ap(&mut self) {
        if self.access_point.mode.is_on_demand() && self.access_point.demand_since_ms.is_some() {
            debug!("access_point: demand stopped");
            self.access_point.demand_since_ms = None;
        }
    }

    /// Refresh an outstanding demand so the idle timeout restarts.
    pub fn maintain_on_demand_wifi_ap(&mut self, now_ms: u64) {
        if self.access_point.mode.is_on_demand() && self.access_point.demand_since_ms.is_some() {
            self.access_point.demand_since_ms = Some(now_ms);
        }
    }

    /// Idle timeout for the on-demand access point.
    pub fn wifi_ap_idle_timeout_ms(&self) -> u32 {
        self.access_point.idle_timeout_ms
    }

    /// Set the idle timeout for the on-demand access point.
    pub fn set_wifi_ap_idle_timeout_ms(&mut self, ms: u32) {
        self.access_point.idle_timeout_ms = ms;
    }

    /// Whether the access point driver should be running the AP right now.
    ///
    /// - `Enabled`: always.
    /// - `OnDemand`: while a demand younger than the idle timeout is outstanding.
    /// - `OnDemandNoStationProvision`: as `OnDemand`, but only while the
    ///   station is unprovisioned.
    /// - Anything else: never.
    pub fn wifi_ap_wanted(&self, now_ms: u64) -> bool {
        match self.access_point.mode {
            Mode::Enabled => true,
            Mode::OnDemand => self.ap_demand_live(now_ms),
            Mode::OnDemandNoStationProvision => {
                !self.station.provisioned && self.ap_demand_live(now_ms)
            }
            _ => false,
        }
    }

    fn ap_demand_live(&self, now_ms: u64) -> bool {
        self.access_point
            .demand_since_ms
            .map(|since| now_ms.saturating_sub(since) < u64::from(self.access_point.idle_timeout_ms))
            .unwrap_or(false)
    }

    // ========================================================================
    // Mesh
    // ========================================================================

    /// Mesh mode.
    pub fn mesh_mode(&self) -> Mode {
        self.mesh.mode
    }

    /// Set the mesh mode.
    pub fn set_mesh_mode(&mut self, mode: Mode) -> Result<()> {
        self.set_mode(Subsystem::Mesh, mode)
    }

    /// Mesh mode is `Enabled`.
    pub fn is_mesh_enabled(&self) -> bool {
        self.mesh.mode == Mode::Enabled
    }

    /// Mesh mode is `ApplicationControlled`.
    pub fn is_mesh_application_controlled(&self) -> bool {
        self.mesh.mode == Mode::ApplicationControlled
    }

    /// Mesh role.
    pub fn mesh_device_type(&self) -> MeshDeviceType {
        self.mesh.device_type
    }

    /// Set the mesh role.
    ///
    /// # Errors
    ///
    /// - [`Error::Unsupported`] if the platform lacks a mesh radio.
    /// - [`Error::InvalidParameter`] for [`MeshDeviceType::NotSupported`].
    pub fn set_mesh_device_type(&mut self, device_type: MeshDeviceType) -> Result<()> {
        self.require_supported(Subsystem::Mesh)?;
        if device_type == MeshDeviceType::NotSupported {
            return Err(Error::InvalidParameter("mesh device type not requestable"));
        }
        self.mesh.device_type = device_type;
        Ok(())
    }

    /// Sleepy end device polling intervals.
    pub fn mesh_polling_config(&self) -> PollingConfig {
        self.mesh.polling
    }

    /// Set sleepy end device polling intervals.
    ///
    /// # Errors
    ///
    /// - [`Error::Unsupported`] if the platform lacks a mesh radio.
    /// - [`Error::InvalidParameter`] if exactly one interval is zero.
    pub fn set_mesh_polling_config(&mut self, polling: PollingConfig) -> Result<()> {
        self.require_supported(Subsystem::Mesh)?;
        polling.validate()?;
        self.mesh.polling = polling;
        Ok(())
    }

    /// Mesh is attached to its network.
    pub fn is_mesh_attached(&self) -> bool {
        self.mesh.attached
    }

    /// Mesh has stored network credentials.
    pub fn is_mesh_provisioned(&self) -> bool {
        self.mesh.provisioned
    }

    /// Mesh-to-service bridging is available.
    pub fn is_mesh_service_bridge_available(&self) -> bool {
        self.mesh.service_bridge
    }

    /// Erase mesh provisioning. The mesh is reported detached.
    pub fn clear_mesh_provision(&mut self) {
        self.mesh.provisioned = false;
        self.mesh.attached = false;
        self.mesh.service_bridge = false;
    }

    // ========================================================================
    // Tunnel
    // ========================================================================

    /// Service tunnel mode.
    pub fn service_tunnel_mode(&self) -> Mode {
        self.tunnel.mode
    }

    /// Set the service tunnel mode.
    pub fn set_service_tunnel_mode(&mut self, mode: Mode) -> Result<()> {
        self.set_mode(Subsystem::Tunnel, mode)
    }

    /// Tunnel is established.
    pub fn is_service_tunnel_connected(&self) -> bool {
        self.tunnel.link.established
    }

    /// Tunnel is established but restricted.
    pub fn is_service_tunnel_restricted(&self) -> bool {
        self.tunnel.link.established && self.tunnel.link.restricted
    }

    // ========================================================================
    // Advertising
    // ========================================================================

    /// Short-range advertising service mode.
    pub fn ble_service_mode(&self) -> Mode {
        self.advertising.mode
    }

    /// Set the short-range advertising service mode.
    pub fn set_ble_service_mode(&mut self, mode: Mode) -> Result<()> {
        self.set_mode(Subsystem::Advertising, mode)
    }

    /// Advertising is requested.
    pub fn is_ble_advertising_enabled(&self) -> bool {
        self.advertising.advertising_enabled
    }

    /// Request or withdraw advertising.
    pub fn set_ble_advertising_enabled(&mut self, enabled: bool) -> Result<()> {
        self.require_supported(Subsystem::Advertising)?;
        self.advertising.advertising_enabled = enabled;
        Ok(())
    }

    /// Fast advertising interval is requested.
    pub fn is_ble_fast_advertising_enabled(&self) -> bool {
        self.advertising.fast_advertising
    }

    /// Request or withdraw the fast advertising interval.
    pub fn set_ble_fast_advertising_enabled(&mut self, enabled: bool) -> Result<()> {
        self.require_supported(Subsystem::Advertising)?;
        self.advertising.fast_advertising = enabled;
        Ok(())
    }

    /// Radio is advertising, as reported by its driver.
    pub fn is_ble_advertising(&self) -> bool {
        self.advertising.advertising
    }

    /// Advertised device name. Empty means the driver default.
    pub fn ble_device_name(&self) -> &str {
        self.advertising.device_name.as_str()
    }

    /// Set the advertised device name. An empty name restores the default.
    ///
    /// # Errors
    ///
    /// - [`Error::Unsupported`] if the platform lacks the radio.
    /// - [`Error::NameTooLong`] above [`MAX_DEVICE_NAME_LEN`] bytes.
    pub fn set_ble_device_name(&mut self, name: &str) -> Result<()> {
        self.require_supported(Subsystem::Advertising)?;
        let mut buf = HString::new();
        buf.push_str(name).map_err(|_| Error::NameTooLong {
            max: MAX_DEVICE_NAME_LEN,
        })?;
        self.advertising.device_name = buf;
        Ok(())
    }

    /// Open short-range connections.
    pub fn num_ble_connections(&self) -> u16 {
        self.advertising.connections
    }

    // ========================================================================
    // User-selected mode
    // ========================================================================

    /// User-selected mode is on and has not timed out.
    pub fn is_user_selected_mode_active(&self, now_ms: u64) -> bool {
        let timeout_ms = u64::from(self.user_mode.timeout_secs) * 1000;
        self.user_mode
            .active_since_ms
            .map(|since| now_ms.saturating_sub(since) < timeout_ms)
            .unwrap_or(false)
    }

    /// Turn user-selected mode on (restarting its timeout) or off.
    pub fn set_user_selected_mode(&mut self, active: bool, now_ms: u64) {
        self.user_mode.active_since_ms = active.then_some(now_ms);
    }

    /// User-selected mode timeout.
    pub fn user_selected_mode_timeout_secs(&self) -> u16 {
        self.user_mode.timeout_secs
    }

    /// Set the user-selected mode timeout.
    pub fn set_user_selected_mode_timeout_secs(&mut self, secs: u16) {
        self.user_mode.timeout_secs = secs;
    }
}

impl ConnectivityManager for ConnectivityState {
    fn mode(&self, subsystem: Subsystem) -> Mode {
        ConnectivityState::mode(self, subsystem)
    }

    fn station_link(&self) -> LinkStatus {
        self.station.link
    }

    fn tunnel_link(&self) -> LinkStatus {
        self.tunnel.link
    }

    fn is_mesh_attached(&self) -> bool {
        self.mesh.attached
    }

    fn is_mesh_service_bridge_available(&self) -> bool {
        self.mesh.service_bridge
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Mode / Subsystem Tests
    // =========================================================================

    #[test]
    fn mode_text_round_trip() {
        for mode in Mode::ALL {
            assert_eq!(Mode::from_text(mode.as_str()), Some(mode));
        }
    }

    #[test]
    fn mode_from_text_case_and_whitespace() {
        assert_eq!(Mode::from_text("  ENABLED\n"), Some(Mode::Enabled));
        assert_eq!(Mode::from_text("On_Demand"), Some(Mode::OnDemand));
        assert_eq!(Mode::from_text(""), None);
        assert_eq!(Mode::from_text("enable"), None);
    }

    #[test]
    fn driven_modes() {
        assert!(Mode::Enabled.is_driven());
        assert!(Mode::OnDemand.is_driven());
        assert!(Mode::OnDemandNoStationProvision.is_driven());
        assert!(!Mode::Disabled.is_driven());
        assert!(!Mode::ApplicationControlled.is_driven());
        assert!(!Mode::NotSupported.is_driven());
    }

    #[test]
    fn no_subsystem_accepts_not_supported() {
        for subsystem in Subsystem::ALL {
            assert!(!subsystem.supports(Mode::NotSupported));
            assert!(subsystem.supports(Mode::Disabled));
            assert!(subsystem.supports(Mode::Enabled));
        }
    }

    #[test]
    fn only_access_point_accepts_on_demand() {
        for subsystem in Subsystem::ALL {
            assert_eq!(
                subsystem.supports(Mode::OnDemand),
                subsystem == Subsystem::AccessPoint
            );
        }
    }

    #[test]
    fn tunnel_and_advertising_reject_application_control() {
        assert!(!Subsystem::Tunnel.supports(Mode::ApplicationControlled));
        assert!(!Subsystem::Advertising.supports(Mode::ApplicationControlled));
    }

    // =========================================================================
    // Mode Setter Tests
    // =========================================================================

    #[test]
    fn new_state_is_all_disabled() {
        let conn = ConnectivityState::new();
        for subsystem in Subsystem::ALL {
            assert_eq!(conn.mode(subsystem), Mode::Disabled);
        }
    }

    #[test]
    fn invalid_mode_leaves_state_unchanged() {
        let mut conn = ConnectivityState::new();
        conn.set_mesh_mode(Mode::Enabled).unwrap();

        let err = conn.set_mesh_mode(Mode::OnDemand).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidMode {
                subsystem: Subsystem::Mesh,
                mode: Mode::OnDemand,
            }
        );
        assert_eq!(conn.mesh_mode(), Mode::Enabled);
    }

    #[test]
    fn unsupported_subsystem_rejects_every_mode() {
        let mut conn = ConnectivityState::new();
        conn.mark_unsupported(Subsystem::Mesh);

        for mode in Mode::ALL {
            assert_eq!(
                conn.set_mesh_mode(mode),
                Err(Error::Unsupported(Subsystem::Mesh))
            );
        }
        assert_eq!(conn.mesh_mode(), Mode::NotSupported);
        assert_eq!(conn.mesh_device_type(), MeshDeviceType::NotSupported);
    }

    #[test]
    fn setting_same_mode_is_a_no_op() {
        let mut conn = ConnectivityState::new();
        conn.set_wifi_station_mode(Mode::Enabled).unwrap();
        conn.apply_status(StatusUpdate::StationLink(LinkStatus::up()));

        conn.set_wifi_station_mode(Mode::Enabled).unwrap();
        assert!(conn.is_wifi_station_connected());
    }

    #[test]
    fn disable_resets_station_link_but_keeps_provision() {
        let mut conn = ConnectivityState::new();
        conn.set_wifi_station_mode(Mode::Enabled).unwrap();
        conn.apply_status(StatusUpdate::StationProvisioned(true));
        conn.apply_status(StatusUpdate::StationLink(LinkStatus::up()));

        conn.set_wifi_station_mode(Mode::Disabled).unwrap();
        assert!(!conn.is_wifi_station_connected());
        assert_eq!(conn.station_link(), LinkStatus::DOWN);
        assert!(conn.is_wifi_station_provisioned());
    }

    #[test]
    fn disable_resets_advertising_status() {
        let mut conn = ConnectivityState::new();
        conn.set_ble_service_mode(Mode::Enabled).unwrap();
        conn.apply_status(StatusUpdate::Advertising(true));
        conn.apply_status(StatusUpdate::AdvertisingConnections(2));

        conn.set_ble_service_mode(Mode::Disabled).unwrap();
        assert!(!conn.is_ble_advertising());
        assert_eq!(conn.num_ble_connections(), 0);
    }

    // =========================================================================
    // Status Update Tests
    // =========================================================================

    #[test]
    fn link_up_ignored_while_disabled() {
        let mut conn = ConnectivityState::new();
        let outcome = conn.apply_status(StatusUpdate::TunnelLink(LinkStatus::up()));
        assert_eq!(outcome, StatusOutcome::Ignored);
        assert!(!conn.is_service_tunnel_connected());
    }

    #[test]
    fn link_down_applied_while_disabled() {
        let mut conn = ConnectivityState::new();
        let outcome = conn.apply_status(StatusUpdate::TunnelLink(LinkStatus::DOWN));
        assert_eq!(outcome, StatusOutcome::Applied);
    }

    #[test]
    fn provisioning_applied_in_any_mode() {
        let mut conn = ConnectivityState::new();
        assert_eq!(
            conn.apply_status(StatusUpdate::MeshProvisioned(true)),
            StatusOutcome::Applied
        );
        assert!(conn.is_mesh_provisioned());
    }

    #[test]
    fn application_controlled_status_is_stored() {
        let mut conn = ConnectivityState::new();
        conn.set_wifi_station_mode(Mode::ApplicationControlled)
            .unwrap();
        assert_eq!(
            conn.apply_status(StatusUpdate::StationLink(LinkStatus::up())),
            StatusOutcome::Applied
        );
        assert!(conn.is_wifi_station_connected());
    }

    #[test]
    fn mesh_detach_drops_bridge() {
        let mut conn = ConnectivityState::new();
        conn.set_mesh_mode(Mode::Enabled).unwrap();
        conn.apply_status(StatusUpdate::MeshAttached(true));
        conn.apply_status(StatusUpdate::MeshServiceBridge(true));

        conn.apply_status(StatusUpdate::MeshAttached(false));
        assert!(!conn.is_mesh_service_bridge_available());
    }

    #[test]
    fn status_update_subsystem_mapping() {
        assert_eq!(
            StatusUpdate::StationProvisioned(true).subsystem(),
            Subsystem::Station
        );
        assert_eq!(
            StatusUpdate::AccessPointActive(true).subsystem(),
            Subsystem::AccessPoint
        );
        assert_eq!(
            StatusUpdate::MeshServiceBridge(true).subsystem(),
            Subsystem::Mesh
        );
        assert_eq!(
            StatusUpdate::TunnelLink(LinkStatus::DOWN).subsystem(),
            Subsystem::Tunnel
        );
        assert_eq!(
            StatusUpdate::AdvertisingConnections(1).subsystem(),
            Subsystem::Advertising
        );
    }

    // =========================================================================
    // Station / Mesh Settings Tests
    // =========================================================================

    #[test]
    fn reconnect_interval_rejects_zero() {
        let mut conn = ConnectivityState::new();
        assert!(matches!(
            conn.set_wifi_station_reconnect_interval_ms(0),
            Err(Error::InvalidParameter(_))
        ));
        assert_eq!(
            conn.wifi_station_reconnect_interval_ms(),
            DEFAULT_RECONNECT_INTERVAL_MS
        );

        conn.set_wifi_station_reconnect_interval_ms(10_000).unwrap();
        assert_eq!(conn.wifi_station_reconnect_interval_ms(), 10_000);
    }

    #[test]
    fn clear_station_provision_drops_link() {
        let mut conn = ConnectivityState::new();
        conn.set_wifi_station_mode(Mode::Enabled).unwrap();
        conn.apply_status(StatusUpdate::StationProvisioned(true));
        conn.apply_status(StatusUpdate::StationLink(LinkStatus::up()));

        conn.clear_wifi_station_provision();
        assert!(!conn.is_wifi_station_provisioned());
        assert!(!conn.is_wifi_station_connected());
    }

    #[test]
    fn mesh_device_type_validation() {
        let mut conn = ConnectivityState::new();
        conn.set_mesh_device_type(MeshDeviceType::SleepyEndDevice)
            .unwrap();
        assert_eq!(conn.mesh_device_type(), MeshDeviceType::SleepyEndDevice);

        assert!(matches!(
            conn.set_mesh_device_type(MeshDeviceType::NotSupported),
            Err(Error::InvalidParameter(_))
        ));
        assert_eq!(conn.mesh_device_type(), MeshDeviceType::SleepyEndDevice);
    }

    #[test]
    fn mesh_polling_config_validation() {
        let mut conn = ConnectivityState::new();
        conn.set_mesh_polling_config(PollingConfig::new(100, 5_000))
            .unwrap();
        assert_eq!(conn.mesh_polling_config(), PollingConfig::new(100, 5_000));

        assert!(conn
            .set_mesh_polling_config(PollingConfig::new(0, 5_000))
            .is_err());
        assert_eq!(conn.mesh_polling_config(), PollingConfig::new(100, 5_000));

        conn.set_mesh_polling_config(PollingConfig::default())
            .unwrap();
        assert!(conn.mesh_polling_config().is_unset());
    }

    #[test]
    fn polling_config_clear() {
        let mut polling = PollingConfig::new(1, 2);
        polling.clear();
        assert!(polling.is_unset());
    }

    // =========================================================================
    // Access Point On-Demand Tests
    // =========================================================================

    #[test]
    fn ap_enabled_is_always_wanted() {
        let mut conn = ConnectivityState::new();
        assert!(!conn.wifi_ap_wanted(0));
        conn.set_wifi_ap_mode(Mode::Enabled).unwrap();
        assert!(conn.wifi_ap_wanted(0));
        assert!(conn.wifi_ap_wanted(u64::MAX));
    }

    #[test]
    fn ap_demand_expires_after_idle_timeout() {
        let mut conn = ConnectivityState::new();
        conn.set_wifi_ap_mode(Mode::OnDemand).unwrap();
        conn.set_wifi_ap_idle_timeout_ms(1_000);
        assert!(!conn.wifi_ap_wanted(0));

        conn.demand_start_wifi_ap(500);
        assert!(conn.wifi_ap_wanted(500));
        assert!(conn.wifi_ap_wanted(1_499));
        assert!(!conn.wifi_ap_wanted(1_500));
    }

    #[test]
    fn ap_maintain_extends_demand() {
        let mut conn = ConnectivityState::new();
        conn.set_wifi_ap_mode(Mode::OnDemand).unwrap();
        conn.set_wifi_ap_idle_timeout_ms(1_000);

        conn.demand_start_wifi_ap(0);
        conn.maintain_on_demand_wifi_ap(900);
        assert!(conn.wifi_ap_wanted(1_800));

        conn.stop_on_demand_wifi_ap();
        assert!(!conn.wifi_ap_wanted(1_800));
    }

    #[test]
    fn ap_maintain_without_demand_does_nothing() {
        let mut conn = ConnectivityState::new();
        conn.set_wifi_ap_mode(Mode::OnDemand).unwrap();
        conn.maintain_on_demand_wifi_ap(100);
        assert!(!conn.wifi_ap_wanted(100));
    }

    #[test]
    fn ap_demand_ignored_outside_on_demand_modes() {
        let mut conn = ConnectivityState::new();
        conn.demand_start_wifi_ap(0);
        conn.set_wifi_ap_mode(Mode::OnDemand).unwrap();
        assert!(!conn.wifi_ap_wanted(0));
    }

    #[test]
    fn ap_leaving_on_demand_clears_demand() {
        let mut conn = ConnectivityState::new();
        conn.set_wifi_ap_mode(Mode::OnDemand).unwrap();
        conn.demand_start_wifi_ap(0);
        conn.set_wifi_ap_mode(Mode::ApplicationControlled).unwrap();
        conn.set_wifi_ap_mode(Mode::OnDemand).unwrap();
        assert!(!conn.wifi_ap_wanted(0));
    }

    #[test]
    fn ap_no_station_provision_mode() {
        let mut conn = ConnectivityState::new();
        conn.set_wifi_ap_mode(Mode::OnDemandNoStationProvision)
            .unwrap();
        conn.demand_start_wifi_ap(0);
        assert!(conn.wifi_ap_wanted(10));

        conn.apply_status(StatusUpdate::StationProvisioned(true));
        assert!(!conn.wifi_ap_wanted(10));

        conn.clear_wifi_station_provision();
        assert!(conn.wifi_ap_wanted(10));
    }

    // =========================================================================
    // Advertising Tests
    // =========================================================================

    #[test]
    fn ble_device_name_limits() {
        let mut conn = ConnectivityState::new();
        conn.set_ble_device_name("porch-sensor").unwrap();
        assert_eq!(conn.ble_device_name(), "porch-sensor");

        let long = "x".repeat(MAX_DEVICE_NAME_LEN + 1);
        assert_eq!(
            conn.set_ble_device_name(&long),
            Err(Error::NameTooLong {
                max: MAX_DEVICE_NAME_LEN
            })
        );
        assert_eq!(conn.ble_device_name(), "porch-sensor");

        conn.set_ble_device_name("").unwrap();
        assert_eq!(conn.ble_device_name(), "");
    }

    #[test]
    fn ble_settings_unsupported() {
        let mut conn = ConnectivityState::new();
        conn.mark_unsupported(Subsystem::Advertising);
        assert_eq!(
            conn.set_ble_advertising_enabled(true),
            Err(Error::Unsupported(Subsystem::Advertising))
        );
        assert_eq!(
            conn.set_ble_fast_advertising_enabled(true),
            Err(Error::Unsupported(Subsystem::Advertising))
        );
        assert!(conn.set_ble_device_name("x").is_err());
    }

    #[test]
    fn ble_advertising_flags() {
        let mut conn = ConnectivityState::new();
        conn.set_ble_advertising_enabled(true).unwrap();
        conn.set_ble_fast_advertising_enabled(true).unwrap();
        assert!(conn.is_ble_advertising_enabled());
        assert!(conn.is_ble_fast_advertising_enabled());
        // Requested, but the driver has not reported anything yet.
        assert!(!conn.is_ble_advertising());
    }

    // =========================================================================
    // User-Selected Mode Tests
    // =========================================================================

    #[test]
    fn user_selected_mode_times_out() {
        let mut conn = ConnectivityState::new();
        conn.set_user_selected_mode_timeout_secs(10);
        assert!(!conn.is_user_selected_mode_active(0));

        conn.set_user_selected_mode(true, 1_000);
        assert!(conn.is_user_selected_mode_active(1_000));
        assert!(conn.is_user_selected_mode_active(10_999));
        assert!(!conn.is_user_selected_mode_active(11_000));
    }

    #[test]
    fn user_selected_mode_turn_off() {
        let mut conn = ConnectivityState::new();
        conn.set_user_selected_mode(true, 0);
        conn.set_user_selected_mode(false, 0);
        assert!(!conn.is_user_selected_mode_active(0));
        assert_eq!(
            conn.user_selected_mode_timeout_secs(),
            DEFAULT_USER_MODE_TIMEOUT_SECS
        );
    }
}
