//! Connectivity facts surface.
//!
//! [`ConnectivityManager`] is the read-only view that connectivity consumers
//! (service clients, status broadcasters, UI) depend on. Implementors supply
//! per-subsystem modes and raw status; the derived facts are default methods
//! computed from those on every call and never cached.
//!
//! # Derived Facts
//!
//! | Fact | True when |
//! |------|-----------|
//! | IPv4 internet | station or tunnel driven, established, unrestricted, with IPv4 |
//! | IPv6 internet | station or tunnel driven, established, unrestricted, with IPv6 |
//! | Service via tunnel | tunnel driven, established, unrestricted |
//! | Service via mesh | mesh driven, attached, service bridge available |
//! | Service | via tunnel OR via mesh |
//!
//! "Driven" means [`Mode::is_driven`]. A subsystem that is `NotSupported`,
//! `ApplicationControlled` or `Disabled` never contributes.

use crate::connectivity::{LinkStatus, Mode, Subsystem};

/// Read-only connectivity facts.
///
/// # Implementation Notes
///
/// - Only the five required methods carry state. Do not override the
///   derived-fact defaults unless the platform has a more direct signal.
/// - Status reported for a subsystem outside a driven mode is kept but
///   does not leak into any derived fact.
///
/// # Example
///
/// ```rust
/// use device_layer::{ConnectivityState, LinkStatus, Mode, StatusUpdate};
/// use device_layer::traits::ConnectivityManager;
///
/// fn report<C: ConnectivityManager>(conn: &C) -> (bool, bool) {
///     (conn.have_ipv4_internet_connectivity(), conn.have_service_connectivity())
/// }
///
/// let mut conn = ConnectivityState::new();
/// conn.set_wifi_station_mode(Mode::Enabled).unwrap();
/// conn.apply_status(StatusUpdate::StationLink(LinkStatus::up().ipv4_only()));
///
/// assert_eq!(report(&conn), (true, false));
/// ```
pub trait ConnectivityManager {
    /// Current mode of a subsystem.
    fn mode(&self, subsystem: Subsystem) -> Mode;

    /// Station link status as last reported.
    fn station_link(&self) -> LinkStatus;

    /// Tunnel link status as last reported.
    fn tunnel_link(&self) -> LinkStatus;

    /// Mesh attached, as last reported.
    fn is_mesh_attached(&self) -> bool;

    /// Mesh service bridge available, as last reported.
    fn is_mesh_service_bridge_available(&self) -> bool;

    /// Returns true if this subsystem's status may contribute to derived facts.
    fn contributes(&self, subsystem: Subsystem) -> bool {
        self.mode(subsystem).is_driven()
    }

    /// Usable IPv4 egress over the station or the tunnel.
    fn have_ipv4_internet_connectivity(&self) -> bool {
        let station = self.station_link();
        let tunnel = self.tunnel_link();
        (self.contributes(Subsystem::Station) && station.is_usable() && station.ipv4)
            || (self.contributes(Subsystem::Tunnel) && tunnel.is_usable() && tunnel.ipv4)
    }

    /// Usable IPv6 egress over the station or the tunnel.
    fn have_ipv6_internet_connectivity(&self) -> bool {
        let station = self.station_link();
        let tunnel = self.tunnel_link();
        (self.contributes(Subsystem::Station) && station.is_usable() && station.ipv6)
            || (self.contributes(Subsystem::Tunnel) && tunnel.is_usable() && tunnel.ipv6)
    }

    /// The service is reachable over the tunnel.
    fn have_service_connectivity_via_tunnel(&self) -> bool {
        self.contributes(Subsystem::Tunnel) && self.tunnel_link().is_usable()
    }

    /// The service is reachable through the mesh.
    fn have_service_connectivity_via_mesh(&self) -> bool {
        self.contributes(Subsystem::Mesh)
            && self.is_mesh_attached()
            && self.is_mesh_service_bridge_available()
    }

    /// The service is reachable by any path.
    fn have_service_connectivity(&self) -> bool {
        self.have_service_connectivity_via_tunnel() || self.have_service_connectivity_via_mesh()
    }
}

impl<T: ConnectivityManager + ?Sized> ConnectivityManager for &T {
    fn mode(&self, subsystem: Subsystem) -> Mode {
        (**self).mode(subsystem)
    }

    fn station_link(&self) -> LinkStatus {
        (**self).station_link()
    }

    fn tunnel_link(&self) -> LinkStatus {
        (**self).tunnel_link()
    }

    fn is_mesh_attached(&self) -> bool {
        (**self).is_mesh_attached()
    }

    fn is_mesh_service_bridge_available(&self) -> bool {
        (**self).is_mesh_service_bridge_available()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestConnectivity {
        station_mode: Mode,
        tunnel_mode: Mode,
        mesh_mode: Mode,
        station: LinkStatus,
        tunnel: LinkStatus,
        mesh_attached: bool,
        mesh_bridge: bool,
    }

    impl TestConnectivity {
        fn new() -> Self {
            Self {
                station_mode: Mode::Enabled,
                tunnel_mode: Mode::Enabled,
                mesh_mode: Mode::Enabled,
                station: LinkStatus::DOWN,
                tunnel: LinkStatus::DOWN,
                mesh_attached: false,
                mesh_bridge: false,
            }
        }
    }

    impl ConnectivityManager for TestConnectivity {
        fn mode(&self, subsystem: Subsystem) -> Mode {
            match subsystem {
                Subsystem::Station => self.station_mode,
                Subsystem::Tunnel => self.tunnel_mode,
                Subsystem::Mesh => self.mesh_mode,
                Subsystem::AccessPoint | Subsystem::Advertising => Mode::Disabled,
            }
        }

        fn station_link(&self) -> LinkStatus {
            self.station
        }

        fn tunnel_link(&self) -> LinkStatus {
            self.tunnel
        }

        fn is_mesh_attached(&self) -> bool {
            self.mesh_attached
        }

        fn is_mesh_service_bridge_available(&self) -> bool {
            self.mesh_bridge
        }
    }

    // =========================================================================
    // Internet Tests
    // =========================================================================

    #[test]
    fn nothing_up_means_no_facts() {
        let conn = TestConnectivity::new();
        assert!(!conn.have_ipv4_internet_connectivity());
        assert!(!conn.have_ipv6_internet_connectivity());
        assert!(!conn.have_service_connectivity());
    }

    #[test]
    fn station_gives_internet_per_family() {
        let mut conn = TestConnectivity::new();
        conn.station = LinkStatus::up().ipv6_only();
        assert!(!conn.have_ipv4_internet_connectivity());
        assert!(conn.have_ipv6_internet_connectivity());
        // Station alone never reaches the service.
        assert!(!conn.have_service_connectivity());
    }

    #[test]
    fn restricted_link_gives_no_internet() {
        let mut conn = TestConnectivity::new();
        conn.station = LinkStatus::up().restricted();
        conn.tunnel = LinkStatus::up().restricted();
        assert!(!conn.have_ipv4_internet_connectivity());
        assert!(!conn.have_service_connectivity_via_tunnel());
    }

    #[test]
    fn application_controlled_station_never_contributes() {
        let mut conn = TestConnectivity::new();
        conn.station_mode = Mode::ApplicationControlled;
        conn.station = LinkStatus::up();
        assert!(!conn.have_ipv4_internet_connectivity());
        assert!(!conn.have_ipv6_internet_connectivity());
    }

    #[test]
    fn not_supported_tunnel_never_contributes() {
        let mut conn = TestConnectivity::new();
        conn.tunnel_mode = Mode::NotSupported;
        conn.tunnel = LinkStatus::up();
        assert!(!conn.have_ipv4_internet_connectivity());
        assert!(!conn.have_service_connectivity());
    }

    // =========================================================================
    // Service Tests
    // =========================================================================

    #[test]
    fn service_via_tunnel() {
        let mut conn = TestConnectivity::new();
        conn.tunnel = LinkStatus::up();
        assert!(conn.have_service_connectivity_via_tunnel());
        assert!(!conn.have_service_connectivity_via_mesh());
        assert!(conn.have_service_connectivity());
    }

    #[test]
    fn service_via_mesh_needs_bridge() {
        let mut conn = TestConnectivity::new();
        conn.mesh_attached = true;
        assert!(!conn.have_service_connectivity_via_mesh());

        conn.mesh_bridge = true;
        assert!(conn.have_service_connectivity_via_mesh());
        assert!(conn.have_service_connectivity());

        conn.mesh_mode = Mode::ApplicationControlled;
        assert!(!conn.have_service_connectivity());
    }

    #[test]
    fn works_by_reference() {
        let mut conn = TestConnectivity::new();
        conn.tunnel = LinkStatus::up();
        let by_ref = &conn;
        assert!(ConnectivityManager::have_service_connectivity(&by_ref));
    }
}
