//! Shared access to the device layer from several execution contexts.
//!
//! [`Shared`] wraps a value in a `critical_section::Mutex<RefCell<_>>`, so
//! every access is a scoped critical section that is released on every exit
//! path. It works the same from tasks and interrupt handlers.
//!
//! A `critical-section` implementation must be linked into the final binary.
//! On ESP32 `esp-idf-hal` provides one; host tests use the `std` one.
//!
//! # Example
//!
//! ```rust
//! use device_layer::{Config, DeviceLayer, SharedDeviceLayer, Mode, hal::MockTickSource};
//!
//! let device = DeviceLayer::new(MockTickSource::new(32, 1000), &Config::default()).unwrap();
//! let shared = SharedDeviceLayer::new(device);
//!
//! // Mutators take the lock for the duration of the closure.
//! shared.with(|device| device.connectivity_mut().set_service_tunnel_mode(Mode::Enabled)).unwrap();
//!
//! // Change detection for status broadcasting.
//! assert!(shared.check_changes().is_some());
//! assert!(shared.check_changes().is_none());
//! ```

use core::cell::RefCell;

use critical_section::Mutex;

use crate::device::{DeviceLayer, DeviceStatus};
use crate::traits::TickSource;

/// A value guarded by a critical section.
pub struct Shared<T> {
    inner: Mutex<RefCell<T>>,
}

impl<T> Shared<T> {
    /// Wrap a value.
    pub const fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(value)),
        }
    }

    /// Run `f` with exclusive access.
    ///
    /// Do not call back into the same `Shared` from inside `f`.
    pub fn with<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        critical_section::with(|cs| f(&mut self.inner.borrow_ref_mut(cs)))
    }

    /// Run `f` with shared access.
    pub fn read<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        critical_section::with(|cs| f(&self.inner.borrow_ref(cs)))
    }

    /// Unwrap the value.
    pub fn into_inner(self) -> T {
        self.inner.into_inner().into_inner()
    }
}

/// A [`DeviceLayer`] shared between contexts, with status change detection.
///
/// Change detection keeps its own critical section so a broadcaster polling
/// for changes holds the device lock only long enough to take a snapshot.
pub struct SharedDeviceLayer<S: TickSource> {
    device: Shared<DeviceLayer<S>>,
    last_status: Shared<Option<DeviceStatus>>,
}

impl<S: TickSource> SharedDeviceLayer<S> {
    /// Wrap a device layer.
    pub fn new(device: DeviceLayer<S>) -> Self {
        Self {
            device: Shared::new(device),
            last_status: Shared::new(None),
        }
    }

    /// Run `f` with exclusive access to the device layer.
    pub fn with<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut DeviceLayer<S>) -> R,
    {
        self.device.with(f)
    }

    /// Run `f` with shared access to the device layer.
    pub fn read<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&DeviceLayer<S>) -> R,
    {
        self.device.read(f)
    }

    /// Current status snapshot.
    pub fn status(&self) -> DeviceStatus {
        self.device.read(|device| device.status())
    }

    /// Returns the status if modes, derived facts or sync state changed since
    /// the last call. The first call always returns a status.
    pub fn check_changes(&self) -> Option<DeviceStatus> {
        let status = self.status();
        self.last_status.with(|last| {
            let changed = last
                .as_ref()
                .map(|prev| status.connectivity_changed(prev))
                .unwrap_or(true);
            if changed {
                *last = Some(status);
                Some(status)
            } else {
                None
            }
        })
    }

    /// Unwrap the device layer.
    pub fn into_inner(self) -> DeviceLayer<S> {
        self.device.into_inner()
    }
}
