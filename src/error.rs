//! Error taxonomy for the device layer.
//!
//! Every error here is locally recoverable: callers are expected to match
//! and branch. Nothing in this crate retries on its own.
//!
//! | Variant | Raised by |
//! |---------|-----------|
//! | [`Error::NotSynced`] | real-time reads before the first valid sync |
//! | [`Error::InvalidMode`] | mode setters given a mode outside the subsystem's set |
//! | [`Error::InvalidParameter`] | out-of-range configuration (zero tick rate, etc.) |
//! | [`Error::Unsupported`] | operations on a subsystem the platform lacks |
//! | [`Error::NameTooLong`] | advertising device names over the size limit |

use thiserror::Error;

use crate::connectivity::{Mode, Subsystem};

/// Errors returned by the device layer.
///
/// All variants are `Copy` and carry no heap data, so they are cheap to
/// return from interrupt-adjacent code paths.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum Error {
    /// Real time was requested before any synchronization.
    #[error("real time not synchronized")]
    NotSynced,

    /// The requested mode is not a member of the subsystem's supported set.
    #[error("mode {} not valid for {}", .mode.as_str(), .subsystem.as_str())]
    InvalidMode {
        /// Subsystem the mode was requested for.
        subsystem: Subsystem,
        /// The rejected mode.
        mode: Mode,
    },

    /// A configuration value is out of range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),

    /// The platform does not provide this subsystem.
    #[error("{} not supported on this platform", .0.as_str())]
    Unsupported(Subsystem),

    /// A device name exceeded the maximum length.
    #[error("name longer than {max} bytes")]
    NameTooLong {
        /// Maximum accepted length in bytes.
        max: usize,
    },
}

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;
