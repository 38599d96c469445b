//! # Waypoint navigation module
//!
//! Holds the ordered list of waypoints the vehicle is driven through and
//! selects the active target. When the vehicle comes within the reach
//! distance of the target the next waypoint is selected, and once the list is
//! exhausted it is rebuilt, either from the fixed list or by sampling a new
//! set of points around the vehicle.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use params::*;
pub use state::*;

use util::params::LoadError;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during NavCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum NavCtrlError {
    #[error("Could not load parameters: {0}")]
    ParamLoadError(LoadError),

    /// Processing was requested before the waypoints were built.
    #[error("NavCtrl has not been started")]
    NotStarted,

    /// The waypoint list was rebuilt empty, there is no target to select.
    #[error("The waypoint list is empty")]
    NoWaypoints
}
