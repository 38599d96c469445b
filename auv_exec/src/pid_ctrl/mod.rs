//! # PID controller module
//!
//! Converts the error between the vehicle's pose and the active target into
//! the force/torque command used by the next dynamics step.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod cmd;
mod params;
mod regulator;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use cmd::*;
pub use params::*;
pub use regulator::*;
pub use state::*;

use util::params::LoadError;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during PidCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum PidCtrlError {
    #[error("Could not load parameters: {0}")]
    ParamLoadError(LoadError)
}
