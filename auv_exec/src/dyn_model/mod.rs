//! # Dynamics model module
//!
//! Advances the vehicle's kinematic state one fixed step at a time from a
//! commanded force and torque, accounting for the added mass of the
//! surrounding fluid. A bounded history of recent states is kept.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod history;
mod mass_props;
mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use history::*;
pub use mass_props::*;
pub use params::*;
pub use state::*;

use util::params::LoadError;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during DynModel operation.
#[derive(Debug, thiserror::Error)]
pub enum DynModelError {
    #[error("Could not load parameters: {0}")]
    ParamLoadError(LoadError)
}
