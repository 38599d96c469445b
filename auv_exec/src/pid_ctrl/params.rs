//! PID controller parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// Internal
use super::Limits;
use crate::plane::PlaneRestriction;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Default cap on the magnitude of each regulator's integral accumulator.
pub const DEFAULT_INTEGRAL_LIMIT: f64 = 1000.0;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the PID controller.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Params {

    /// If false the controller stops updating the command.
    pub enabled: bool,

    /// The plane the vehicle starts restricted to.
    pub plane_restriction: PlaneRestriction,

    /// Gains of the X, Y and Z position regulators
    pub pos_gains: [Gains; 3],

    /// Gains of the X, Y and Z rotation regulators
    pub rot_gains: [Gains; 3],

    /// Symmetric limits on the command
    pub limits: Limits,

    /// Cap on the magnitude of each regulator's integral accumulator. `None`
    /// leaves the accumulator unbounded.
    pub integral_limit: Option<f64>
}

/// Gains of a single PID regulator.
#[derive(Deserialize, Serialize, Debug, Copy, Clone, PartialEq)]
pub struct Gains {
    /// Proportional gain
    pub k_p: f64,

    /// Integral gain
    pub k_i: f64,

    /// Derivative gain
    pub k_d: f64
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            enabled: true,
            plane_restriction: PlaneRestriction::None,
            pos_gains: [Gains::default(); 3],
            rot_gains: [Gains::default(); 3],
            limits: Limits::default(),
            integral_limit: Some(DEFAULT_INTEGRAL_LIMIT)
        }
    }
}

impl Default for Gains {
    /// Pure proportional control with unit gain.
    fn default() -> Self {
        Self {
            k_p: 1.0,
            k_i: 0.0,
            k_d: 0.0
        }
    }
}

impl Gains {
    pub fn new(k_p: f64, k_i: f64, k_d: f64) -> Self {
        Self { k_p, k_i, k_d }
    }
}
