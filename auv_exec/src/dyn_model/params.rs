//! Dynamics model parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Default number of past states kept in the history.
pub const DEFAULT_HISTORY_CAPACITY: usize = 1000;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the dynamics model.
///
/// Any field missing from the parameter file takes the value of the
/// reference body given by `Params::default()`.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Params {

    /// Body mass
    pub mass_kg: f64,

    /// Body radius
    pub radius_m: f64,

    /// Total body length
    pub length_m: f64,

    /// Lengths of the nose, midbody and tail segments. These should sum to
    /// `length_m`.
    pub segment_lengths_m: [f64; 3],

    /// Added-mass coefficients
    pub added_mass: AddedMass,

    /// Number of past states kept in the history. Zero disables the history.
    pub history_capacity: usize
}

/// The added-mass coefficient table.
///
/// Diagonal terms scale the effective mass or inertia of a single axis, while
/// `l26` and `l35` couple translation with rotation.
#[derive(Deserialize, Serialize, Debug, Copy, Clone, PartialEq)]
#[serde(default)]
pub struct AddedMass {
    pub l11: f64,
    pub l22: f64,
    pub l26: f64,
    pub l33: f64,
    pub l35: f64,
    pub l44: f64,
    pub l55: f64,
    pub l66: f64
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            mass_kg: 1000.0,
            radius_m: 0.1,
            length_m: 1.8,
            segment_lengths_m: [0.135, 1.315, 0.35],
            added_mass: AddedMass::default(),
            history_capacity: DEFAULT_HISTORY_CAPACITY
        }
    }
}

impl Default for AddedMass {
    fn default() -> Self {
        Self {
            l11: 5.736,
            l22: 5.736,
            l26: -5.163,
            l33: 5.736,
            l35: 5.163,
            l44: 0.0,
            l55: 6.195,
            l66: 6.195
        }
    }
}

impl AddedMass {
    /// A table with every coefficient zero, i.e. a body with no added mass.
    pub fn zero() -> Self {
        Self {
            l11: 0.0,
            l22: 0.0,
            l26: 0.0,
            l33: 0.0,
            l35: 0.0,
            l44: 0.0,
            l55: 0.0,
            l66: 0.0
        }
    }
}
