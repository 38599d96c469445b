//! # Force/torque command
//!
//! The command is written by the controller and read by the dynamics model
//! on the following step. Every component is held within a symmetric limit.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

// Internal
use util::maths::clamp_sym;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Default limit on every torque and force component.
pub const DEFAULT_CMD_LIMIT: f64 = 10.0;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Commanded torque and force.
#[derive(Debug, Copy, Clone, Default, Serialize, PartialEq)]
pub struct CommandVector {
    pub torque: Vector3<f64>,
    pub force: Vector3<f64>
}

/// Symmetric per-axis limits on a `CommandVector`.
///
/// Limits are magnitudes, the sign of a configured limit is ignored.
#[derive(Deserialize, Serialize, Debug, Copy, Clone, PartialEq)]
#[serde(default)]
pub struct Limits {
    pub torque: Vector3<f64>,
    pub force: Vector3<f64>
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Limits {
    fn default() -> Self {
        Self {
            torque: Vector3::repeat(DEFAULT_CMD_LIMIT),
            force: Vector3::repeat(DEFAULT_CMD_LIMIT)
        }
    }
}

impl CommandVector {

    /// Set one torque component, clamping it to the limit.
    ///
    /// Returns true if the value had to be clamped.
    pub fn set_torque(&mut self, axis: usize, value: f64, limits: &Limits) -> bool {
        self.torque[axis] = clamp_sym(value, limits.torque[axis]);
        self.torque[axis] != value && !value.is_nan()
    }

    /// Set one force component, clamping it to the limit.
    ///
    /// Returns true if the value had to be clamped.
    pub fn set_force(&mut self, axis: usize, value: f64, limits: &Limits) -> bool {
        self.force[axis] = clamp_sym(value, limits.force[axis]);
        self.force[axis] != value && !value.is_nan()
    }

    /// A copy of this command with every component clamped to the limits.
    pub fn clamped(&self, limits: &Limits) -> Self {
        let mut cmd = *self;
        for i in 0..3 {
            cmd.set_torque(i, self.torque[i], limits);
            cmd.set_force(i, self.force[i], limits);
        }
        cmd
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_setters_clamp() {
        let limits = Limits {
            torque: Vector3::new(1.0, 2.0, 3.0),
            force: Vector3::new(-5.0, 5.0, 5.0)
        };
        let mut cmd = CommandVector::default();

        assert!(cmd.set_torque(0, 4.0, &limits));
        assert!(cmd.set_torque(1, -4.0, &limits));
        assert!(!cmd.set_torque(2, 2.5, &limits));
        assert_eq!(cmd.torque, Vector3::new(1.0, -2.0, 2.5));

        // Negative limits act as magnitudes
        assert!(cmd.set_force(0, 7.0, &limits));
        assert_eq!(cmd.force[0], 5.0);
    }

    #[test]
    fn test_clamped() {
        let cmd = CommandVector {
            torque: Vector3::new(100.0, -100.0, 0.5),
            force: Vector3::new(-11.0, 9.0, 10.0)
        };
        let c = cmd.clamped(&Limits::default());

        assert_eq!(c.torque, Vector3::new(10.0, -10.0, 0.5));
        assert_eq!(c.force, Vector3::new(-10.0, 9.0, 10.0));
    }
}
