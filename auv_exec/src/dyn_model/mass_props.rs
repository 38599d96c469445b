//! # Mass properties
//!
//! Effective mass and inertia of the body, including the added mass of the
//! fluid it displaces.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::warn;
use nalgebra::Vector3;
use serde::Serialize;

// Internal
use super::{AddedMass, Params};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Allowed mismatch between the summed segment lengths and the total length.
const SEGMENT_LENGTH_TOLERANCE_M: f64 = 1e-6;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Mass properties derived from the body parameters.
#[derive(Debug, Copy, Clone, Serialize)]
pub struct MassProps {
    /// Effective mass along each translational axis
    pub mass_eff: Vector3<f64>,

    /// Rigid-body moment of inertia, `m*r^2/2 + m*L^2/12`
    pub inertia: f64,

    /// Effective inertia about each rotational axis
    pub inertia_eff: Vector3<f64>,

    /// The coefficients the properties were built from, the coupling terms
    /// are used directly by the equations of motion.
    pub lambdas: AddedMass
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl MassProps {

    /// Derive the mass properties from the parameters.
    pub fn from_params(params: &Params) -> Self {
        let seg_sum: f64 = params.segment_lengths_m.iter().sum();
        if (seg_sum - params.length_m).abs() > SEGMENT_LENGTH_TOLERANCE_M {
            warn!(
                "Body segment lengths sum to {} m but the body length is {} m",
                seg_sum, params.length_m
            );
        }

        let m = params.mass_kg;
        let l = &params.added_mass;

        let inertia = m * params.radius_m.powi(2) / 2.0
            + m * params.length_m.powi(2) / 12.0;

        Self {
            mass_eff: Vector3::new(
                (1.0 + l.l11) * m,
                (1.0 + l.l22) * m,
                (1.0 + l.l33) * m
            ),
            inertia,
            inertia_eff: Vector3::new(
                (1.0 + l.l44) * inertia,
                (1.0 + l.l55) * inertia,
                (1.0 + l.l66) * inertia
            ),
            lambdas: *l
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_reference_body() {
        let props = MassProps::from_params(&Params::default());

        assert!((props.mass_eff[0] - 6736.0).abs() < 1e-9);
        assert!((props.mass_eff[1] - 6736.0).abs() < 1e-9);
        assert!((props.mass_eff[2] - 6736.0).abs() < 1e-9);

        assert!((props.inertia - 275.0).abs() < 1e-9);
        assert!((props.inertia_eff[0] - 275.0).abs() < 1e-9);
        assert!((props.inertia_eff[1] - 1978.625).abs() < 1e-9);
        assert!((props.inertia_eff[2] - 1978.625).abs() < 1e-9);
    }

    #[test]
    fn test_no_added_mass() {
        let params = Params {
            added_mass: AddedMass::zero(),
            ..Params::default()
        };
        let props = MassProps::from_params(&params);

        assert_eq!(props.mass_eff, Vector3::repeat(1000.0));
        assert_eq!(props.inertia_eff, Vector3::repeat(props.inertia));
    }
}
