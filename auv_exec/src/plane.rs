//! # Plane restriction
//!
//! The vehicle can be restricted to move within one of the coordinate planes.
//! A restriction masks which error axes the controller acts on and projects
//! waypoints (and the vehicle itself) onto the plane.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Error returned when parsing an unknown restriction name.
#[derive(Debug, thiserror::Error)]
#[error("Unknown plane restriction \"{0}\", expected one of None, XY, XZ or YZ")]
pub struct ParsePlaneError(String);

/// The plane the vehicle is restricted to, if any.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaneRestriction {
    /// Free motion in all six degrees of freedom
    None,

    /// Motion in the XY plane, rotation about Z only
    XY,

    /// Motion in the XZ plane, rotation about Y only
    XZ,

    /// Motion in the YZ plane, rotation about X only
    YZ
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for PlaneRestriction {
    fn default() -> Self {
        PlaneRestriction::None
    }
}

impl FromStr for PlaneRestriction {
    type Err = ParsePlaneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "NONE" => Ok(PlaneRestriction::None),
            "XY" => Ok(PlaneRestriction::XY),
            "XZ" => Ok(PlaneRestriction::XZ),
            "YZ" => Ok(PlaneRestriction::YZ),
            _ => Err(ParsePlaneError(s.to_string()))
        }
    }
}

impl PlaneRestriction {

    /// Index of the axis normal to the restricted plane, or `None` if
    /// unrestricted.
    pub fn normal_axis(&self) -> Option<usize> {
        match self {
            PlaneRestriction::None => None,
            PlaneRestriction::XY => Some(2),
            PlaneRestriction::XZ => Some(1),
            PlaneRestriction::YZ => Some(0)
        }
    }

    /// Which rotational axes are controlled.
    ///
    /// In a plane only rotation about the plane's normal is meaningful.
    pub fn rot_mask(&self) -> [bool; 3] {
        match self.normal_axis() {
            None => [true; 3],
            Some(n) => {
                let mut mask = [false; 3];
                mask[n] = true;
                mask
            }
        }
    }

    /// Which translational axes are controlled, i.e. those lying in the plane.
    pub fn pos_mask(&self) -> [bool; 3] {
        let mut mask = [true; 3];
        if let Some(n) = self.normal_axis() {
            mask[n] = false;
        }
        mask
    }

    /// Project a point onto the restricted plane by zeroing its normal
    /// component.
    pub fn project(&self, point: &Vector3<f64>) -> Vector3<f64> {
        let mut p = *point;
        if let Some(n) = self.normal_axis() {
            p[n] = 0f64;
        }
        p
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_masks() {
        assert_eq!(PlaneRestriction::None.rot_mask(), [true, true, true]);
        assert_eq!(PlaneRestriction::None.pos_mask(), [true, true, true]);

        assert_eq!(PlaneRestriction::XY.rot_mask(), [false, false, true]);
        assert_eq!(PlaneRestriction::XY.pos_mask(), [true, true, false]);

        assert_eq!(PlaneRestriction::XZ.rot_mask(), [false, true, false]);
        assert_eq!(PlaneRestriction::XZ.pos_mask(), [true, false, true]);

        assert_eq!(PlaneRestriction::YZ.rot_mask(), [true, false, false]);
        assert_eq!(PlaneRestriction::YZ.pos_mask(), [false, true, true]);
    }

    #[test]
    fn test_project() {
        let p = Vector3::new(1.0, 2.0, 3.0);

        assert_eq!(PlaneRestriction::None.project(&p), p);
        assert_eq!(PlaneRestriction::XY.project(&p), Vector3::new(1.0, 2.0, 0.0));
        assert_eq!(PlaneRestriction::XZ.project(&p), Vector3::new(1.0, 0.0, 3.0));
        assert_eq!(PlaneRestriction::YZ.project(&p), Vector3::new(0.0, 2.0, 3.0));
    }

    #[test]
    fn test_from_str() {
        assert_eq!("xy".parse::<PlaneRestriction>().unwrap(), PlaneRestriction::XY);
        assert_eq!("None".parse::<PlaneRestriction>().unwrap(), PlaneRestriction::None);
        assert!("XW".parse::<PlaneRestriction>().is_err());
    }

    #[test]
    fn test_deserialise() {
        #[derive(Deserialize)]
        struct Wrapper {
            plane: PlaneRestriction
        }

        let w: Wrapper = util::params::from_str("plane = \"XZ\"").unwrap();
        assert_eq!(w.plane, PlaneRestriction::XZ);
    }
}
