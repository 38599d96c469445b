//! Waypoint navigation parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector3;
use serde::Deserialize;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Bounds on the number of generated waypoints.
pub const MIN_GENERATED_POINTS: usize = 1;
pub const MAX_GENERATED_POINTS: usize = 1000;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for waypoint navigation
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Params {

    /// Distance from a target under which it is considered reached.
    pub reach_distance_m: f64,

    /// If true waypoints are sampled at random in a cube around the vehicle,
    /// otherwise `default_points_m` is used.
    pub generate_points: bool,

    /// Number of waypoints to generate. Clamped into
    /// `[MIN_GENERATED_POINTS, MAX_GENERATED_POINTS]` at use.
    pub generated_points_count: usize,

    /// Side length of the cube waypoints are generated in.
    pub generation_cube_side_m: f64,

    /// The fixed waypoint list.
    pub default_points_m: Vec<Vector3<f64>>,

    /// Seed for waypoint generation. If not set the generator is seeded from
    /// the OS.
    pub seed: Option<u64>
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            reach_distance_m: 0.5,
            generate_points: false,
            generated_points_count: 15,
            generation_cube_side_m: 100.0,
            default_points_m: vec![
                Vector3::new(10.0, 0.0, 0.0),
                Vector3::new(10.0, 10.0, 0.0),
                Vector3::new(0.0, 10.0, 10.0),
                Vector3::new(0.0, 0.0, 10.0)
            ],
            seed: None
        }
    }
}

impl Params {
    /// The number of waypoints to generate, clamped into range.
    pub fn clamped_points_count(&self) -> usize {
        self.generated_points_count
            .max(MIN_GENERATED_POINTS)
            .min(MAX_GENERATED_POINTS)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_load() {
        let p: Params = util::params::from_str(
            "reach_distance_m = 2.0\n\
             generated_points_count = 5000\n\
             default_points_m = [[1.0, 2.0, 3.0]]\n"
        ).unwrap();

        assert_eq!(p.reach_distance_m, 2.0);
        assert_eq!(p.clamped_points_count(), MAX_GENERATED_POINTS);
        assert_eq!(p.default_points_m, vec![Vector3::new(1.0, 2.0, 3.0)]);
        assert_eq!(p.seed, None);
    }

    #[test]
    fn test_count_clamp() {
        let mut p = Params::default();
        p.generated_points_count = 0;
        assert_eq!(p.clamped_points_count(), 1);
        p.generated_points_count = 15;
        assert_eq!(p.clamped_points_count(), 15);
    }
}
