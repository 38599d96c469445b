//! Waypoint navigation module state

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info};
use nalgebra::Vector3;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::Serialize;

// Internal
use super::{NavCtrlError, Params};
use crate::plane::PlaneRestriction;
use util::{module::State, params};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Waypoint navigation module state
pub struct NavCtrl {
    params: Params,

    /// Executing mode
    mode: NavCtrlMode,

    restriction: PlaneRestriction,

    waypoints: Vec<Waypoint>,

    /// Index of the active target within `waypoints`
    cursor: usize,

    /// The target reach was last signalled for, cleared when the vehicle
    /// leaves the reach radius.
    reached_target: Option<ReachedTarget>,

    rng: StdRng,

    /// Number of times the waypoint list has been rebuilt
    num_restarts: u64,

    report: StatusReport
}

/// A single waypoint.
#[derive(Debug, Copy, Clone, Serialize, PartialEq)]
pub struct Waypoint {
    /// Position the waypoint was created at, before any plane projection
    pub original_m: Vector3<f64>,

    /// Position after projection onto the current restriction plane
    pub position_m: Vector3<f64>
}

/// Identity of a target that has been reached.
#[derive(Debug, Copy, Clone, PartialEq)]
struct ReachedTarget {
    /// Value of `num_restarts` when the target was reached
    list: u64,

    cursor: usize,

    position_m: Vector3<f64>
}

/// A correction to the vehicle's pose which must be applied when the
/// waypoints are projected onto a plane.
#[derive(Debug, Copy, Clone, Serialize, PartialEq)]
pub struct PoseCorrection {
    pub position_m: Vector3<f64>,
    pub rotation_deg: Vector3<f64>
}

/// Input data to navigation.
#[derive(Debug, Copy, Clone, Default)]
pub struct InputData {
    /// Current vehicle position
    pub position_m: Vector3<f64>
}

/// Output of navigation processing.
#[derive(Debug, Copy, Clone, Default, Serialize)]
pub struct OutputData {
    /// True if the target was reached on this cycle
    pub target_reached: bool,

    /// True if reaching the target exhausted the list and it was rebuilt
    pub restarted: bool,

    /// Correction to apply to the vehicle following a rebuild
    pub pose_correction: Option<PoseCorrection>
}

/// Status report for navigation processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// Distance to the active target at the start of the cycle
    pub distance_m: f64,

    /// Index of the active target at the end of the cycle
    pub target_index: usize,

    /// Number of waypoints in the list
    pub num_waypoints: usize
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The possible modes of execution of NavCtrl. Each mode is handled by a
/// `mode_xyz` function.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum NavCtrlMode {
    /// No waypoints have been built yet
    Idle,

    /// Driving toward the active target
    Advancing
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for NavCtrl {
    type InitData = &'static str;
    type InitError = NavCtrlError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = NavCtrlError;

    /// Initialise the NavCtrl module.
    ///
    /// Expected init data is the path to the parameter file. The module is
    /// left idle until `start` is called.
    fn init(&mut self, init_data: Self::InitData) -> Result<(), Self::InitError> {
        let params: Params = params::load(init_data)
            .map_err(NavCtrlError::ParamLoadError)?;

        *self = Self::new(params);

        Ok(())
    }

    /// Check whether the vehicle has reached the active target, advancing to
    /// the next one if it has.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        self.report = StatusReport::default();

        let output = match self.mode {
            NavCtrlMode::Idle => self.mode_idle(),
            NavCtrlMode::Advancing => self.mode_advancing(&input_data.position_m)
        }?;

        self.report.target_index = self.cursor;
        self.report.num_waypoints = self.waypoints.len();

        Ok((output, self.report))
    }
}

impl NavCtrl {

    /// Create a new, idle navigator.
    pub fn new(params: Params) -> Self {
        let rng = match params.seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy()
        };

        Self {
            params,
            mode: NavCtrlMode::Idle,
            restriction: PlaneRestriction::None,
            waypoints: vec![],
            cursor: 0,
            reached_target: None,
            rng,
            num_restarts: 0,
            report: StatusReport::default()
        }
    }

    /// Build the waypoint list and select the first target.
    ///
    /// Equivalent to `restart`, provided as the entry point out of `Idle`.
    pub fn start(
        &mut self,
        vehicle_pos_m: &Vector3<f64>,
        restriction: PlaneRestriction
    ) -> Result<PoseCorrection, NavCtrlError> {
        self.restriction = restriction;
        self.restart(vehicle_pos_m)
    }

    /// Discard the current waypoints, build a new list, project it onto the
    /// current restriction plane and select its first target.
    ///
    /// The returned correction moves the vehicle onto the plane and must be
    /// applied by the caller.
    pub fn restart(
        &mut self,
        vehicle_pos_m: &Vector3<f64>
    ) -> Result<PoseCorrection, NavCtrlError> {
        self.waypoints.clear();

        let points = if self.params.generate_points {
            self.generate_points(vehicle_pos_m)
        }
        else {
            self.params.default_points_m.clone()
        };

        self.waypoints = points
            .into_iter()
            .map(|p| Waypoint { original_m: p, position_m: p })
            .collect();

        let correction = self.apply_restriction(vehicle_pos_m);

        self.cursor = 0;
        self.num_restarts += 1;

        if self.waypoints.is_empty() {
            self.mode = NavCtrlMode::Idle;
            return Err(NavCtrlError::NoWaypoints)
        }

        self.mode = NavCtrlMode::Advancing;

        info!(
            "NavCtrl built {} waypoints ({}), first target {:?}",
            self.waypoints.len(),
            if self.params.generate_points { "generated" } else { "fixed" },
            self.waypoints[0].position_m
        );

        Ok(correction)
    }

    /// Re-project every waypoint onto a new restriction plane, without
    /// rebuilding the list.
    pub fn set_plane_restriction(
        &mut self,
        restriction: PlaneRestriction,
        vehicle_pos_m: &Vector3<f64>
    ) -> PoseCorrection {
        self.restriction = restriction;
        self.apply_restriction(vehicle_pos_m)
    }

    /// The position of the active target, or `None` if idle.
    pub fn active_target(&self) -> Option<Vector3<f64>> {
        match self.mode {
            NavCtrlMode::Idle => None,
            NavCtrlMode::Advancing => self.waypoints.get(self.cursor).map(|w| w.position_m)
        }
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn mode(&self) -> NavCtrlMode {
        self.mode
    }

    pub fn num_restarts(&self) -> u64 {
        self.num_restarts
    }

    pub fn reach_distance(&self) -> f64 {
        self.params.reach_distance_m
    }

    pub fn set_reach_distance(&mut self, reach_distance_m: f64) {
        debug!("NavCtrl reach distance set to {} m", reach_distance_m);
        self.params.reach_distance_m = reach_distance_m;
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    // ---- MODES ----

    fn mode_idle(&mut self) -> Result<OutputData, NavCtrlError> {
        Err(NavCtrlError::NotStarted)
    }

    fn mode_advancing(
        &mut self,
        vehicle_pos_m: &Vector3<f64>
    ) -> Result<OutputData, NavCtrlError> {
        let mut output = OutputData::default();

        let target = match self.active_target() {
            Some(t) => t,
            None => return Err(NavCtrlError::NoWaypoints)
        };

        let distance = (vehicle_pos_m - target).norm();
        self.report.distance_m = distance;

        let within = distance < self.params.reach_distance_m;
        if !within {
            self.reached_target = None;
            return Ok(output)
        }

        if self.is_latched(&target) {
            return Ok(output)
        }

        let reached = ReachedTarget {
            list: self.num_restarts,
            cursor: self.cursor,
            position_m: target
        };

        info!("NavCtrl reached target {} at {:?}", self.cursor, target);
        output.target_reached = true;

        if self.cursor + 1 >= self.waypoints.len() {
            info!("NavCtrl waypoint list exhausted, restarting");
            output.pose_correction = Some(self.restart(vehicle_pos_m)?);
            output.restarted = true;
        }
        else {
            self.cursor += 1;
            debug!(
                "NavCtrl target {} selected at {:?}",
                self.cursor, self.waypoints[self.cursor].position_m
            );
        }

        // Latched after the restart, which clears it
        self.reached_target = Some(reached);

        Ok(output)
    }

    // ---- HELPERS ----

    /// True if reach has already been signalled for the active target.
    ///
    /// Within one list targets are told apart by their index, so repeated
    /// positions are each reported. A rebuilt list has no relation to the old
    /// one and only a target at the very same position counts as already
    /// reached.
    fn is_latched(&self, target_m: &Vector3<f64>) -> bool {
        match self.reached_target {
            Some(r) if r.list == self.num_restarts => r.cursor == self.cursor,
            Some(r) => r.position_m == *target_m,
            None => false
        }
    }

    fn generate_points(&mut self, centre_m: &Vector3<f64>) -> Vec<Vector3<f64>> {
        let count = self.params.clamped_points_count();
        let side = self.params.generation_cube_side_m;
        let half_side = side / 2.0;

        let mut points = Vec::with_capacity(count);

        for _ in 0..count {
            let mut offset = Vector3::zeros();

            // An empty range would panic, a degenerate cube collapses onto
            // the centre instead
            if side > 0.0 {
                for i in 0..3 {
                    offset[i] = self.rng.gen_range(0.0..side) - half_side;
                }
            }

            points.push(centre_m + offset);
        }

        points
    }

    fn apply_restriction(&mut self, vehicle_pos_m: &Vector3<f64>) -> PoseCorrection {
        for w in self.waypoints.iter_mut() {
            w.position_m = self.restriction.project(&w.original_m);
        }

        // The active target may have moved
        self.reached_target = None;

        debug!(
            "NavCtrl waypoints projected onto {:?}",
            self.restriction
        );

        PoseCorrection {
            position_m: self.restriction.project(vehicle_pos_m),
            rotation_deg: Vector3::zeros()
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn fixed(points: Vec<Vector3<f64>>) -> Params {
        Params {
            default_points_m: points,
            ..Params::default()
        }
    }

    fn generated(count: usize, seed: u64) -> Params {
        Params {
            generate_points: true,
            generated_points_count: count,
            seed: Some(seed),
            ..Params::default()
        }
    }

    /// Put the vehicle on the active target and process
    fn reach(nav: &mut NavCtrl) -> OutputData {
        let pos = nav.active_target().unwrap();
        nav.proc(&InputData { position_m: pos }).unwrap().0
    }

    #[test]
    fn test_idle() {
        let mut nav = NavCtrl::new(Params::default());
        assert_eq!(nav.active_target(), None);
        assert!(matches!(
            nav.proc(&InputData::default()),
            Err(NavCtrlError::NotStarted)
        ));
    }

    #[test]
    fn test_empty_list() {
        let mut nav = NavCtrl::new(fixed(vec![]));
        assert!(matches!(
            nav.start(&Vector3::zeros(), PlaneRestriction::None),
            Err(NavCtrlError::NoWaypoints)
        ));
        assert_eq!(nav.mode(), NavCtrlMode::Idle);
    }

    #[test]
    fn test_advance_and_wrap_fixed() {
        let points = vec![
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(2.0, 0.0, 0.0),
            Vector3::new(3.0, 0.0, 0.0)
        ];
        let mut nav = NavCtrl::new(fixed(points.clone()));
        nav.start(&Vector3::zeros(), PlaneRestriction::None).unwrap();

        assert_eq!(nav.active_target(), Some(points[0]));

        // Far away nothing happens
        let (out, rpt) = nav.proc(&InputData::default()).unwrap();
        assert!(!out.target_reached);
        assert_eq!(rpt.distance_m, 1.0);

        let out = reach(&mut nav);
        assert!(out.target_reached && !out.restarted);
        assert_eq!(nav.active_target(), Some(points[1]));

        reach(&mut nav);
        assert_eq!(nav.active_target(), Some(points[2]));

        // Exhausting the list restarts at the first point
        let out = reach(&mut nav);
        assert!(out.target_reached && out.restarted);
        assert!(out.pose_correction.is_some());
        assert_eq!(nav.cursor(), 0);
        assert_eq!(nav.active_target(), Some(points[0]));
        assert_eq!(nav.num_restarts(), 2);
    }

    #[test]
    fn test_wrap_regenerates() {
        let mut nav = NavCtrl::new(generated(3, 42));
        nav.start(&Vector3::zeros(), PlaneRestriction::None).unwrap();
        assert_eq!(nav.waypoints().len(), 3);

        let first_list: Vec<_> = nav.waypoints().to_vec();

        reach(&mut nav);
        reach(&mut nav);
        let last_target = nav.active_target().unwrap();
        let out = reach(&mut nav);

        assert!(out.restarted);
        assert_eq!(nav.waypoints().len(), 3);
        assert_ne!(nav.waypoints(), &first_list[..]);
        assert_ne!(nav.active_target().unwrap(), last_target);
    }

    #[test]
    fn test_generated_in_cube() {
        let centre = Vector3::new(100.0, -50.0, 7.0);
        let mut nav = NavCtrl::new(generated(200, 7));
        nav.start(&centre, PlaneRestriction::None).unwrap();

        assert_eq!(nav.waypoints().len(), 200);
        for w in nav.waypoints() {
            let d = w.position_m - centre;
            assert!(d.iter().all(|&c| c >= -50.0 && c <= 50.0), "{:?}", d);
        }

        // Same seed, same points
        let mut nav2 = NavCtrl::new(generated(200, 7));
        nav2.start(&centre, PlaneRestriction::None).unwrap();
        assert_eq!(nav.waypoints(), nav2.waypoints());
    }

    #[test]
    fn test_degenerate_cube() {
        let mut params = generated(4, 1);
        params.generation_cube_side_m = 0.0;
        let mut nav = NavCtrl::new(params);
        nav.start(&Vector3::new(1.0, 2.0, 3.0), PlaneRestriction::None).unwrap();

        assert!(nav.waypoints().iter().all(|w| w.position_m == Vector3::new(1.0, 2.0, 3.0)));
    }

    #[test]
    fn test_restriction_projects_from_original() {
        let points = vec![Vector3::new(1.0, 2.0, 3.0), Vector3::new(4.0, 5.0, 6.0)];
        let mut nav = NavCtrl::new(fixed(points.clone()));
        let corr = nav.start(&Vector3::new(7.0, 8.0, 9.0), PlaneRestriction::XY).unwrap();

        assert_eq!(corr.position_m, Vector3::new(7.0, 8.0, 0.0));
        assert_eq!(nav.active_target(), Some(Vector3::new(1.0, 2.0, 0.0)));

        let corr = nav.set_plane_restriction(PlaneRestriction::YZ, &Vector3::new(7.0, 8.0, 0.0));
        assert_eq!(corr.position_m, Vector3::new(0.0, 8.0, 0.0));
        assert_eq!(corr.rotation_deg, Vector3::zeros());
        assert_eq!(nav.active_target(), Some(Vector3::new(0.0, 2.0, 3.0)));

        // Lifting the restriction restores the originals
        nav.set_plane_restriction(PlaneRestriction::None, &Vector3::zeros());
        assert_eq!(nav.waypoints()[1].position_m, points[1]);
        assert_eq!(nav.cursor(), 0);
    }

    #[test]
    fn test_reach_is_edge_triggered() {
        // A single waypoint rebuilds onto the same position, which must not
        // be reported again until the vehicle has left the radius.
        let target = Vector3::new(5.0, 0.0, 0.0);
        let mut nav = NavCtrl::new(fixed(vec![target]));
        nav.start(&Vector3::zeros(), PlaneRestriction::None).unwrap();

        let inside = InputData { position_m: Vector3::new(5.1, 0.0, 0.0) };
        let outside = InputData { position_m: Vector3::new(6.0, 0.0, 0.0) };

        let mut count = 0;
        for _ in 0..10 {
            if nav.proc(&inside).unwrap().0.target_reached {
                count += 1;
            }
        }
        assert_eq!(count, 1);

        nav.proc(&outside).unwrap();
        assert!(nav.proc(&inside).unwrap().0.target_reached);
    }

    #[test]
    fn test_repeated_waypoint_is_reached_again() {
        let p = Vector3::new(0.2, 0.0, 0.0);
        let q = Vector3::new(30.0, 0.0, 0.0);
        let mut nav = NavCtrl::new(fixed(vec![p, p, q]));
        nav.start(&Vector3::zeros(), PlaneRestriction::XY).unwrap();

        // Sitting on p reaches both copies of it in turn, then stops at q
        let on_p = InputData { position_m: p };
        assert!(nav.proc(&on_p).unwrap().0.target_reached);
        assert_eq!(nav.cursor(), 1);
        assert!(nav.proc(&on_p).unwrap().0.target_reached);
        assert_eq!(nav.cursor(), 2);
        assert_eq!(nav.active_target(), Some(q));

        for _ in 0..10 {
            assert!(!nav.proc(&on_p).unwrap().0.target_reached);
        }
        assert_eq!(nav.cursor(), 2);
    }
}
