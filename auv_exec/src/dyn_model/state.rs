//! Implementations for the DynModel state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, trace, warn};
use nalgebra::{UnitQuaternion, Vector3};
use serde::Serialize;

// Internal
use super::{DynModelError, History, MassProps, Params};
use crate::attitude::{euler_deg_from_quat, quat_from_euler_deg};
use util::{module::State, params};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Dynamics model module state
pub struct DynModel {
    params: Params,

    mass_props: MassProps,

    /// The most recently committed state
    state: KinematicState,

    history: History<KinematicState>,

    report: StatusReport
}

/// The kinematic state of the vehicle at the end of a step.
#[derive(Debug, Copy, Clone, Default, Serialize, PartialEq)]
pub struct KinematicState {
    /// Linear velocity
    pub lin_vel: Vector3<f64>,

    /// Angular velocity
    pub ang_vel: Vector3<f64>,

    /// Linear acceleration
    pub lin_acc: Vector3<f64>,

    /// Angular acceleration
    pub ang_acc: Vector3<f64>,

    /// Position in the world frame
    pub position_m: Vector3<f64>,

    /// Orientation as Euler angles, each in `[0, 360)`
    pub rotation_deg: Vector3<f64>,

    /// Orientation as a quaternion, kept alongside the Euler angles so that
    /// successive rotations don't accumulate wrapping error.
    pub attitude_q: UnitQuaternion<f64>
}

/// Input data to the dynamics model.
#[derive(Debug, Copy, Clone, Default)]
pub struct InputData {
    /// Commanded torque
    pub torque: Vector3<f64>,

    /// Commanded force
    pub force: Vector3<f64>,

    /// Length of the step. Must be strictly positive.
    pub dt_s: f64
}

/// Status report for dynamics model processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// Number of steps taken since initialisation
    pub num_steps: u64,

    /// True if the new state contains a non-finite value
    pub non_finite: bool
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for DynModel {
    type InitData = &'static str;
    type InitError = DynModelError;

    type InputData = InputData;
    type OutputData = KinematicState;
    type StatusReport = StatusReport;
    type ProcError = DynModelError;

    /// Initialise the DynModel module.
    ///
    /// Expected init data is the path to the parameter file. Any state held
    /// by the model is discarded.
    fn init(&mut self, init_data: Self::InitData) -> Result<(), Self::InitError> {
        let params: Params = params::load(init_data)
            .map_err(DynModelError::ParamLoadError)?;

        *self = Self::new(params);

        Ok(())
    }

    /// Advance the model by one step.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        let new_state = step(
            &self.state,
            &self.mass_props,
            &input_data.torque,
            &input_data.force,
            input_data.dt_s
        );

        let non_finite = !new_state.is_finite();
        if non_finite && !self.report.non_finite {
            warn!("DynModel state has become non-finite: {:?}", new_state);
        }

        trace!(
            "DynModel step:\n    pos: {:?}\n    rot: {:?}\n    lin_acc: {:?}\n    ang_acc: {:?}",
            new_state.position_m, new_state.rotation_deg,
            new_state.lin_acc, new_state.ang_acc
        );

        // Commit
        self.state = new_state;
        self.history.push(new_state);
        self.report = StatusReport {
            num_steps: self.report.num_steps + 1,
            non_finite
        };

        Ok((self.state, self.report))
    }
}

impl DynModel {

    /// Create a new model at rest at the origin.
    pub fn new(params: Params) -> Self {
        let mass_props = MassProps::from_params(&params);
        let history = History::with_capacity(params.history_capacity);

        debug!(
            "DynModel mass properties:\n    mass: {:?}\n    inertia: {:?}",
            mass_props.mass_eff, mass_props.inertia_eff
        );

        Self {
            params,
            mass_props,
            state: KinematicState::default(),
            history,
            report: StatusReport::default()
        }
    }

    /// The most recently committed state.
    pub fn state(&self) -> &KinematicState {
        &self.state
    }

    pub fn history(&self) -> &History<KinematicState> {
        &self.history
    }

    pub fn mass_props(&self) -> &MassProps {
        &self.mass_props
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Move the vehicle to a new pose without touching its velocities or
    /// accelerations.
    ///
    /// The reseated state is not added to the history as it isn't the result
    /// of a step.
    pub fn reseat_pose(&mut self, position_m: Vector3<f64>, rotation_deg: Vector3<f64>) {
        let q = quat_from_euler_deg(&rotation_deg);
        self.state.position_m = position_m;
        self.state.attitude_q = q;
        self.state.rotation_deg = euler_deg_from_quat(&q);

        debug!(
            "DynModel pose reseated to {:?}, {:?}",
            self.state.position_m, self.state.rotation_deg
        );
    }
}

impl KinematicState {

    /// True if every component of the state is finite.
    pub fn is_finite(&self) -> bool {
        self.lin_vel.iter()
            .chain(self.ang_vel.iter())
            .chain(self.lin_acc.iter())
            .chain(self.ang_acc.iter())
            .chain(self.position_m.iter())
            .chain(self.rotation_deg.iter())
            .all(|v| v.is_finite())
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Compute the state following `prev` under the given torque and force.
///
/// Accelerations are found from the previous step's velocities. Where one
/// axis is coupled to the acceleration of another, the other axis's value
/// from the previous step is used (divided by `dt`), so every coupled term
/// lags by exactly one step. Position and orientation are likewise moved by
/// the previous step's accelerations, not the new ones.
///
/// `dt_s` must be strictly positive. Non-finite inputs propagate into the
/// output rather than causing an error.
pub fn step(
    prev: &KinematicState,
    props: &MassProps,
    torque: &Vector3<f64>,
    force: &Vector3<f64>,
    dt_s: f64
) -> KinematicState {
    debug_assert!(dt_s > 0.0, "dynamics step requires a positive dt, got {}", dt_s);

    let m = &props.mass_eff;
    let j = &props.inertia_eff;
    let l26 = props.lambdas.l26;
    let l35 = props.lambdas.l35;

    let v = &prev.lin_vel;
    let w = &prev.ang_vel;

    // ---- TRANSLATIONAL ----

    let acc_x = (
        force[0]
        - m[2] * w[1] * v[2]
        + m[1] * w[0] * v[1]
        - l35 * w[1].powi(2)
        + l26 * w[2].powi(2)
    ) / m[0];

    let acc_y = (
        force[1]
        - m[0] * w[2] * v[0]
        + m[2] * w[0] * v[2]
        + l35 * w[0] * w[1]
        - l26 * prev.ang_acc[2] / dt_s
    ) / m[1];

    let acc_z = (
        force[2]
        - m[1] * w[0] * v[1]
        + m[0] * w[1] * v[0]
        - l26 * w[0] * w[2]
        - l35 * prev.ang_acc[1] / dt_s
    ) / m[2];

    // ---- ROTATIONAL ----

    let ang_x = (
        torque[0]
        - (l26 + l35) * (w[1] * v[1] - w[2] * v[2])
    ) / j[0];

    let ang_y = (
        torque[1]
        - l35 * prev.lin_acc[2] / dt_s
        - w[0] * w[1] * (j[0] - j[2])
        - v[0] * v[2] * (m[0] - m[2])
        + l26 * w[0] * v[1]
        + l35 * w[1] * v[0]
    ) / j[1];

    let ang_z = (
        torque[2]
        - l26 * prev.lin_acc[1] / dt_s
        - w[0] * w[1] * (j[1] - j[0])
        - v[0] * v[1] * (m[1] - m[0])
        - l35 * w[0] * v[2]
        - l26 * w[2] * v[0]
    ) / j[2];

    let lin_acc = Vector3::new(acc_x, acc_y, acc_z);
    let ang_acc = Vector3::new(ang_x, ang_y, ang_z);

    // ---- POSE ----

    let position_m = prev.position_m + prev.lin_acc;
    let attitude_q = prev.attitude_q * quat_from_euler_deg(&prev.ang_acc);

    KinematicState {
        lin_vel: lin_acc * dt_s,
        ang_vel: ang_acc * dt_s,
        lin_acc,
        ang_acc,
        position_m,
        rotation_deg: euler_deg_from_quat(&attitude_q),
        attitude_q
    }
}
