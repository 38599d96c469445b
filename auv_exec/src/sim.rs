//! # Simulation driver
//!
//! Runs the dynamics model, PID controller and navigator in order once per
//! fixed tick, and fans out the events raised during the tick to any
//! subscribed observers.
//!
//! Every operation on a `Simulation` is synchronous. A host running on more
//! than one thread must serialise all calls behind a single tick boundary.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

// Internal
use crate::{
    dyn_model::{self, DynModel, DynModelError, KinematicState},
    nav_ctrl::{self, NavCtrl, NavCtrlError, PoseCorrection},
    pid_ctrl::{self, CommandVector, ControlAxis, Gains, Limits, PidCtrl, PidCtrlError},
    plane::PlaneRestriction
};
use util::module::State;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// An observer of simulation events.
///
/// Observers are notified in the order they subscribed, once per tick, after
/// all modules have been processed. Every method defaults to doing nothing.
pub trait SimObserver {
    /// The dynamics model committed a new state.
    fn on_state_updated(&mut self, _state: &KinematicState) {}

    /// The vehicle reached the target at `target_m`.
    fn on_target_reached(&mut self, _target_m: &Vector3<f64>) {}

    /// The plane restriction changed.
    fn on_plane_restriction_changed(&mut self, _restriction: PlaneRestriction) {}
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters of the simulation driver.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct SimParams {
    /// Length of one tick. Must be strictly positive.
    pub dt_s: f64,

    /// Initial vehicle position
    pub start_position_m: Vector3<f64>,

    /// Initial vehicle orientation. Only used when the vehicle starts
    /// unrestricted, a plane restriction always starts it level.
    pub start_rotation_deg: Vector3<f64>
}

/// The simulation.
pub struct Simulation {
    params: SimParams,

    dyn_model: DynModel,
    pid_ctrl: PidCtrl,
    nav_ctrl: NavCtrl,

    /// The command the next dynamics step will use
    cmd: CommandVector,

    observers: Vec<Box<dyn SimObserver>>,

    /// Events raised since the observers were last notified
    events: Vec<SimEvent>,

    num_ticks: u64
}

/// Summary of a single tick.
#[derive(Debug, Copy, Clone, Serialize)]
pub struct TickReport {
    /// Index of this tick, starting at zero
    pub tick: u64,

    /// State at the end of the tick, including any pose correction
    pub state: KinematicState,

    /// Command for the next tick
    pub cmd: CommandVector,

    /// Active target at the end of the tick
    pub target_m: Vector3<f64>,

    /// Distance to the target being pursued during this tick
    pub distance_m: f64,

    /// True if the target was reached during this tick
    pub target_reached: bool,

    /// True if the waypoint list was rebuilt during this tick
    pub restarted: bool,

    pub dyn_model: dyn_model::StatusReport,
    pub pid_ctrl: pid_ctrl::StatusReport,
    pub nav_ctrl: nav_ctrl::StatusReport
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Events raised during simulation, delivered to observers.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum SimEvent {
    StateUpdated(KinematicState),
    TargetReached(Vector3<f64>),
    PlaneRestrictionChanged(PlaneRestriction)
}

/// Possible errors that can occur during simulation.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("DynModel error: {0}")]
    DynModelError(DynModelError),

    #[error("PidCtrl error: {0}")]
    PidCtrlError(PidCtrlError),

    #[error("NavCtrl error: {0}")]
    NavCtrlError(NavCtrlError),

    /// The navigator has no target, it is idle.
    #[error("There is no active target")]
    NoTarget
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for SimParams {
    fn default() -> Self {
        Self {
            dt_s: 0.02,
            start_position_m: Vector3::zeros(),
            start_rotation_deg: Vector3::zeros()
        }
    }
}

impl Simulation {

    /// Assemble a simulation from its modules.
    ///
    /// The navigator is started from the start position using the
    /// controller's plane restriction, which may move the vehicle onto the
    /// restriction plane. The start orientation is then applied if the
    /// vehicle is unrestricted.
    pub fn new(
        params: SimParams,
        dyn_model: DynModel,
        pid_ctrl: PidCtrl,
        mut nav_ctrl: NavCtrl
    ) -> Result<Self, SimError> {
        let correction = nav_ctrl
            .start(&params.start_position_m, pid_ctrl.plane_restriction())
            .map_err(SimError::NavCtrlError)?;

        let mut sim = Self {
            params,
            dyn_model,
            pid_ctrl,
            nav_ctrl,
            cmd: CommandVector::default(),
            observers: vec![],
            events: vec![],
            num_ticks: 0
        };
        sim.apply_correction(&correction);

        if sim.pid_ctrl.plane_restriction() == PlaneRestriction::None {
            let start_rotation_deg = sim.params.start_rotation_deg;
            sim.dyn_model.reseat_pose(correction.position_m, start_rotation_deg);
        }

        info!(
            "Simulation ready, dt = {} s, restriction = {:?}",
            sim.params.dt_s,
            sim.pid_ctrl.plane_restriction()
        );

        Ok(sim)
    }

    /// Subscribe an observer to the simulation's events.
    pub fn subscribe(&mut self, observer: Box<dyn SimObserver>) {
        self.observers.push(observer);
    }

    /// Advance the simulation by one tick.
    ///
    /// 1. Step the dynamics model with the pending command.
    /// 2. Update the command from the controller, if it's enabled.
    /// 3. Check whether the target was reached, advancing or rebuilding the
    ///    waypoints and correcting the vehicle's pose if needed.
    /// 4. Notify observers of the events raised.
    pub fn tick(&mut self) -> Result<TickReport, SimError> {

        // ---- DYNAMICS ----

        let (state, dyn_rpt) = self.dyn_model
            .proc(&dyn_model::InputData {
                torque: self.cmd.torque,
                force: self.cmd.force,
                dt_s: self.params.dt_s
            })
            .map_err(SimError::DynModelError)?;
        self.events.push(SimEvent::StateUpdated(state));

        // ---- CONTROL ----

        let target_m = self.nav_ctrl.active_target().ok_or(SimError::NoTarget)?;

        let (cmd, pid_rpt) = self.pid_ctrl
            .proc(&pid_ctrl::InputData {
                position_m: state.position_m,
                rotation_deg: state.rotation_deg,
                target_m
            })
            .map_err(SimError::PidCtrlError)?;

        if let Some(c) = cmd {
            self.cmd = c;
        }

        // ---- NAVIGATION ----

        let (nav_out, nav_rpt) = self.nav_ctrl
            .proc(&nav_ctrl::InputData { position_m: state.position_m })
            .map_err(SimError::NavCtrlError)?;

        if nav_out.target_reached {
            self.events.push(SimEvent::TargetReached(target_m));
        }
        if let Some(correction) = nav_out.pose_correction {
            self.apply_correction(&correction);
        }

        // ---- NOTIFY ----

        self.dispatch_events();

        let report = TickReport {
            tick: self.num_ticks,
            state: *self.dyn_model.state(),
            cmd: self.cmd,
            target_m: self.nav_ctrl.active_target().ok_or(SimError::NoTarget)?,
            distance_m: nav_rpt.distance_m,
            target_reached: nav_out.target_reached,
            restarted: nav_out.restarted,
            dyn_model: dyn_rpt,
            pid_ctrl: pid_rpt,
            nav_ctrl: nav_rpt
        };

        self.num_ticks += 1;

        Ok(report)
    }

    /// Restrict the vehicle to a plane.
    ///
    /// If the restriction changes the pending command is zeroed, the
    /// waypoints and vehicle are projected onto the new plane and observers
    /// are notified. Setting the current restriction does nothing.
    pub fn set_plane_restriction(&mut self, restriction: PlaneRestriction) {
        if !self.pid_ctrl.set_plane_restriction(restriction) {
            return
        }

        self.cmd = CommandVector::default();

        let correction = self.nav_ctrl.set_plane_restriction(
            restriction,
            &self.dyn_model.state().position_m
        );
        self.apply_correction(&correction);

        self.events.push(SimEvent::PlaneRestrictionChanged(restriction));
        self.dispatch_events();
    }

    /// Rebuild the waypoint list and select its first target.
    ///
    /// The controller's accumulated state belongs to the old target, so the
    /// regulators are reset too.
    pub fn restart(&mut self) -> Result<(), SimError> {
        let correction = self.nav_ctrl
            .restart(&self.dyn_model.state().position_m)
            .map_err(SimError::NavCtrlError)?;
        self.apply_correction(&correction);
        self.pid_ctrl.reset_regulators();

        Ok(())
    }

    // ---- TUNING ----

    /// Set the gains of all six regulators.
    pub fn set_gains(&mut self, gains: Gains) {
        self.pid_ctrl.set_gains(gains);
    }

    /// Set the gains of one regulator.
    pub fn set_axis_gains(&mut self, axis: ControlAxis, gains: Gains) {
        self.pid_ctrl.set_axis_gains(axis, gains);
    }

    /// Set the command limits, re-clamping the pending command.
    pub fn set_limits(&mut self, limits: Limits) {
        self.pid_ctrl.set_limits(limits);
        self.cmd = self.cmd.clamped(&limits);
    }

    pub fn set_reach_distance(&mut self, reach_distance_m: f64) {
        self.nav_ctrl.set_reach_distance(reach_distance_m);
    }

    /// Enable or disable the controller. While disabled the pending command
    /// is left as it is, but the navigator still runs.
    pub fn set_controller_enabled(&mut self, enabled: bool) {
        self.pid_ctrl.set_enabled(enabled);
    }

    /// Set one component of the pending torque command, clamped to the limit.
    pub fn set_command_torque(&mut self, axis: usize, value: f64) {
        let limits = *self.pid_ctrl.limits();
        self.cmd.set_torque(axis, value, &limits);
    }

    /// Set one component of the pending force command, clamped to the limit.
    pub fn set_command_force(&mut self, axis: usize, value: f64) {
        let limits = *self.pid_ctrl.limits();
        self.cmd.set_force(axis, value, &limits);
    }

    // ---- ACCESSORS ----

    pub fn state(&self) -> &KinematicState {
        self.dyn_model.state()
    }

    /// The command the next tick will use.
    pub fn command(&self) -> &CommandVector {
        &self.cmd
    }

    pub fn target(&self) -> Option<Vector3<f64>> {
        self.nav_ctrl.active_target()
    }

    pub fn plane_restriction(&self) -> PlaneRestriction {
        self.pid_ctrl.plane_restriction()
    }

    pub fn num_ticks(&self) -> u64 {
        self.num_ticks
    }

    pub fn params(&self) -> &SimParams {
        &self.params
    }

    pub fn dyn_model(&self) -> &DynModel {
        &self.dyn_model
    }

    pub fn pid_ctrl(&self) -> &PidCtrl {
        &self.pid_ctrl
    }

    pub fn nav_ctrl(&self) -> &NavCtrl {
        &self.nav_ctrl
    }

    // ---- PRIVATE ----

    fn apply_correction(&mut self, correction: &PoseCorrection) {
        self.dyn_model.reseat_pose(correction.position_m, correction.rotation_deg);
    }

    fn dispatch_events(&mut self) {
        for event in self.events.drain(..) {
            debug!("Dispatching {:?}", event);

            for obs in self.observers.iter_mut() {
                match event {
                    SimEvent::StateUpdated(ref s) => obs.on_state_updated(s),
                    SimEvent::TargetReached(ref t) => obs.on_target_reached(t),
                    SimEvent::PlaneRestrictionChanged(r) => obs.on_plane_restriction_changed(r)
                }
            }
        }
    }
}
