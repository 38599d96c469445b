//! PID controller module state

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, trace};
use nalgebra::Vector3;
use serde::Serialize;

// Internal
use super::{CommandVector, Gains, Limits, Params, PidController, PidCtrlError};
use crate::{attitude::look_at_euler_deg, plane::PlaneRestriction};
use util::{maths::wrap_deg_180, module::State, params};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// PID controller module state.
///
/// Six independent regulators drive the force (from position error) and
/// torque (from orientation error) commands.
pub struct PidCtrl {
    params: Params,

    /// If false `proc` produces no command
    enabled: bool,

    restriction: PlaneRestriction,

    limits: Limits,

    /// Position regulators, X, Y, Z
    pos_regs: [PidController; 3],

    /// Rotation regulators, X, Y, Z
    rot_regs: [PidController; 3],

    report: StatusReport
}

/// Input data to the PID controller.
#[derive(Debug, Copy, Clone, Default)]
pub struct InputData {
    /// Current vehicle position
    pub position_m: Vector3<f64>,

    /// Current vehicle orientation as Euler angles in degrees
    pub rotation_deg: Vector3<f64>,

    /// Position of the active target
    pub target_m: Vector3<f64>
}

/// Status report for PID controller processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// Position error after masking
    pub pos_error_m: Vector3<f64>,

    /// Orientation error after masking, each in `(-180, 180]`
    pub rot_error_deg: Vector3<f64>,

    /// True for each torque axis whose regulator output exceeded the limit
    pub torque_limited: [bool; 3],

    /// True for each force axis whose regulator output exceeded the limit
    pub force_limited: [bool; 3]
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// One of the six controlled axes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum ControlAxis {
    PosX,
    PosY,
    PosZ,
    RotX,
    RotY,
    RotZ
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for PidCtrl {
    type InitData = &'static str;
    type InitError = PidCtrlError;

    type InputData = InputData;
    type OutputData = Option<CommandVector>;
    type StatusReport = StatusReport;
    type ProcError = PidCtrlError;

    /// Initialise the PidCtrl module.
    ///
    /// Expected init data is the path to the parameter file. Regulators are
    /// rebuilt from the loaded gains.
    fn init(&mut self, init_data: Self::InitData) -> Result<(), Self::InitError> {
        let params: Params = params::load(init_data)
            .map_err(PidCtrlError::ParamLoadError)?;

        *self = Self::new(params);

        Ok(())
    }

    /// Compute the next command.
    ///
    /// Returns `None` if the controller is disabled, in which case the
    /// regulators are left untouched.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        self.report = StatusReport::default();

        if !self.enabled {
            return Ok((None, self.report))
        }

        // ---- ERRORS ----

        let pos_error = input_data.target_m - input_data.position_m;

        let look_deg = look_at_euler_deg(&input_data.position_m, &input_data.target_m);
        let rot_error = (look_deg - input_data.rotation_deg).map(wrap_deg_180);

        let pos_mask = self.restriction.pos_mask();
        let rot_mask = self.restriction.rot_mask();

        // ---- REGULATION ----

        // Masked axes are held at zero and their regulators aren't stepped, so
        // an integral built up before a restriction can't leak through.
        let mut cmd = CommandVector::default();

        for i in 0..3 {
            if rot_mask[i] {
                self.report.rot_error_deg[i] = rot_error[i];
                let out = self.rot_regs[i].get(rot_error[i]);
                self.report.torque_limited[i] = cmd.set_torque(i, out, &self.limits);
            }

            if pos_mask[i] {
                self.report.pos_error_m[i] = pos_error[i];
                let out = self.pos_regs[i].get(pos_error[i]);
                self.report.force_limited[i] = cmd.set_force(i, out, &self.limits);
            }
        }

        trace!(
            "PidCtrl:\n    pos_err: {:?}\n    rot_err: {:?}\n    cmd: {:?}",
            self.report.pos_error_m, self.report.rot_error_deg, cmd
        );

        Ok((Some(cmd), self.report))
    }
}

impl PidCtrl {

    /// Create a new controller from the parameters.
    pub fn new(params: Params) -> Self {
        let pos_regs = regs_from_gains(&params.pos_gains, params.integral_limit);
        let rot_regs = regs_from_gains(&params.rot_gains, params.integral_limit);

        Self {
            enabled: params.enabled,
            restriction: params.plane_restriction,
            limits: params.limits,
            pos_regs,
            rot_regs,
            report: StatusReport::default(),
            params
        }
    }

    pub fn plane_restriction(&self) -> PlaneRestriction {
        self.restriction
    }

    /// Change the plane restriction.
    ///
    /// Returns true if the restriction actually changed, in which case the
    /// caller must zero the pending command. Regulator state is kept.
    pub fn set_plane_restriction(&mut self, restriction: PlaneRestriction) -> bool {
        if restriction == self.restriction {
            return false
        }

        info!(
            "PidCtrl plane restriction changed from {:?} to {:?}",
            self.restriction, restriction
        );
        self.restriction = restriction;

        true
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if enabled != self.enabled {
            info!("PidCtrl {}", if enabled { "enabled" } else { "disabled" });
        }
        self.enabled = enabled;
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    pub fn set_limits(&mut self, limits: Limits) {
        debug!("PidCtrl limits set to {:?}", limits);
        self.limits = limits;
    }

    /// Set the same gains on all six regulators.
    pub fn set_gains(&mut self, gains: Gains) {
        debug!("PidCtrl gains on all axes set to {:?}", gains);
        for reg in self.pos_regs.iter_mut().chain(self.rot_regs.iter_mut()) {
            reg.set_gains(gains);
        }
    }

    /// Set the gains of a single regulator.
    pub fn set_axis_gains(&mut self, axis: ControlAxis, gains: Gains) {
        debug!("PidCtrl gains on {:?} set to {:?}", axis, gains);
        self.reg_mut(axis).set_gains(gains);
    }

    pub fn axis_gains(&self, axis: ControlAxis) -> Gains {
        match axis {
            ControlAxis::PosX => self.pos_regs[0].gains(),
            ControlAxis::PosY => self.pos_regs[1].gains(),
            ControlAxis::PosZ => self.pos_regs[2].gains(),
            ControlAxis::RotX => self.rot_regs[0].gains(),
            ControlAxis::RotY => self.rot_regs[1].gains(),
            ControlAxis::RotZ => self.rot_regs[2].gains()
        }
    }

    /// The integral accumulated by one regulator.
    pub fn axis_integral(&self, axis: ControlAxis) -> f64 {
        match axis {
            ControlAxis::PosX => self.pos_regs[0].integral(),
            ControlAxis::PosY => self.pos_regs[1].integral(),
            ControlAxis::PosZ => self.pos_regs[2].integral(),
            ControlAxis::RotX => self.rot_regs[0].integral(),
            ControlAxis::RotY => self.rot_regs[1].integral(),
            ControlAxis::RotZ => self.rot_regs[2].integral()
        }
    }

    /// Clear the accumulated state of every regulator.
    pub fn reset_regulators(&mut self) {
        debug!("PidCtrl regulators reset");
        for reg in self.pos_regs.iter_mut().chain(self.rot_regs.iter_mut()) {
            reg.reset();
        }
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    fn reg_mut(&mut self, axis: ControlAxis) -> &mut PidController {
        match axis {
            ControlAxis::PosX => &mut self.pos_regs[0],
            ControlAxis::PosY => &mut self.pos_regs[1],
            ControlAxis::PosZ => &mut self.pos_regs[2],
            ControlAxis::RotX => &mut self.rot_regs[0],
            ControlAxis::RotY => &mut self.rot_regs[1],
            ControlAxis::RotZ => &mut self.rot_regs[2]
        }
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

fn regs_from_gains(gains: &[Gains; 3], integral_limit: Option<f64>) -> [PidController; 3] {
    [
        PidController::new(gains[0], integral_limit),
        PidController::new(gains[1], integral_limit),
        PidController::new(gains[2], integral_limit)
    ]
}

#[cfg(test)]
mod test {
    use super::*;

    fn input(position: [f64; 3], rotation: [f64; 3], target: [f64; 3]) -> InputData {
        InputData {
            position_m: Vector3::from(position),
            rotation_deg: Vector3::from(rotation),
            target_m: Vector3::from(target)
        }
    }

    #[test]
    fn test_proportional_tracks_error() {
        let mut params = Params::default();
        params.limits = Limits {
            torque: Vector3::repeat(1e6),
            force: Vector3::repeat(1e6)
        };
        let mut ctrl = PidCtrl::new(params);

        for i in 0..200 {
            let t = i as f64;
            let data = input([t, -t, 0.5 * t], [0.0; 3], [100.0, 20.0, -3.0]);
            let (cmd, rpt) = ctrl.proc(&data).unwrap();
            let cmd = cmd.unwrap();

            assert_eq!(cmd.force, data.target_m - data.position_m);
            assert_eq!(cmd.torque, rpt.rot_error_deg);
        }
    }

    #[test]
    fn test_rotation_error_wraps() {
        let mut ctrl = PidCtrl::new(Params::default());

        // Looking along +X is a yaw of 90, from a current yaw of 350 the
        // shortest way round is +100.
        let (_, rpt) = ctrl.proc(&input([0.0; 3], [0.0, 350.0, 0.0], [10.0, 0.0, 0.0])).unwrap();
        assert!((rpt.rot_error_deg[1] - 100.0).abs() < 1e-9);

        let (_, rpt) = ctrl.proc(&input([0.0; 3], [0.0, 180.0, 0.0], [10.0, 0.0, 0.0])).unwrap();
        assert!((rpt.rot_error_deg[1] + 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_output_limited() {
        let mut ctrl = PidCtrl::new(Params::default());
        let (cmd, rpt) = ctrl.proc(&input([0.0; 3], [0.0; 3], [50.0, -2.0, 0.0])).unwrap();
        let cmd = cmd.unwrap();

        assert_eq!(cmd.force, Vector3::new(10.0, -2.0, 0.0));
        assert_eq!(rpt.force_limited, [true, false, false]);

        // Yaw error of 90 saturates the Y torque
        assert_eq!(cmd.torque[1], 10.0);
        assert!(rpt.torque_limited[1]);
    }

    #[test]
    fn test_xy_restriction_masks() {
        let mut params = Params::default();
        params.plane_restriction = PlaneRestriction::XY;
        let mut ctrl = PidCtrl::new(params);

        for i in 0..100 {
            let t = i as f64;
            let data = input([0.1 * t, 0.2, 3.0], [t, 2.0 * t, 3.0 * t], [4.0, -1.0, 9.0]);
            let (cmd, rpt) = ctrl.proc(&data).unwrap();
            let cmd = cmd.unwrap();

            // Only rotation about the normal
            assert_eq!(cmd.torque[0], 0.0);
            assert_eq!(cmd.torque[1], 0.0);

            // No translation out of the plane
            assert_eq!(cmd.force[2], 0.0);
            assert_eq!(rpt.pos_error_m[2], 0.0);
            assert_eq!(rpt.pos_error_m[0], 4.0 - 0.1 * t);
        }
    }

    #[test]
    fn test_masks_per_plane() {
        let cases = [
            (PlaneRestriction::XZ, [false, true, false], [true, false, true]),
            (PlaneRestriction::YZ, [true, false, false], [false, true, true]),
        ];

        for &(plane, rot, pos) in cases.iter() {
            let mut params = Params::default();
            params.plane_restriction = plane;
            let mut ctrl = PidCtrl::new(params);

            let (cmd, _) = ctrl.proc(&input([0.0; 3], [30.0, 40.0, 50.0], [1.0, 2.0, 3.0])).unwrap();
            let cmd = cmd.unwrap();

            for i in 0..3 {
                assert_eq!(cmd.torque[i] != 0.0, rot[i], "{:?} torque {}", plane, i);
                assert_eq!(cmd.force[i] != 0.0, pos[i], "{:?} force {}", plane, i);
            }
        }
    }

    #[test]
    fn test_disabled() {
        let mut ctrl = PidCtrl::new(Params::default());
        ctrl.set_enabled(false);

        let (cmd, _) = ctrl.proc(&input([0.0; 3], [0.0; 3], [1.0, 1.0, 1.0])).unwrap();
        assert!(cmd.is_none());

        ctrl.set_enabled(true);
        let (cmd, _) = ctrl.proc(&input([0.0; 3], [0.0; 3], [1.0, 1.0, 1.0])).unwrap();
        assert!(cmd.is_some());
    }

    #[test]
    fn test_restriction_change() {
        let mut ctrl = PidCtrl::new(Params::default());

        assert!(!ctrl.set_plane_restriction(PlaneRestriction::None));
        assert!(ctrl.set_plane_restriction(PlaneRestriction::XZ));
        assert!(!ctrl.set_plane_restriction(PlaneRestriction::XZ));
        assert_eq!(ctrl.plane_restriction(), PlaneRestriction::XZ);
    }

    #[test]
    fn test_per_axis_gains() {
        let mut ctrl = PidCtrl::new(Params::default());
        ctrl.set_axis_gains(ControlAxis::PosY, Gains::new(0.5, 0.0, 0.0));

        assert_eq!(ctrl.axis_gains(ControlAxis::PosX), Gains::default());
        assert_eq!(ctrl.axis_gains(ControlAxis::PosY), Gains::new(0.5, 0.0, 0.0));

        let (cmd, _) = ctrl.proc(&input([0.0; 3], [0.0; 3], [2.0, 2.0, 2.0])).unwrap();
        assert_eq!(cmd.unwrap().force, Vector3::new(2.0, 1.0, 2.0));

        ctrl.set_gains(Gains::new(2.0, 0.0, 0.0));
        assert_eq!(ctrl.axis_gains(ControlAxis::RotZ), Gains::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn test_reset_regulators() {
        let mut params = Params::default();
        params.pos_gains = [Gains::new(1.0, 0.5, 0.25); 3];
        params.limits = Limits {
            torque: Vector3::repeat(1e6),
            force: Vector3::repeat(1e6)
        };
        let data = input([0.0; 3], [0.0; 3], [4.0, 0.0, 0.0]);

        let mut fresh = PidCtrl::new(params.clone());
        let (first, _) = fresh.proc(&data).unwrap();

        let mut ctrl = PidCtrl::new(params);
        for _ in 0..5 {
            ctrl.proc(&data).unwrap();
        }
        assert_eq!(ctrl.axis_integral(ControlAxis::PosX), 20.0);

        ctrl.reset_regulators();
        assert_eq!(ctrl.axis_integral(ControlAxis::PosX), 0.0);

        // Behaves as a new controller again, gains are kept
        let (after, _) = ctrl.proc(&data).unwrap();
        assert_eq!(after, first);
        assert_eq!(ctrl.axis_gains(ControlAxis::PosX), Gains::new(1.0, 0.5, 0.25));
    }
}
