//! Main simulation executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules from their parameter files
//!     - Assemble the simulation and start the navigator
//!     - Main loop, once per tick:
//!         - Dynamics step using the pending command
//!         - Controller update
//!         - Navigator reach check
//!         - Event dispatch to observers
//!         - Cycle management (when running in real time)
//!
//! # Modules
//!
//! All modules (e.g. `dyn_model`) shall meet the following requirements:
//!     1. Provide a public struct implementing the `util::module::State` trait.
//!

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::{eyre, WrapErr}, Report};
use log::{debug, info, warn};
use nalgebra::Vector3;
use serde::Deserialize;
use std::thread;
use std::time::{Duration, Instant};
use structopt::StructOpt;

// Internal
use auv_lib::{
    dyn_model::{self, DynModel},
    nav_ctrl::{self, NavCtrl},
    pid_ctrl::{self, PidCtrl},
    plane::PlaneRestriction,
    sim::{SimObserver, SimParams, Simulation}
};
use util::{
    logger::{logger_init, LevelFilter},
    module::State,
    session::Session
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Command line options.
#[derive(Debug, StructOpt)]
#[structopt(name = "auv_exec", about = "Added-mass AUV simulation with PID waypoint guidance")]
struct Opt {
    /// Executable parameter file, relative to `$AUV_SIM_ROOT/params`
    #[structopt(long, default_value = "auv_exec.toml")]
    exec_params: String,

    /// Number of ticks to run, overriding the parameter file
    #[structopt(short = "n", long)]
    num_ticks: Option<u64>,

    /// Pace the loop to the tick period rather than running flat out
    #[structopt(long)]
    realtime: bool,

    /// Plane restriction (None, XY, XZ or YZ), overriding the parameter file
    #[structopt(long)]
    plane: Option<PlaneRestriction>,

    /// Log every tick at trace level
    #[structopt(short, long)]
    verbose: bool
}

/// Executable parameters.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
struct ExecParams {
    /// Number of ticks to run
    num_ticks: u64,

    /// Pace the loop to the tick period
    realtime: bool,

    /// Ticks between progress reports in the log. Zero disables them.
    log_period_ticks: u64,

    /// Simulation driver parameters
    sim: SimParams
}

/// Observer writing notable simulation events to the log.
struct EventLogger;

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for ExecParams {
    fn default() -> Self {
        Self {
            num_ticks: 30_000,
            realtime: false,
            log_period_ticks: 500,
            sim: SimParams::default()
        }
    }
}

impl SimObserver for EventLogger {
    fn on_target_reached(&mut self, target_m: &Vector3<f64>) {
        info!("Target reached at {:?}", target_m);
    }

    fn on_plane_restriction_changed(&mut self, restriction: PlaneRestriction) {
        info!("Plane restriction is now {:?}", restriction);
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {

    // ---- EARLY INITIALISATION ----

    color_eyre::install()?;

    let opt = Opt::from_args();

    // Initialise session
    let session = Session::new(
        "auv_exec",
        "sessions"
    ).wrap_err("Failed to create the session")?;

    // Initialise logger
    let level = if opt.verbose { LevelFilter::Trace } else { LevelFilter::Debug };
    logger_init(level, &session)
        .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("AUV Simulation Executable\n");
    info!("Session directory: {:?}\n", session.session_root);
    debug!("CLI options: {:?}", opt);

    // ---- LOAD PARAMETERS ----

    let mut exec_params: ExecParams = util::params::load(&opt.exec_params)
        .wrap_err("Could not load exec params")?;

    if let Some(n) = opt.num_ticks {
        exec_params.num_ticks = n;
    }
    exec_params.realtime |= opt.realtime;

    if !(exec_params.sim.dt_s.is_finite() && exec_params.sim.dt_s > 0.0) {
        return Err(eyre!(
            "The tick period must be positive, found {} s", exec_params.sim.dt_s
        ));
    }

    info!("Exec parameters loaded");

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let mut dyn_model = DynModel::new(dyn_model::Params::default());
    dyn_model.init("dyn_model.toml")
        .wrap_err("Failed to initialise DynModel")?;
    info!("DynModel init complete");

    let mut pid_ctrl = PidCtrl::new(pid_ctrl::Params::default());
    pid_ctrl.init("pid_ctrl.toml")
        .wrap_err("Failed to initialise PidCtrl")?;
    info!("PidCtrl init complete");

    let mut nav_ctrl = NavCtrl::new(nav_ctrl::Params::default());
    nav_ctrl.init("nav_ctrl.toml")
        .wrap_err("Failed to initialise NavCtrl")?;
    info!("NavCtrl init complete");

    info!("Module initialisation complete\n");

    // ---- INITIALISE SIMULATION ----

    let mut sim = Simulation::new(exec_params.sim.clone(), dyn_model, pid_ctrl, nav_ctrl)
        .wrap_err("Failed to initialise the simulation")?;
    sim.subscribe(Box::new(EventLogger));

    if let Some(plane) = opt.plane {
        sim.set_plane_restriction(plane);
    }

    // ---- MAIN LOOP ----

    let tick_period = Duration::from_secs_f64(exec_params.sim.dt_s);
    let mut num_consec_overruns: u64 = 0;
    let mut num_targets_reached: u64 = 0;

    info!("Begining main loop ({} ticks)\n", exec_params.num_ticks);

    for _ in 0..exec_params.num_ticks {

        // Get cycle start time
        let cycle_start_instant = Instant::now();

        let rpt = sim.tick().wrap_err("Simulation tick failed")?;

        if rpt.target_reached {
            num_targets_reached += 1;
        }

        if exec_params.log_period_ticks > 0 && rpt.tick % exec_params.log_period_ticks == 0 {
            info!(
                "Tick {}: pos {:?}, target {:?}, distance {:.03} m",
                rpt.tick,
                rpt.state.position_m.as_slice(),
                rpt.target_m.as_slice(),
                rpt.distance_m
            );
        }

        // ---- CYCLE MANAGEMENT ----

        if !exec_params.realtime {
            continue
        }

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match tick_period.checked_sub(cycle_dur) {
            Some(d) => {
                num_consec_overruns = 0;
                thread::sleep(d);
            },
            None => {
                num_consec_overruns += 1;
                warn!(
                    "Cycle overran by {:.06} s ({} consecutive)",
                    cycle_dur.as_secs_f64() - tick_period.as_secs_f64(),
                    num_consec_overruns
                );
            }
        }
    }

    // ---- SHUTDOWN ----

    info!(
        "End of execution: {} ticks, {} targets reached, final position {:?}",
        sim.num_ticks(),
        num_targets_reached,
        sim.state().position_m.as_slice()
    );

    Ok(())
}
