//! # AUV simulation library.
//!
//! This library contains the simulation core: the added-mass dynamics model,
//! the PID controller, the waypoint navigator and the tick driver which ties
//! them together. The `auv_exec` executable is a thin shell around it.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Euler angle and quaternion helpers
pub mod attitude;

/// Dynamics model - advances the vehicle's kinematic state from a force/torque command
pub mod dyn_model;

/// Generic explicit ODE integration
pub mod integrator;

/// Waypoint navigation - selects the target the vehicle is driven toward
pub mod nav_ctrl;

/// PID controller - converts pose error into the force/torque command
pub mod pid_ctrl;

/// Plane restrictions on the vehicle's motion
pub mod plane;

/// Simulation driver - runs the modules in order once per tick
pub mod sim;
