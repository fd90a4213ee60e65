//! # Autonomy library.
//!
//! This library allows other crates in the workspace, and the benchmarks, to access items defined
//! inside the autonomy executable.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Autonomy module - sequences the autonomous period and turns the robot to a heading
pub mod auto;

/// Run clock - the time source used for all timing decisions
pub mod clock;

/// Data store - per-cycle data of the executable
pub mod data_store;

/// Equipment interfaces - the drive, mechanisms and vision commanded by the autonomy
pub mod eqpt;

/// Opmode - the host lifecycle wrapped around the autonomy manager
pub mod op_mode;

/// Simulation - kinematic stand-ins for the robot's equipment
pub mod sim;
