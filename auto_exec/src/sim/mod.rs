//! # Simulated equipment
//!
//! Kinematic stand-ins for the robot's equipment, allowing the autonomous sequence to be run end
//! to end without hardware. Dynamics are not modelled, demands take effect immediately.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod mech;
mod swerve;
mod vision;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use mech::SimMech;
pub use swerve::{
    SimSwerve, SimSwerveError, SimSwerveInput, SimSwerveOutput, SimSwerveParams, SimSwerveReport,
};
pub use vision::SimVision;
