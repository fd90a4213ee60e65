//! # Mechanisms Equipment Commands
//!
//! The lift which lowers the robot from its starting position and the servo which drops the team
//! marker.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Marker servo position holding the marker in the robot.
pub const MARKER_HELD_POS: f64 = 0.0;

/// Marker servo position releasing the marker.
pub const MARKER_DEPLOYED_POS: f64 = 1.0;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Demands currently applied to the mechanisms.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct MechDems {
    /// Absolute position target of the lift motor, `None` if the lift is not under position
    /// control.
    ///
    /// Units: encoder ticks
    pub lift_target_ticks: Option<i32>,

    /// Normalised lift motor power, 0 to 1.
    pub lift_power: f64,

    /// Normalised marker servo position, 0 to 1.
    pub marker_pos: f64,
}

// -----------------------------------------------------------------------------------------------
// IMPLS
// -----------------------------------------------------------------------------------------------

impl Default for MechDems {
    fn default() -> Self {
        Self {
            lift_target_ticks: None,
            lift_power: 0.0,
            marker_pos: MARKER_HELD_POS,
        }
    }
}

impl MechDems {
    /// Returns true if no mechanism is energised.
    pub fn is_inactive(&self) -> bool {
        self.lift_power == 0.0
    }

    /// Returns true if the marker has been released.
    pub fn is_marker_deployed(&self) -> bool {
        self.marker_pos >= MARKER_DEPLOYED_POS
    }
}
