//! # Equipment interfaces
//!
//! Traits for the equipment the autonomy system commands. The equipment is owned by the host
//! and only borrowed by the autonomy manager while it is being stepped.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod mock;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::{
    drive::{BrakeMode, Leg, ModuleDems, RawDrive},
    vision::VisionParams,
};

use crate::auto::auto_mgr::Route;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Command channel of the four module swerve chassis.
///
/// All commands are fire-and-forget. Completion of an autonomous leg is reported through
/// [`DriveActuator::poll_completion`], which is polled once per cycle.
pub trait DriveActuator {
    /// Begin an autonomous leg.
    fn drive_vector(&mut self, leg: Leg);

    /// Apply a raw chassis-frame demand until the next command.
    fn drive_raw(&mut self, raw: RawDrive);

    /// Apply direct demands to each module.
    fn set_modules(&mut self, dems: ModuleDems);

    /// Remove all drive power, holding the current module angles.
    fn stop(&mut self);

    /// Check whether the current autonomous leg has finished.
    ///
    /// If `stop_on_complete` is set the drive shall stop itself when the leg completes, otherwise
    /// it keeps its last demand until commanded otherwise.
    fn poll_completion(&mut self, stop_on_complete: bool) -> bool;

    /// Capture the current orientation as the field frame used by legs and heading readback.
    fn set_field_orientation(&mut self);

    /// Set the zero power behaviour of the drive motors.
    fn set_brake(&mut self, mode: BrakeMode);

    /// Current heading relative to the field orientation.
    ///
    /// Units: degrees
    fn heading_deg(&self) -> f64;
}

/// The lift motor and marker drop servo.
pub trait MechActuator {
    /// Zero the lift encoder at its current position.
    fn reset_lift_encoder(&mut self);

    /// Set the absolute lift position target.
    ///
    /// Units: encoder ticks
    fn set_lift_target(&mut self, ticks: i32);

    /// Set the normalised lift motor power, 0 to 1.
    fn set_lift_power(&mut self, power: f64);

    /// Set the normalised marker servo position, 0 to 1.
    fn set_marker_pos(&mut self, pos: f64);

    /// Remove power from all mechanisms.
    fn deactivate(&mut self);
}

/// The optional sampling detector.
pub trait VisionDetector {
    /// Configure and open the detector.
    fn init(&mut self, params: &VisionParams) -> Result<(), VisionError>;

    /// Start processing frames.
    fn enable(&mut self);

    /// Stop processing frames and release the camera.
    fn disable(&mut self);

    /// The route the detector's classification suggests, if it has one.
    fn route_hint(&self) -> Option<Route>;
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors raised by a vision detector.
#[derive(Debug, thiserror::Error)]
pub enum VisionError {
    #[error("Camera {0} is not available")]
    CameraUnavailable(u8),

    #[error("Invalid detector configuration: {0}")]
    InvalidConfig(String),
}
