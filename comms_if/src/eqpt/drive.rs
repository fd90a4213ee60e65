//! # Swerve Drive Equipment Commands

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Number of swerve modules on the chassis.
pub const NUM_MODULES: usize = 4;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// One open-loop autonomous motion command.
///
/// The chassis drives in the direction given by `heading_offset_deg` (relative to the field
/// orientation captured at init) while rotating its body towards `turn_angle_deg`, until
/// `magnitude` has been covered. Completion is reported asynchronously by the drive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Leg {
    /// Normalised drive power, 0 to 1.
    pub power: f64,

    /// Direction of travel relative to the field orientation.
    ///
    /// Units: degrees
    pub heading_offset_deg: f64,

    /// Body orientation to reach while travelling.
    ///
    /// Units: degrees
    pub turn_angle_deg: f64,

    /// Travel distance of the leg.
    ///
    /// Units: centimeters
    pub magnitude: f64,
}

/// A raw drive demand in the chassis frame, each axis normalised between -1 and +1.
///
/// Following the chassis convention a negative `rotate` turns the robot towards increasing
/// heading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDrive {
    pub forward: f64,
    pub strafe: f64,
    pub rotate: f64,
}

/// Demand for a single swerve module.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WheelDem {
    /// Normalised drive power, -1 to +1.
    pub power: f64,

    /// Normalised steer servo position.
    pub angle: f64,
}

/// Direct demands for every module, ordered left front, right front, left rear, right rear.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleDems(pub [WheelDem; NUM_MODULES]);

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Behaviour of the drive motors at zero power.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum BrakeMode {
    /// Motors actively resist motion.
    Brake,

    /// Motors coast freely.
    Float,
}

/// The most recent command issued to the drive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DriveCmd {
    /// Drive power removed, module angles held.
    Stop,

    /// An autonomous leg is executing.
    Vector(Leg),

    /// A raw chassis-frame demand.
    Raw(RawDrive),

    /// Direct per-module demands.
    Modules(ModuleDems),
}

/// Reasons a leg is rejected.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum LegError {
    #[error("Leg power must be between 0 and 1, found {0}")]
    InvalidPower(f64),

    #[error("Leg magnitude must be positive and finite, found {0}")]
    InvalidMagnitude(f64),

    #[error("Leg angles must be finite")]
    NonFiniteAngle,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Leg {
    pub const fn new(
        power: f64,
        heading_offset_deg: f64,
        turn_angle_deg: f64,
        magnitude: f64,
    ) -> Self {
        Self {
            power,
            heading_offset_deg,
            turn_angle_deg,
            magnitude,
        }
    }

    /// Check the leg can be executed by the drive.
    pub fn validate(&self) -> Result<(), LegError> {
        if !(0.0..=1.0).contains(&self.power) {
            return Err(LegError::InvalidPower(self.power));
        }
        if !self.magnitude.is_finite() || self.magnitude <= 0.0 {
            return Err(LegError::InvalidMagnitude(self.magnitude));
        }
        if !self.heading_offset_deg.is_finite() || !self.turn_angle_deg.is_finite() {
            return Err(LegError::NonFiniteAngle);
        }

        Ok(())
    }
}

impl RawDrive {
    pub const fn new(forward: f64, strafe: f64, rotate: f64) -> Self {
        Self {
            forward,
            strafe,
            rotate,
        }
    }

    /// A pure rotation about the chassis centre.
    pub const fn rotation(rotate: f64) -> Self {
        Self::new(0.0, 0.0, rotate)
    }
}

impl ModuleDems {
    /// Every module at the same demand.
    pub fn uniform(dem: WheelDem) -> Self {
        Self([dem; NUM_MODULES])
    }

    /// Returns true if no module has any drive power.
    pub fn is_unpowered(&self) -> bool {
        self.0.iter().all(|d| d.power == 0.0)
    }
}

impl DriveCmd {
    /// Returns true if the command leaves the drive motors unpowered.
    pub fn is_stopped(&self) -> bool {
        match self {
            DriveCmd::Stop => true,
            DriveCmd::Modules(m) => m.is_unpowered(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_leg_validate() {
        assert!(Leg::new(0.7, 85.0, 0.0, 15.0).validate().is_ok());
        assert_eq!(
            Leg::new(1.2, 0.0, 0.0, 15.0).validate(),
            Err(LegError::InvalidPower(1.2))
        );
        assert_eq!(
            Leg::new(0.5, 0.0, 0.0, 0.0).validate(),
            Err(LegError::InvalidMagnitude(0.0))
        );
        assert_eq!(
            Leg::new(0.5, f64::NAN, 0.0, 10.0).validate(),
            Err(LegError::NonFiniteAngle)
        );
    }

    #[test]
    fn test_is_stopped() {
        assert!(DriveCmd::Stop.is_stopped());
        assert!(DriveCmd::Modules(ModuleDems::uniform(WheelDem { power: 0.0, angle: 0.7 }))
            .is_stopped());
        assert!(!DriveCmd::Raw(RawDrive::rotation(0.1)).is_stopped());
    }
}
