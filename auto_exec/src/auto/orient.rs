//! # Orientation correction
//!
//! Closed loop turn of the chassis to a heading. The chassis is rotated on the spot, fast while the
//! error is large and slowly once it is close, until the heading is within tolerance of the target.
//!
//! The turn is provided in two forms:
//!
//! - [`Rotation`], stepped once per cycle by the autonomy manager so the control loop never
//!   blocks.
//! - [`orient_blocking`], which loops until the turn finishes. This stalls the caller for up to
//!   the timeout and must only be used where that is acceptable, never inside the per-cycle
//!   processing.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::drive::RawDrive;
use log::{debug, trace, warn};
use serde::Deserialize;
use util::maths::ang_dist_deg;

use crate::{clock::Clock, eqpt::DriveActuator};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct OrientParams {
    /// Absolute heading error at which the turn is complete.
    ///
    /// Units: degrees
    pub tolerance_deg: f64,

    /// Absolute heading error above which the coarse rate is used.
    ///
    /// Units: degrees
    pub coarse_threshold_deg: f64,

    /// Normalised rotation power used for large errors.
    pub coarse_rate: f64,

    /// Normalised rotation power used for small errors.
    pub fine_rate: f64,

    /// Time after which an unfinished turn is abandoned.
    ///
    /// Units: seconds
    pub timeout_s: f64,

    /// Period between heading checks of [`orient_blocking`].
    ///
    /// Units: seconds
    pub poll_period_s: f64,
}

/// An in progress turn to a heading.
#[derive(Debug, Clone)]
pub struct Rotation {
    target_deg: f64,
    start_time_s: f64,
    params: OrientParams,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Result of stepping a [`Rotation`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RotationStatus {
    /// A rotation demand was issued, the heading is not yet within tolerance.
    InProgress,

    /// The heading is within tolerance and the chassis has been stopped.
    Converged,

    /// The timeout elapsed and the chassis has been stopped.
    TimedOut,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OrientError {
    #[error(
        "Could not reach heading {target_deg:.1} deg within {timeout_s:.1} s, \
        stopped at {heading_deg:.1} deg"
    )]
    Timeout {
        target_deg: f64,
        heading_deg: f64,
        timeout_s: f64,
    },
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Turn the chassis to `target_deg`, blocking until the turn converges or times out.
///
/// Between heading checks the caller is blocked for `params.poll_period_s` using the clock. The
/// chassis is stopped exactly once, on exit.
///
/// Intended for hosts whose drive reports heading independently of the caller, such as hardware
/// squaring up in the pits before the autonomous period starts. The simulated drive only turns
/// when it is processed, so simulated runs turn through [`Rotation`] in the `TestTurnRobot` state.
pub fn orient_blocking(
    drive: &mut dyn DriveActuator,
    clock: &dyn Clock,
    target_deg: f64,
    params: &OrientParams,
) -> Result<(), OrientError> {
    let mut rotation = Rotation::new(target_deg, clock.elapsed_s(), *params);

    loop {
        match rotation.step(drive, clock.elapsed_s()) {
            RotationStatus::InProgress => clock.sleep(params.poll_period_s),
            RotationStatus::Converged => return Ok(()),
            RotationStatus::TimedOut => {
                return Err(OrientError::Timeout {
                    target_deg,
                    heading_deg: drive.heading_deg(),
                    timeout_s: params.timeout_s,
                })
            }
        }
    }
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for OrientParams {
    fn default() -> Self {
        Self {
            tolerance_deg: 5.0,
            coarse_threshold_deg: 90.0,
            coarse_rate: 0.20,
            fine_rate: 0.10,
            timeout_s: 10.0,
            poll_period_s: 0.01,
        }
    }
}

impl Rotation {
    pub fn new(target_deg: f64, start_time_s: f64, params: OrientParams) -> Self {
        Self {
            target_deg,
            start_time_s,
            params,
        }
    }

    pub fn target_deg(&self) -> f64 {
        self.target_deg
    }

    /// Check the heading and issue the next rotation demand.
    ///
    /// Once this returns anything other than [`RotationStatus::InProgress`] the chassis has been
    /// stopped and the rotation shall not be stepped again.
    pub fn step(&mut self, drive: &mut dyn DriveActuator, now_s: f64) -> RotationStatus {
        let heading_deg = drive.heading_deg();
        let error_deg = ang_dist_deg(heading_deg, self.target_deg);

        if error_deg.abs() <= self.params.tolerance_deg {
            drive.stop();
            debug!(
                "Rotation to {:.1} deg converged at {:.1} deg",
                self.target_deg, heading_deg
            );
            return RotationStatus::Converged;
        }

        if now_s - self.start_time_s > self.params.timeout_s {
            drive.stop();
            warn!(
                "Rotation to {:.1} deg timed out after {:.1} s at {:.1} deg",
                self.target_deg, self.params.timeout_s, heading_deg
            );
            return RotationStatus::TimedOut;
        }

        let rate = if error_deg.abs() > self.params.coarse_threshold_deg {
            self.params.coarse_rate
        } else {
            self.params.fine_rate
        };

        // Negative rotation increases heading
        let rotate = if error_deg > 0.0 { -rate } else { rate };

        trace!(
            "Rotating: heading {:.1} deg, error {:.1} deg, demand {:.2}",
            heading_deg,
            error_deg,
            rotate
        );

        drive.drive_raw(RawDrive::rotation(rotate));

        RotationStatus::InProgress
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{clock::ManualClock, eqpt::mock::MockDrive};
    use comms_if::eqpt::drive::DriveCmd;

    fn rotations(drive: &MockDrive) -> Vec<f64> {
        drive
            .cmds
            .iter()
            .filter_map(|c| match c {
                DriveCmd::Raw(r) => Some(r.rotate),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_blocking_converges() {
        let clock = ManualClock::new();
        let mut drive = MockDrive {
            heading_step_deg: 7.0,
            ..Default::default()
        };

        let res = orient_blocking(&mut drive, &clock, 90.0, &OrientParams::default());

        assert_eq!(res, Ok(()));
        assert!((drive.heading_deg - 90.0).abs() <= 5.0);
        assert_eq!(drive.num_stops, 1);
        assert_eq!(drive.last_cmd(), Some(DriveCmd::Stop));

        // Every demand turns towards increasing heading at the fine rate, as the error never
        // exceeds 90 deg
        let rots = rotations(&drive);
        assert!(!rots.is_empty());
        assert!(rots.iter().all(|r| *r == -0.10));
    }

    #[test]
    fn test_coarse_then_fine() {
        let clock = ManualClock::new();
        let mut drive = MockDrive {
            heading_step_deg: 10.0,
            ..Default::default()
        };

        orient_blocking(&mut drive, &clock, -150.0, &OrientParams::default()).unwrap();

        // Heading has to decrease, so positive demands. Errors of 150 down to 100 deg are coarse,
        // from 90 deg onwards fine.
        let rots = rotations(&drive);
        assert_eq!(&rots[..6], &[0.20; 6]);
        assert!(rots[6..].iter().all(|r| *r == 0.10));
        assert!((drive.heading_deg + 150.0).abs() <= 5.0);
        assert_eq!(drive.num_stops, 1);
    }

    #[test]
    fn test_takes_shortest_way_round() {
        let mut drive = MockDrive {
            heading_deg: 170.0,
            heading_step_deg: 5.0,
            ..Default::default()
        };
        let mut rot = Rotation::new(-170.0, 0.0, OrientParams::default());

        assert_eq!(rot.step(&mut drive, 0.0), RotationStatus::InProgress);

        // -170 is 20 deg "above" 170 across the wrap, so heading must increase
        assert_eq!(rotations(&drive), vec![-0.10]);
    }

    #[test]
    fn test_blocking_timeout() {
        let clock = ManualClock::new();
        // Drive never turns
        let mut drive = MockDrive::default();

        let res = orient_blocking(&mut drive, &clock, 90.0, &OrientParams::default());

        assert_eq!(
            res,
            Err(OrientError::Timeout {
                target_deg: 90.0,
                heading_deg: 0.0,
                timeout_s: 10.0
            })
        );
        assert!(clock.elapsed_s() > 10.0);
        assert_eq!(drive.num_stops, 1);
    }

    #[test]
    fn test_already_at_target() {
        let mut drive = MockDrive {
            heading_deg: 88.0,
            ..Default::default()
        };
        let mut rot = Rotation::new(90.0, 0.0, OrientParams::default());

        assert_eq!(rot.step(&mut drive, 0.0), RotationStatus::Converged);
        assert_eq!(drive.cmds, vec![DriveCmd::Stop]);
    }
}
