//! # Simulated swerve chassis
//!
//! Integrates the commanded motion of the chassis each cycle. Legs are driven at a speed
//! proportional to their power, with the body turning towards the leg's turn angle while it
//! travels. A leg is complete once its magnitude has been covered, after which the chassis keeps
//! moving until it is stopped or given a new command.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::drive::{BrakeMode, DriveCmd, Leg, ModuleDems, RawDrive};
use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};
use util::{
    maths::{ang_dist_deg, clamp, lin_map},
    module::State,
};

use crate::eqpt::DriveActuator;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SimSwerveParams {
    /// Chassis speed at full power.
    ///
    /// Units: centimeters/second
    pub max_speed_cm_s: f64,

    /// Chassis turn rate at full rotation demand.
    ///
    /// Units: degrees/second
    pub max_turn_rate_dps: f64,

    /// Heading of the chassis in the world when the simulation starts.
    ///
    /// Units: degrees
    pub initial_heading_deg: f64,
}

/// Simulated chassis.
#[derive(Debug, Clone)]
pub struct SimSwerve {
    params: SimSwerveParams,

    /// Heading of the chassis in the world frame.
    world_heading_deg: f64,

    /// World heading captured as the field orientation.
    field_heading_deg: f64,

    /// Position in the world frame.
    ///
    /// Units: centimeters
    position_cm: [f64; 2],

    cmd: DriveCmd,

    leg: Option<LegProgress>,

    brake: BrakeMode,
}

#[derive(Debug, Clone, Copy)]
struct LegProgress {
    leg: Leg,
    travelled_cm: f64,
    complete: bool,
}

/// Input to each simulation cycle.
#[derive(Debug, Clone, Copy)]
pub struct SimSwerveInput {
    /// Time since the last cycle.
    ///
    /// Units: seconds
    pub dt_s: f64,
}

/// Chassis state after a simulation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimSwerveOutput {
    /// Heading relative to the field orientation.
    ///
    /// Units: degrees
    pub heading_deg: f64,

    /// Position in the world frame.
    ///
    /// Units: centimeters
    pub x_cm: f64,
    pub y_cm: f64,

    pub moving: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SimSwerveReport {
    /// Fraction of the current leg covered, 0 if no leg is executing.
    pub leg_progress: f64,

    pub leg_complete: bool,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimSwerveError {
    #[error("Invalid simulation parameters: {0}")]
    InvalidParams(String),

    #[error("Simulation time step must be finite and non-negative, found {0}")]
    InvalidTimeStep(f64),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for SimSwerveParams {
    fn default() -> Self {
        Self {
            max_speed_cm_s: 100.0,
            max_turn_rate_dps: 180.0,
            initial_heading_deg: 0.0,
        }
    }
}

impl SimSwerve {
    pub fn new(params: SimSwerveParams) -> Self {
        Self {
            params,
            world_heading_deg: params.initial_heading_deg,
            field_heading_deg: 0.0,
            position_cm: [0.0; 2],
            cmd: DriveCmd::Stop,
            leg: None,
            brake: BrakeMode::Float,
        }
    }

    pub fn position_cm(&self) -> [f64; 2] {
        self.position_cm
    }

    pub fn cmd(&self) -> DriveCmd {
        self.cmd
    }

    pub fn brake(&self) -> BrakeMode {
        self.brake
    }

    fn speed_cm_s(&self, power: f64) -> f64 {
        lin_map(
            (0.0, 1.0),
            (0.0, self.params.max_speed_cm_s),
            clamp(power, -1.0, 1.0),
        )
    }

    /// Move the chassis by `dist_cm` along the field direction `dir_deg`.
    fn translate(&mut self, dist_cm: f64, dir_deg: f64) {
        let dir_rad = (self.field_heading_deg + dir_deg).to_radians();
        self.position_cm[0] += dist_cm * dir_rad.cos();
        self.position_cm[1] += dist_cm * dir_rad.sin();
    }

    /// Turn the body towards `target_deg` (field frame) at up to `rate_dps`.
    fn turn_towards(&mut self, target_deg: f64, rate_dps: f64, dt_s: f64) {
        let err_deg = ang_dist_deg(self.heading_deg(), target_deg);
        let max_step = rate_dps * dt_s;
        self.world_heading_deg += clamp(err_deg, -max_step, max_step);
    }

    fn integrate_leg(&mut self, dt_s: f64) {
        let mut progress = match self.leg {
            Some(p) => p,
            None => return,
        };

        let speed = self.speed_cm_s(progress.leg.power);
        let mut dist_cm = speed * dt_s;

        if !progress.complete {
            let remaining = progress.leg.magnitude - progress.travelled_cm;
            if dist_cm >= remaining {
                dist_cm = remaining;
                progress.complete = true;
                debug!("Sim leg complete after {:.1} cm", progress.leg.magnitude);
            }
            progress.travelled_cm += dist_cm;
        }

        self.translate(dist_cm, progress.leg.heading_offset_deg);
        self.turn_towards(
            progress.leg.turn_angle_deg,
            self.params.max_turn_rate_dps * progress.leg.power,
            dt_s,
        );

        self.leg = Some(progress);
    }

    fn integrate_raw(&mut self, raw: RawDrive, dt_s: f64) {
        // Forward is along the body heading, strafe to its right
        let heading = self.heading_deg();
        self.translate(self.speed_cm_s(raw.forward) * dt_s, heading);
        self.translate(self.speed_cm_s(raw.strafe) * dt_s, heading - 90.0);

        // Negative rotate increases heading
        self.world_heading_deg -= clamp(raw.rotate, -1.0, 1.0) * self.params.max_turn_rate_dps * dt_s;
    }
}

impl State for SimSwerve {
    type InitData = SimSwerveParams;
    type InitError = SimSwerveError;

    type InputData = SimSwerveInput;
    type OutputData = SimSwerveOutput;
    type StatusReport = SimSwerveReport;
    type ProcError = SimSwerveError;

    /// Reset the simulation with new parameters.
    fn init(&mut self, init_data: Self::InitData) -> Result<(), Self::InitError> {
        if !(init_data.max_speed_cm_s > 0.0) || !(init_data.max_turn_rate_dps > 0.0) {
            return Err(SimSwerveError::InvalidParams(format!(
                "speed ({}) and turn rate ({}) must be positive",
                init_data.max_speed_cm_s, init_data.max_turn_rate_dps
            )));
        }

        *self = Self::new(init_data);

        Ok(())
    }

    /// Advance the simulation by one time step.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        let dt_s = input_data.dt_s;
        if !dt_s.is_finite() || dt_s < 0.0 {
            return Err(SimSwerveError::InvalidTimeStep(dt_s));
        }

        let moving = match self.cmd {
            DriveCmd::Vector(_) => {
                self.integrate_leg(dt_s);
                true
            }
            DriveCmd::Raw(raw) => {
                self.integrate_raw(raw, dt_s);
                raw != RawDrive::default()
            }
            // Module demands steer the wheels in place, which only turn if powered
            cmd => !cmd.is_stopped(),
        };

        let report = match self.leg {
            Some(p) => SimSwerveReport {
                leg_progress: p.travelled_cm / p.leg.magnitude,
                leg_complete: p.complete,
            },
            None => SimSwerveReport::default(),
        };

        let output = SimSwerveOutput {
            heading_deg: self.heading_deg(),
            x_cm: self.position_cm[0],
            y_cm: self.position_cm[1],
            moving,
        };

        trace!("SimSwerve: {:?}", output);

        Ok((output, report))
    }
}

impl DriveActuator for SimSwerve {
    fn drive_vector(&mut self, leg: Leg) {
        if let Err(e) = leg.validate() {
            warn!("Sim rejected leg {:?}: {}", leg, e);
            self.stop();
            return;
        }

        self.cmd = DriveCmd::Vector(leg);
        self.leg = Some(LegProgress {
            leg,
            travelled_cm: 0.0,
            complete: false,
        });
    }

    fn drive_raw(&mut self, raw: RawDrive) {
        self.cmd = DriveCmd::Raw(raw);
        self.leg = None;
    }

    fn set_modules(&mut self, dems: ModuleDems) {
        self.cmd = DriveCmd::Modules(dems);
        self.leg = None;
    }

    fn stop(&mut self) {
        self.cmd = DriveCmd::Stop;
        self.leg = None;
    }

    fn poll_completion(&mut self, stop_on_complete: bool) -> bool {
        match self.leg {
            Some(p) if !p.complete => false,
            Some(_) => {
                if stop_on_complete {
                    self.stop();
                }
                true
            }
            None => true,
        }
    }

    fn set_field_orientation(&mut self) {
        self.field_heading_deg = self.world_heading_deg;
    }

    fn set_brake(&mut self, mode: BrakeMode) {
        self.brake = mode;
    }

    fn heading_deg(&self) -> f64 {
        ang_dist_deg(self.field_heading_deg, self.world_heading_deg)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use comms_if::eqpt::drive::WheelDem;

    fn tick(sim: &mut SimSwerve, dt_s: f64, n: usize) -> SimSwerveOutput {
        let mut out = None;
        for _ in 0..n {
            out = Some(sim.proc(&SimSwerveInput { dt_s }).unwrap().0);
        }
        out.unwrap()
    }

    #[test]
    fn test_leg_completes() {
        let mut sim = SimSwerve::new(SimSwerveParams::default());

        // 50 cm/s for 30 cm
        sim.drive_vector(Leg::new(0.5, 0.0, 0.0, 30.0));
        assert!(!sim.poll_completion(true));

        tick(&mut sim, 0.1, 5);
        assert!(!sim.poll_completion(true));

        let (_, report) = sim.proc(&SimSwerveInput { dt_s: 0.1 }).unwrap();
        assert!(report.leg_complete);
        assert!((report.leg_progress - 1.0).abs() < 1e-9);
        assert!((sim.position_cm()[0] - 30.0).abs() < 1e-9);

        assert!(sim.poll_completion(true));
        assert_eq!(sim.cmd(), DriveCmd::Stop);
    }

    #[test]
    fn test_leg_keeps_moving_without_stop() {
        let mut sim = SimSwerve::new(SimSwerveParams::default());

        sim.drive_vector(Leg::new(1.0, 90.0, 0.0, 10.0));
        tick(&mut sim, 0.1, 1);

        assert!(sim.poll_completion(false));
        let out = tick(&mut sim, 0.1, 1);

        assert!(out.moving);
        assert!((sim.position_cm()[1] - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_module_dems_steer_in_place() {
        let mut sim = SimSwerve::new(SimSwerveParams::default());

        sim.set_modules(ModuleDems::uniform(WheelDem {
            power: 0.02,
            angle: 0.3,
        }));
        assert!(tick(&mut sim, 0.1, 1).moving);

        sim.set_modules(ModuleDems::default());
        assert!(!tick(&mut sim, 0.1, 1).moving);

        assert_eq!(sim.position_cm(), [0.0, 0.0]);
    }

    #[test]
    fn test_leg_turns_body() {
        let mut sim = SimSwerve::new(SimSwerveParams::default());

        // 90 deg/s turn at half power
        sim.drive_vector(Leg::new(0.5, 0.0, 45.0, 1000.0));
        let out = tick(&mut sim, 0.1, 10);

        assert!((out.heading_deg - 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_raw_rotation() {
        let mut sim = SimSwerve::new(SimSwerveParams::default());

        sim.drive_raw(RawDrive::rotation(-0.5));
        let out = tick(&mut sim, 0.1, 2);

        // Negative rotate increases heading
        assert!((out.heading_deg - 18.0).abs() < 1e-9);
        assert_eq!(sim.position_cm(), [0.0, 0.0]);
    }

    #[test]
    fn test_field_orientation() {
        let mut sim = SimSwerve::new(SimSwerveParams {
            initial_heading_deg: 30.0,
            ..Default::default()
        });

        assert!((sim.heading_deg() - 30.0).abs() < 1e-9);
        sim.set_field_orientation();
        assert!(sim.heading_deg().abs() < 1e-9);
    }

    #[test]
    fn test_invalid_leg_stops() {
        let mut sim = SimSwerve::new(SimSwerveParams::default());

        sim.drive_vector(Leg::new(2.0, 0.0, 0.0, 10.0));

        assert_eq!(sim.cmd(), DriveCmd::Stop);
        assert!(sim.poll_completion(false));
    }

    #[test]
    fn test_init_and_proc_errors() {
        let mut sim = SimSwerve::new(SimSwerveParams::default());

        assert!(sim
            .init(SimSwerveParams {
                max_speed_cm_s: 0.0,
                ..Default::default()
            })
            .is_err());
        assert_eq!(
            sim.proc(&SimSwerveInput { dt_s: -0.1 }),
            Err(SimSwerveError::InvalidTimeStep(-0.1))
        );
    }
}
