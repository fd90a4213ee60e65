//! # Autonomous opmode
//!
//! Host lifecycle around the [`AutoMgr`]. The host calls [`AutoOpMode::init`] while the robot is
//! waiting for the match, [`AutoOpMode::start`] when the autonomous period begins,
//! [`AutoOpMode::loop_cycle`] once per cycle, and [`AutoOpMode::stop`] when the period ends.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::{
    drive::{BrakeMode, ModuleDems, WheelDem, NUM_MODULES},
    mech::MARKER_HELD_POS,
    vision::VisionParams,
};
use log::{info, trace, warn};
use serde::Deserialize;

use crate::{
    auto::auto_mgr::{AutoMgr, AutoMgrError, AutoTm, StepOutcome},
    clock::Clock,
    eqpt::{DriveActuator, MechActuator, VisionDetector},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct OpModeParams {
    /// Magnitude of the module angle the wheels are toed to at init.
    pub init_wheel_angle: f64,

    /// Drive power briefly applied at init so the modules settle at their angles.
    pub init_wheel_power: f64,

    /// Time the init power is held for.
    ///
    /// Units: seconds
    pub init_settle_s: f64,

    /// Target period of one cycle.
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    /// Open the vision detector at init, if one is fitted.
    pub use_vision: bool,

    pub vision: VisionParams,
}

/// The autonomous opmode, owning the manager and the equipment.
pub struct AutoOpMode<D, M> {
    pub params: OpModeParams,

    pub mgr: AutoMgr,

    pub drive: D,

    pub mech: M,

    vision: Option<Box<dyn VisionDetector>>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum OpModeError {
    #[error("Failed to load OpModeParams: {0:?}")]
    ParamLoadError(util::params::LoadError),

    #[error("Autonomy manager error: {0}")]
    AutoMgrError(#[from] AutoMgrError),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for OpModeParams {
    fn default() -> Self {
        Self {
            init_wheel_angle: 0.3,
            init_wheel_power: 0.02,
            init_settle_s: 0.5,
            cycle_period_s: 0.1,
            use_vision: false,
            vision: VisionParams::default(),
        }
    }
}

impl OpModeParams {
    /// Module demands toeing the front wheels out and the rear wheels in.
    pub fn init_dems(&self, power: f64) -> ModuleDems {
        let a = self.init_wheel_angle;
        let angles: [f64; NUM_MODULES] = [-a, a, a, -a];

        let mut dems = ModuleDems::default();
        for (dem, angle) in dems.0.iter_mut().zip(angles.iter()) {
            *dem = WheelDem {
                power,
                angle: *angle,
            };
        }

        dems
    }
}

impl<D, M> AutoOpMode<D, M>
where
    D: DriveActuator,
    M: MechActuator,
{
    pub fn new(
        params: OpModeParams,
        mgr: AutoMgr,
        drive: D,
        mech: M,
        vision: Option<Box<dyn VisionDetector>>,
    ) -> Self {
        Self {
            params,
            mgr,
            drive,
            mech,
            vision,
        }
    }

    /// Prepare the robot before the autonomous period.
    ///
    /// Blocks for the init settle time. A detector that fails to open is dropped and the run
    /// continues without it.
    pub fn init(&mut self, clock: &dyn Clock) {
        info!("Initialising autonomous opmode");

        self.drive.set_field_orientation();
        self.mech.set_marker_pos(MARKER_HELD_POS);

        self.drive
            .set_modules(self.params.init_dems(self.params.init_wheel_power));
        clock.sleep(self.params.init_settle_s);
        self.drive.set_modules(self.params.init_dems(0.0));

        if !self.params.use_vision {
            self.vision = None;
        }

        if let Some(mut vision) = self.vision.take() {
            match vision.init(&self.params.vision) {
                Ok(()) => {
                    vision.enable();
                    self.vision = Some(vision);
                    info!("Vision detector enabled");
                }
                Err(e) => warn!("Vision detector unavailable, continuing without it: {}", e),
            }
        }

        info!("Opmode init complete");
    }

    /// Begin the autonomous sequence.
    pub fn start(&mut self, clock: &dyn Clock) -> Result<(), OpModeError> {
        let hint = self.vision.as_ref().and_then(|v| v.route_hint());
        self.mgr.start(clock, hint)?;

        Ok(())
    }

    /// Run one cycle, returning the telemetry for this cycle if there is any to report.
    pub fn loop_cycle(&mut self, clock: &dyn Clock) -> Result<Option<AutoTm>, OpModeError> {
        let outcome = self.mgr.step(clock, &mut self.drive, &mut self.mech)?;

        if let StepOutcome::Advanced { from, to } = outcome {
            trace!("{} -> {}", from, to);
        }

        if self.mgr.should_report() {
            Ok(Some(self.mgr.get_tm(clock, self.drive.heading_deg())))
        } else {
            Ok(None)
        }
    }

    /// End the autonomous period, leaving all equipment safe.
    pub fn stop(&mut self) {
        if let Some(ref mut vision) = self.vision {
            vision.disable();
        }

        self.drive.stop();
        self.drive.set_brake(BrakeMode::Brake);
        self.mech.deactivate();

        info!("Opmode stopped in {}", self.mgr.state());
    }

    pub fn has_vision(&self) -> bool {
        self.vision.is_some()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        auto::auto_mgr::{AutoMgrParams, AutoState, Route, RouteSource},
        clock::ManualClock,
        eqpt::mock::{MockDrive, MockMech},
        sim::{SimMech, SimSwerve, SimSwerveInput, SimSwerveParams, SimVision},
    };
    use comms_if::eqpt::drive::DriveCmd;
    use util::module::State;

    fn op_mode(
        mgr_params: AutoMgrParams,
        params: OpModeParams,
        vision: Option<Box<dyn VisionDetector>>,
    ) -> AutoOpMode<MockDrive, MockMech> {
        AutoOpMode::new(
            params,
            AutoMgr::new(mgr_params),
            MockDrive::completing(),
            MockMech::default(),
            vision,
        )
    }

    #[test]
    fn test_shipped_params() {
        let root = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../params");

        let mgr: AutoMgrParams = util::params::load_from_path(root.join("auto_mgr.toml")).unwrap();
        let om: OpModeParams = util::params::load_from_path(root.join("op_mode.toml")).unwrap();
        let sim: SimSwerveParams =
            util::params::load_from_path(root.join("sim_swerve.toml")).unwrap();

        assert_eq!(mgr.route, Route::Primary);
        assert!(!mgr.debug.active);
        assert_eq!(om.vision, VisionParams::default());
        assert_eq!(om.init_wheel_angle, OpModeParams::default().init_wheel_angle);
        assert_eq!(sim, SimSwerveParams::default());
    }

    #[test]
    fn test_init() {
        let clock = ManualClock::new();
        let mut om = op_mode(AutoMgrParams::default(), OpModeParams::default(), None);

        om.init(&clock);

        assert!(om.drive.field_oriented);
        assert_eq!(om.mech.dems.marker_pos, MARKER_HELD_POS);
        assert_eq!(clock.elapsed_s(), 0.5);

        let dems: Vec<ModuleDems> = om
            .drive
            .cmds
            .iter()
            .filter_map(|c| match c {
                DriveCmd::Modules(d) => Some(*d),
                _ => None,
            })
            .collect();

        assert_eq!(dems.len(), 2);
        assert_eq!(dems[0].0[0], WheelDem { power: 0.02, angle: -0.3 });
        assert_eq!(dems[0].0[1], WheelDem { power: 0.02, angle: 0.3 });
        assert_eq!(dems[0].0[2], WheelDem { power: 0.02, angle: 0.3 });
        assert_eq!(dems[0].0[3], WheelDem { power: 0.02, angle: -0.3 });
        assert!(dems[1].is_unpowered());
    }

    #[test]
    fn test_vision_route() {
        let clock = ManualClock::new();
        let mgr_params = AutoMgrParams {
            route_source: RouteSource::Vision,
            ..Default::default()
        };
        let params = OpModeParams {
            use_vision: true,
            ..Default::default()
        };

        let mut om = op_mode(
            mgr_params.clone(),
            params.clone(),
            Some(Box::new(SimVision::new(Some(Route::Alternate)))),
        );
        om.init(&clock);
        om.start(&clock).unwrap();
        assert!(om.has_vision());
        assert_eq!(om.mgr.route(), Route::Alternate);

        // A missing camera falls back to the configured route
        let mut om = op_mode(
            mgr_params,
            params,
            Some(Box::new(SimVision::unavailable())),
        );
        om.init(&clock);
        om.start(&clock).unwrap();
        assert!(!om.has_vision());
        assert_eq!(om.mgr.route(), Route::Primary);
    }

    #[test]
    fn test_vision_unused_when_disabled() {
        let clock = ManualClock::new();
        let mut om = op_mode(
            AutoMgrParams::default(),
            OpModeParams::default(),
            Some(Box::new(SimVision::new(Some(Route::Alternate)))),
        );

        om.init(&clock);
        assert!(!om.has_vision());
    }

    #[test]
    fn test_loop_and_stop() {
        let clock = ManualClock::new();
        let mut om = op_mode(AutoMgrParams::default(), OpModeParams::default(), None);

        assert!(om.loop_cycle(&clock).is_err());

        om.init(&clock);
        om.start(&clock).unwrap();

        let tm = om.loop_cycle(&clock).unwrap().unwrap();
        assert_eq!(tm.state, AutoState::Slide);

        // Run to the end, after which nothing is reported
        for _ in 0..1000 {
            clock.advance(0.1);
            if om.loop_cycle(&clock).unwrap().is_none() {
                break;
            }
        }
        assert_eq!(om.mgr.state(), AutoState::Done);

        om.stop();
        assert_eq!(om.drive.last_cmd(), Some(DriveCmd::Stop));
        assert_eq!(om.drive.brake, Some(BrakeMode::Brake));
        assert!(om.mech.deactivated);
    }

    /// Run the full sequence on the simulated chassis, returning the time each state was entered.
    fn run_simulated(route: Route) -> (AutoOpMode<SimSwerve, SimMech>, Vec<(AutoState, f64)>) {
        let clock = ManualClock::new();
        let mut om = AutoOpMode::new(
            OpModeParams::default(),
            AutoMgr::new(AutoMgrParams {
                route,
                ..Default::default()
            }),
            SimSwerve::new(SimSwerveParams::default()),
            SimMech::new(),
            None,
        );

        om.init(&clock);
        om.start(&clock).unwrap();

        let dt_s = om.params.cycle_period_s;
        let mut entries = vec![(om.mgr.state(), clock.elapsed_s())];

        for _ in 0..600 {
            om.drive.proc(&SimSwerveInput { dt_s }).unwrap();
            om.mech.update(dt_s);
            om.loop_cycle(&clock).unwrap();

            if let Some(change) = om.mgr.last_change() {
                if entries.last().map(|e| e.0) != Some(change.new) {
                    entries.push((change.new, change.time_s));
                }
            }

            clock.advance(dt_s);
        }

        (om, entries)
    }

    fn entered_at(entries: &[(AutoState, f64)], state: AutoState) -> f64 {
        match entries.iter().find(|e| e.0 == state) {
            Some(e) => e.1,
            None => panic!("{} never entered", state),
        }
    }

    #[test]
    fn test_simulated_run() {
        let (om, entries) = run_simulated(Route::Primary);

        assert_eq!(om.mgr.state(), AutoState::Done);
        assert!(entries.iter().any(|e| e.0 == AutoState::PlaceMarker));
        assert!(om.mech.dems().is_marker_deployed());
        assert_eq!(om.drive.brake(), BrakeMode::Brake);
        assert_eq!(om.drive.cmd(), DriveCmd::Stop);

        // The chassis went somewhere
        let [x, y] = om.drive.position_cm();
        assert!(x.hypot(y) > 10.0);
    }

    #[test]
    fn test_simulated_wall_turn_settles() {
        let (_, entries) = run_simulated(Route::Primary);

        // The wall leg is still running when the turn stops it
        let wall_pause_s = entered_at(&entries, AutoState::WallPause);
        let to_depot_s = entered_at(&entries, AutoState::ToDepot);
        assert!(
            to_depot_s - wall_pause_s >= 2.0 - 1e-6,
            "WallPause held for {:.2} s",
            to_depot_s - wall_pause_s
        );

        // The turn runs once its full dwell has passed, the wall leg being too long to finish first
        let wall_turn_s = entered_at(&entries, AutoState::WallTurn);
        assert!(wall_pause_s - wall_turn_s >= 3.0 - 1e-6);
    }

    #[test]
    fn test_simulated_alternate_run() {
        let (om, entries) = run_simulated(Route::Alternate);

        assert_eq!(om.mgr.state(), AutoState::Done);
        assert!(entries.iter().all(|e| e.0 != AutoState::WallTurn));

        // The creep is never waited on, so the pause is kept in full
        let wall_pause_s = entered_at(&entries, AutoState::WallPause);
        let to_depot_s = entered_at(&entries, AutoState::ToDepot);
        assert!(to_depot_s - wall_pause_s >= 3.0 - 1e-6);
    }
}
