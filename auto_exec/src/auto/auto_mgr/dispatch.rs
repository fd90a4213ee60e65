//! # Transition table
//!
//! Maps each [`AutoState`] to the action performed once its dwell time has elapsed. Every action
//! returns exactly one [`StepAction`], which for every state except `Done` is a transition.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::{
    drive::{Leg, ModuleDems, RawDrive, WheelDem},
    mech::MARKER_DEPLOYED_POS,
};
use log::error;

use super::{AutoState, Route};
use crate::eqpt::{DriveActuator, MechActuator};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Strafe away from the lander.
pub const SLIDE_LEG: Leg = Leg::new(0.7, 85.0, 0.0, 15.0);

/// Forward towards the sampling particles.
pub const TO_PARTICLES_LEG: Leg = Leg::new(0.3, 0.0, 0.0, 30.0);

/// Long diagonal to the wall on the primary route.
pub const TO_WALL_LEG: Leg = Leg::new(0.4, 275.0, 45.0, 212.0);

/// Creep towards the wall on the alternate route.
pub const TO_WALL_CREEP: RawDrive = RawDrive::new(-0.6, 0.4, 0.35);

pub const TO_DEPOT_LEG: Leg = Leg::new(0.60, 225.0, 45.0, 100.0);

pub const TO_PIT_LEG: Leg = Leg::new(0.70, 45.0, 47.0, 195.0);

pub const TEST_MOVE_LEG: Leg = Leg::new(0.6, 90.0, 20.0, 120.0);

pub const TEST_MOVE1_LEG: Leg = Leg::new(0.4, 90.0, 0.0, 60.0);

pub const TEST_MOVE2_LEG: Leg = Leg::new(0.4, 180.0, 0.0, 60.0);

/// Heading the turn test rotates to.
pub const TEST_TURN_HEADING_DEG: f64 = 90.0;

/// Lift position lowering the robot to the floor.
///
/// Units: encoder ticks
pub const LIFT_DROP_TICKS: i32 = 3800;

pub const LIFT_DROP_POWER: f64 = 1.0;

/// Module angle held while lowering.
pub const DROP_MODULE_ANGLE: f64 = 0.7;

// ------------------------------------------------------------------------------------------------
// TYPES
// ------------------------------------------------------------------------------------------------

/// An action performed on entry to a state.
pub type Handler = fn(&mut ActionCtx<'_>) -> StepAction;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A request to move to `target`, which may not act until `delay_ms` has passed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub target: AutoState,
    pub delay_ms: u64,
}

/// Everything an action may touch.
pub struct ActionCtx<'a> {
    pub drive: &'a mut dyn DriveActuator,
    pub mech: &'a mut dyn MechActuator,

    /// Route fixed at start.
    pub route: Route,

    /// Debug entry state, `None` when not debugging.
    pub debug_start: Option<AutoState>,

    leg_stop_on_complete: Option<bool>,
    rotation_target_deg: Option<f64>,
    stopped: bool,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepAction {
    /// Stay in the current state without restarting its dwell. Only `Done` holds.
    Hold,

    /// Move to a new state.
    Advance(Transition),
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Get the action for a state, or `None` if the state has no action.
pub fn handler_for(state: AutoState) -> Option<Handler> {
    match state {
        AutoState::Init => Some(init),
        AutoState::Start => Some(start),
        AutoState::Drop => Some(drop_from_lander),
        AutoState::Delay => Some(delay),
        AutoState::Slide => Some(slide),
        AutoState::ToParticles => Some(to_particles),
        AutoState::ToWall => Some(to_wall),
        AutoState::WallTurn => Some(wall_turn),
        AutoState::WallPause => Some(wall_pause),
        AutoState::ToDepot => Some(to_depot),
        AutoState::PlaceMarker => Some(place_marker),
        AutoState::ToPit => Some(to_pit),
        AutoState::LastMove => Some(last_move),
        AutoState::Done => Some(done),
        AutoState::TestTurnRobot => Some(test_turn_robot),
        AutoState::TestMoveRobot => Some(test_move_robot),
        AutoState::TestMove1Robot => Some(test_move1_robot),
        AutoState::TestMove2Robot => Some(test_move2_robot),
        AutoState::PreScan | AutoState::Scan | AutoState::TestBreakRobot => None,
    }
}

// ---- ACTIONS ----

/// Only reachable if something re-enters the pre-run placeholder.
fn init(_ctx: &mut ActionCtx) -> StepAction {
    error!("AutoMgr stepped while in {}, restarting the sequence", AutoState::Init);
    StepAction::advance(AutoState::Start, 0)
}

fn start(ctx: &mut ActionCtx) -> StepAction {
    match ctx.debug_start {
        Some(s) => StepAction::advance(s, 0),
        None => StepAction::advance(AutoState::Slide, 0),
    }
}

/// Lower the robot from the lander with the wheels turned ready to roll off.
fn drop_from_lander(ctx: &mut ActionCtx) -> StepAction {
    ctx.mech.reset_lift_encoder();
    ctx.mech.set_lift_target(LIFT_DROP_TICKS);
    ctx.mech.set_lift_power(LIFT_DROP_POWER);

    ctx.drive.set_modules(ModuleDems::uniform(WheelDem {
        power: 0.0,
        angle: DROP_MODULE_ANGLE,
    }));

    StepAction::advance(AutoState::ToParticles, 8500)
}

fn delay(_ctx: &mut ActionCtx) -> StepAction {
    StepAction::advance(AutoState::Slide, 0)
}

fn slide(ctx: &mut ActionCtx) -> StepAction {
    ctx.start_leg(SLIDE_LEG, false);
    StepAction::advance(AutoState::ToParticles, 500)
}

fn to_particles(ctx: &mut ActionCtx) -> StepAction {
    ctx.start_leg(TO_PARTICLES_LEG, false);
    StepAction::advance(AutoState::ToWall, 2000)
}

fn to_wall(ctx: &mut ActionCtx) -> StepAction {
    match ctx.route {
        Route::Primary => {
            ctx.start_leg(TO_WALL_LEG, true);
            StepAction::advance(AutoState::WallTurn, 3000)
        }
        Route::Alternate => {
            ctx.drive.drive_raw(TO_WALL_CREEP);
            StepAction::advance(AutoState::WallPause, 3000)
        }
    }
}

fn wall_turn(ctx: &mut ActionCtx) -> StepAction {
    ctx.stop();
    StepAction::advance(AutoState::WallPause, 2000)
}

fn wall_pause(ctx: &mut ActionCtx) -> StepAction {
    ctx.stop();
    StepAction::advance(AutoState::ToDepot, 300)
}

fn to_depot(ctx: &mut ActionCtx) -> StepAction {
    ctx.start_leg(TO_DEPOT_LEG, true);
    StepAction::advance(AutoState::PlaceMarker, 4000)
}

fn place_marker(ctx: &mut ActionCtx) -> StepAction {
    ctx.stop();
    ctx.mech.set_marker_pos(MARKER_DEPLOYED_POS);
    StepAction::advance(AutoState::ToPit, 1000)
}

fn to_pit(ctx: &mut ActionCtx) -> StepAction {
    ctx.start_leg(TO_PIT_LEG, true);
    StepAction::advance(AutoState::LastMove, 10000)
}

/// Gives the final leg time to finish while still reporting the wait.
fn last_move(ctx: &mut ActionCtx) -> StepAction {
    ctx.stop();
    StepAction::advance(AutoState::Done, 10)
}

fn done(ctx: &mut ActionCtx) -> StepAction {
    ctx.stop();
    StepAction::Hold
}

fn test_turn_robot(ctx: &mut ActionCtx) -> StepAction {
    ctx.begin_rotation(TEST_TURN_HEADING_DEG);
    StepAction::advance(AutoState::Done, 0)
}

fn test_move_robot(ctx: &mut ActionCtx) -> StepAction {
    ctx.start_leg(TEST_MOVE_LEG, true);
    StepAction::advance(AutoState::Done, 4000)
}

fn test_move1_robot(ctx: &mut ActionCtx) -> StepAction {
    ctx.start_leg(TEST_MOVE1_LEG, true);
    StepAction::advance(AutoState::TestMove2Robot, 4000)
}

fn test_move2_robot(ctx: &mut ActionCtx) -> StepAction {
    ctx.start_leg(TEST_MOVE2_LEG, true);
    StepAction::advance(AutoState::Done, 4000)
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl StepAction {
    pub fn advance(target: AutoState, delay_ms: u64) -> Self {
        StepAction::Advance(Transition { target, delay_ms })
    }
}

impl<'a> ActionCtx<'a> {
    pub fn new(
        drive: &'a mut dyn DriveActuator,
        mech: &'a mut dyn MechActuator,
        route: Route,
        debug_start: Option<AutoState>,
    ) -> Self {
        Self {
            drive,
            mech,
            route,
            debug_start,
            leg_stop_on_complete: None,
            rotation_target_deg: None,
            stopped: false,
        }
    }

    /// Command an autonomous leg whose completion the manager will wait on.
    pub fn start_leg(&mut self, leg: Leg, stop_on_complete: bool) {
        self.drive.drive_vector(leg);
        self.leg_stop_on_complete = Some(stop_on_complete);
    }

    /// Stop the chassis, cancelling any leg still in flight. A cancelled leg never counts as
    /// complete, so it cannot cut short the dwell the action requests.
    pub fn stop(&mut self) {
        self.drive.stop();
        self.stopped = true;
    }

    /// Request a closed loop turn, held by the manager until it converges or times out.
    pub fn begin_rotation(&mut self, target_deg: f64) {
        self.rotation_target_deg = Some(target_deg);
    }

    /// The stop-on-complete flag of the leg started by the action, if one was.
    pub fn started_leg(&self) -> Option<bool> {
        self.leg_stop_on_complete
    }

    /// True if the action stopped the chassis.
    pub fn stopped_drive(&self) -> bool {
        self.stopped
    }

    /// The heading of the turn requested by the action, if one was.
    pub fn requested_rotation(&self) -> Option<f64> {
        self.rotation_target_deg
    }
}
