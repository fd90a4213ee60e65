//! # AutoMgr module
//!
//! This module implements the [`AutoMgr`] state machine, which sequences the autonomous phase of
//! the robot. Each state performs a single action, for example starting a drive leg, and requests
//! the next state along with a dwell time which must pass before that state's action may run.
//!
//! Every cycle the manager is stepped and performs the following, in order:
//!
//! - Rotation: if a closed loop turn is in progress it is stepped, and nothing else happens until
//!   it finishes.
//! - Drive gate: if a drive leg is pending its completion is polled. A completed leg ends the
//!   current dwell early, a leg pending for longer than `max_leg_wait_s` is abandoned.
//! - Ready gate: if the dwell of the current state has not elapsed the manager reports how long
//!   it is waiting for and returns.
//! - Dispatch: the current state's action is run, which requests exactly one transition. A leg
//!   stopped by the action is cancelled, not completed, so the requested dwell is kept in full.
//!
//! Entering `Done` stops and brakes the chassis at once. A closed loop turn in progress is allowed
//! to finish first.
//!
//! For incremental testing the sequence can be truncated with [`DebugParams`], which jumps from
//! `Start` to a chosen state and forces `Done` once a number of transitions have been made.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod dispatch;
mod params;
mod state;
pub mod tm;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::drive::BrakeMode;
use log::{debug, error, info, trace, warn};
use util::time::seconds_to_millis;

pub use self::{
    dispatch::{handler_for, ActionCtx, Handler, StepAction, Transition},
    params::{AutoMgrParams, DebugParams, Route, RouteSource, UnknownRouteError},
    state::{AutoState, UnknownStateError, ALL_STATES},
    tm::AutoTm,
};
use super::orient::{Rotation, RotationStatus};
use crate::{
    clock::Clock,
    eqpt::{DriveActuator, MechActuator},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Autonomy Manager
///
/// Owns the state of the autonomous sequence. The equipment is borrowed for each step.
pub struct AutoMgr {
    /// Parameters for the AutoMgr.
    pub params: AutoMgrParams,

    ctx: EngineCtx,

    debug: DebugCtx,

    /// Route fixed at start.
    route: Route,

    /// Closed loop turn currently holding the sequence.
    rotation: Option<Rotation>,

    /// True once `Done` has been entered and the chassis has been braked.
    settled: bool,

    started: bool,

    num_state_changes: u64,

    last_change: Option<StateChange>,
}

/// Timing and drive tracking of the current state.
#[derive(Debug, Clone)]
struct EngineCtx {
    state: AutoState,

    /// Run time the current state was entered at.
    ///
    /// Units: seconds
    state_entry_s: f64,

    /// Dwell before the current state's action may run.
    ///
    /// Units: milliseconds
    state_wait_ms: u64,

    /// An autonomous leg has been started and has not yet reported completion.
    drive_pending: bool,

    /// Passed to the drive when polling for completion of the pending leg.
    drive_stop_on_complete: bool,

    /// Run time the pending leg was started at.
    ///
    /// Units: seconds
    drive_issued_s: f64,

    wait_report: String,
}

/// Debug truncation of the sequence.
#[derive(Debug, Clone, Copy)]
struct DebugCtx {
    active: bool,
    remaining_steps: i64,
    start_state: AutoState,
}

/// Record of a single state change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateChange {
    pub previous: AutoState,
    pub new: AutoState,

    /// Run time of the change.
    ///
    /// Units: seconds
    pub time_s: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors that can occur in the autonomy manager.
#[derive(Debug, thiserror::Error)]
pub enum AutoMgrError {
    #[error("Failed to load AutoMgrParams: {0:?}")]
    ParamLoadError(util::params::LoadError),

    #[error("The AutoMgr was stepped before the sequence was started")]
    NotStarted,

    #[error("The sequence has already been started, currently in {0}")]
    AlreadyStarted(AutoState),
}

/// What a single step of the manager did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome {
    /// The dwell of the current state has not elapsed.
    Waiting,

    /// A closed loop turn is in progress.
    Rotating,

    /// The action of `from` ran and requested `to`.
    Advanced { from: AutoState, to: AutoState },

    /// The terminal state's action ran.
    Held,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl AutoMgr {
    /// Create a new manager from the given parameters. The sequence must be started with
    /// [`AutoMgr::start`] before it is stepped.
    pub fn new(params: AutoMgrParams) -> Self {
        let debug = DebugCtx::from(params.debug);

        Self {
            route: params.route,
            params,
            ctx: EngineCtx::default(),
            debug,
            rotation: None,
            settled: false,
            started: false,
            num_state_changes: 0,
            last_change: None,
        }
    }

    /// Load the parameters from the given file and create a new manager.
    pub fn init(params_path: &str) -> Result<Self, AutoMgrError> {
        let params: AutoMgrParams = match util::params::load(params_path) {
            Ok(p) => p,
            Err(e) => return Err(AutoMgrError::ParamLoadError(e)),
        };

        Ok(Self::new(params))
    }

    /// Replace the debug configuration. Only allowed before the sequence is started.
    pub fn set_debug(&mut self, debug: DebugParams) -> Result<(), AutoMgrError> {
        if self.started {
            return Err(AutoMgrError::AlreadyStarted(self.ctx.state));
        }

        self.params.debug = debug;
        self.debug = DebugCtx::from(debug);

        Ok(())
    }

    /// Start the sequence.
    ///
    /// The route is fixed here. If the route source is vision `route_hint` is used, falling back
    /// to the configured route if the detector had no hint.
    pub fn start(
        &mut self,
        clock: &dyn Clock,
        route_hint: Option<Route>,
    ) -> Result<(), AutoMgrError> {
        if self.started {
            return Err(AutoMgrError::AlreadyStarted(self.ctx.state));
        }

        self.route = match (self.params.route_source, route_hint) {
            (RouteSource::Vision, Some(r)) => r,
            (RouteSource::Vision, None) => {
                warn!(
                    "No route hint from vision, using the configured {} route",
                    self.params.route
                );
                self.params.route
            }
            (RouteSource::Params, _) => self.params.route,
        };

        if self.debug.active {
            info!(
                "Debug active: entering {} with {} transition(s) allowed",
                self.debug.start_state, self.debug.remaining_steps
            );
        }
        info!("Starting autonomous sequence on the {} route", self.route);

        self.started = true;
        self.ctx = EngineCtx::default();
        self.ctx.state_entry_s = clock.elapsed_s();
        self.advance(clock, AutoState::Start, 0);

        Ok(())
    }

    /// Move to `target`, which may not act until `delay_ms` has passed.
    ///
    /// When debugging each call consumes one transition from the budget. Once the budget is spent
    /// the target is replaced by `Done`, keeping the requested delay.
    pub fn advance(&mut self, clock: &dyn Clock, target: AutoState, delay_ms: u64) {
        let target = if self.debug.consume_step() {
            if target != AutoState::Done {
                info!("Debug transition budget spent, {} replaced by Done", target);
            }
            AutoState::Done
        } else {
            target
        };

        let now_s = clock.elapsed_s();
        let previous = self.ctx.state;

        self.ctx.state_entry_s = now_s;
        self.ctx.state_wait_ms = delay_ms;
        self.ctx.state = target;

        if previous != target {
            info!(
                "AutoMgr state change to: {} ({}), wait {} ms",
                target,
                target.description(),
                delay_ms
            );

            self.num_state_changes += 1;
            self.last_change = Some(StateChange {
                previous,
                new: target,
                time_s: now_s,
            });
        }
    }

    /// Check whether the dwell of the current state has elapsed.
    ///
    /// If it has not the shortfall is written into the wait report. No timing state is changed,
    /// so this may be called any number of times.
    pub fn is_ready(&mut self, clock: &dyn Clock) -> bool {
        let elapsed_ms = seconds_to_millis(clock.elapsed_s() - self.ctx.state_entry_s);
        let wait_ms = self.ctx.state_wait_ms as f64;

        if elapsed_ms < wait_ms {
            self.ctx.wait_report = format!(
                "{}: waiting {:.0} ms",
                self.ctx.state,
                (wait_ms - elapsed_ms).ceil()
            );
            false
        } else {
            true
        }
    }

    /// Perform one cycle of the sequence.
    pub fn step(
        &mut self,
        clock: &dyn Clock,
        drive: &mut dyn DriveActuator,
        mech: &mut dyn MechActuator,
    ) -> Result<StepOutcome, AutoMgrError> {
        if !self.started {
            return Err(AutoMgrError::NotStarted);
        }

        let now_s = clock.elapsed_s();

        // ---- ROTATION ----

        if let Some(rot) = self.rotation.as_mut() {
            let status = rot.step(drive, now_s);
            let target_deg = rot.target_deg();

            match status {
                RotationStatus::InProgress => {
                    self.ctx.wait_report =
                        format!("{}: rotating to {:.1} deg", self.ctx.state, target_deg);
                    return Ok(StepOutcome::Rotating);
                }
                // A timed out rotation has already stopped the chassis and the sequence carries on
                RotationStatus::Converged | RotationStatus::TimedOut => self.rotation = None,
            }
        }

        // Done entered while turning is only settled once the turn has ended
        self.settle_if_done(drive);

        // ---- DRIVE GATE ----

        if self.ctx.drive_pending {
            if drive.poll_completion(self.ctx.drive_stop_on_complete) {
                debug!("Drive leg complete in {}", self.ctx.state);
                self.ctx.drive_pending = false;
                self.ctx.state_wait_ms = 0;
            } else if now_s - self.ctx.drive_issued_s > self.params.max_leg_wait_s {
                warn!(
                    "Drive leg did not complete within {:.1} s, stopping the chassis",
                    self.params.max_leg_wait_s
                );
                drive.stop();
                self.ctx.drive_pending = false;
            }
        }

        // ---- READY GATE ----

        if !self.is_ready(clock) {
            trace!("{}", self.ctx.wait_report);
            return Ok(StepOutcome::Waiting);
        }

        self.ctx.wait_report.clear();

        // ---- DISPATCH ----

        let from = self.ctx.state;
        let debug_start = if self.debug.active {
            Some(self.debug.start_state)
        } else {
            None
        };

        let (action, leg, stopped, rotation_deg) = {
            let mut action_ctx = ActionCtx::new(drive, mech, self.route, debug_start);

            let action = match handler_for(from) {
                Some(handler) => handler(&mut action_ctx),
                None => {
                    error!("No action is defined for {}, ending the sequence", from);
                    StepAction::advance(AutoState::Done, 0)
                }
            };

            (
                action,
                action_ctx.started_leg(),
                action_ctx.stopped_drive(),
                action_ctx.requested_rotation(),
            )
        };

        if let Some(stop_on_complete) = leg {
            self.ctx.drive_pending = true;
            self.ctx.drive_stop_on_complete = stop_on_complete;
            self.ctx.drive_issued_s = now_s;
        } else if stopped && self.ctx.drive_pending {
            debug!("Drive leg cancelled by {}", from);
            self.ctx.drive_pending = false;
        }

        if let Some(target_deg) = rotation_deg {
            info!("Beginning rotation to {:.1} deg", target_deg);
            self.rotation = Some(Rotation::new(target_deg, now_s, self.params.orient));
        }

        match action {
            StepAction::Advance(t) => {
                self.advance(clock, t.target, t.delay_ms);
                self.settle_if_done(drive);
                Ok(StepOutcome::Advanced {
                    from,
                    to: self.ctx.state,
                })
            }
            StepAction::Hold => {
                self.settle_if_done(drive);
                Ok(StepOutcome::Held)
            }
        }
    }

    /// Stop and brake the chassis as soon as the terminal state is reached, unless a closed loop
    /// turn still has to finish.
    fn settle_if_done(&mut self, drive: &mut dyn DriveActuator) {
        if self.ctx.state.is_terminal() && !self.settled && self.rotation.is_none() {
            self.settle(drive);
        }
    }

    /// Leave the chassis stopped and braked, abandoning anything still in flight.
    fn settle(&mut self, drive: &mut dyn DriveActuator) {
        drive.stop();
        drive.set_brake(BrakeMode::Brake);

        self.ctx.drive_pending = false;
        self.rotation = None;
        self.settled = true;

        info!("Autonomous sequence done, chassis stopped and braked");
    }

    /// Build the telemetry packet for the current cycle.
    pub fn get_tm(&self, clock: &dyn Clock, heading_deg: f64) -> AutoTm {
        let time_s = clock.elapsed_s();

        AutoTm {
            time_s,
            state: self.ctx.state,
            time_in_state_s: time_s - self.ctx.state_entry_s,
            state_wait_ms: self.ctx.state_wait_ms,
            wait_report: self.ctx.wait_report.clone(),
            drive_pending: self.ctx.drive_pending,
            rotating: self.rotation.is_some(),
            debug_steps_remaining: self.debug_steps_remaining(),
            num_state_changes: self.num_state_changes,
            heading_deg,
        }
    }

    /// Telemetry is only worth reporting while the sequence is running, or always when debugging.
    pub fn should_report(&self) -> bool {
        self.debug.active || !self.ctx.state.is_terminal()
    }

    pub fn state(&self) -> AutoState {
        self.ctx.state
    }

    pub fn route(&self) -> Route {
        self.route
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_drive_pending(&self) -> bool {
        self.ctx.drive_pending
    }

    pub fn is_rotating(&self) -> bool {
        self.rotation.is_some()
    }

    pub fn wait_report(&self) -> &str {
        &self.ctx.wait_report
    }

    pub fn num_state_changes(&self) -> u64 {
        self.num_state_changes
    }

    pub fn last_change(&self) -> Option<StateChange> {
        self.last_change
    }

    pub fn debug_steps_remaining(&self) -> Option<i64> {
        if self.debug.active {
            Some(self.debug.remaining_steps)
        } else {
            None
        }
    }
}

impl Default for EngineCtx {
    fn default() -> Self {
        Self {
            state: AutoState::Init,
            state_entry_s: 0.0,
            state_wait_ms: 0,
            drive_pending: false,
            drive_stop_on_complete: false,
            drive_issued_s: 0.0,
            wait_report: String::new(),
        }
    }
}

impl DebugCtx {
    /// Consume one transition, returning true if the budget was already spent.
    ///
    /// The remaining count is tested before it is decremented.
    fn consume_step(&mut self) -> bool {
        if !self.active {
            return false;
        }

        let before = self.remaining_steps;
        self.remaining_steps -= 1;

        before < 1
    }
}

impl From<DebugParams> for DebugCtx {
    fn from(p: DebugParams) -> Self {
        Self {
            active: p.active,
            remaining_steps: p.steps,
            start_state: p.start_state,
        }
    }
}
