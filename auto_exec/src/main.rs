//! Main autonomy executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise the session, logging and parameters
//!     - Initialise the opmode and its equipment
//!     - Opmode init, then start
//!     - Main loop, until the autonomous period is over:
//!         - Simulated equipment processing
//!         - Autonomy processing
//!         - Telemetry and archiving
//!     - Opmode stop
//!
//! The equipment is simulated. With `--fast` the run uses a manual clock and completes as quickly
//! as the host allows, otherwise it runs in real time.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Result};
use log::{debug, info, trace, warn};
use structopt::StructOpt;

// Internal
use auto_lib::{
    auto::{
        auto_mgr::{AutoState, DebugParams, Route, RouteSource},
        AutoMgr,
    },
    clock::{Clock, ManualClock, RunClock},
    data_store::DataStore,
    eqpt::VisionDetector,
    op_mode::{AutoOpMode, OpModeParams},
    sim::{SimMech, SimSwerve, SimSwerveInput, SimSwerveParams, SimVision},
};
use util::{
    archive::Archived,
    logger::{logger_init, LevelFilter},
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

/// Run the autonomous period against the simulated robot.
#[derive(Debug, StructOpt)]
#[structopt(name = "auto_exec")]
struct Opt {
    /// Run on a manual clock as fast as possible rather than in real time.
    #[structopt(short, long)]
    fast: bool,

    /// Override the configured route, "primary" or "alternate".
    #[structopt(long)]
    route: Option<Route>,

    /// Route reported by the simulated vision detector.
    #[structopt(long)]
    vision_hint: Option<Route>,

    /// Enable debug truncation, allowing this many transitions.
    #[structopt(long)]
    debug_steps: Option<i64>,

    /// State entered from START when debugging, e.g. TEST_MOVE_ROBOT.
    #[structopt(long)]
    debug_start: Option<AutoState>,

    /// Length of the autonomous period in seconds.
    #[structopt(long, default_value = "30")]
    run_time_s: f64,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<()> {
    let opt = Opt::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("auto_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger, keeping the simulation quiet
    logger_init(LevelFilter::Trace, &["auto_lib::sim"], &session)
        .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Swerve Autonomous Executable\n");
    info!("Session directory: {:?}\n", session.session_root);
    debug!("CLI options: {:?}", opt);

    // ---- LOAD PARAMETERS ----

    let op_mode_params: OpModeParams =
        util::params::load("op_mode.toml").wrap_err("Could not load opmode params")?;
    let sim_params: SimSwerveParams =
        util::params::load("sim_swerve.toml").wrap_err("Could not load sim params")?;

    let mut auto_mgr = AutoMgr::init("auto_mgr.toml").wrap_err("Failed to initialise AutoMgr")?;

    if let Some(route) = opt.route {
        info!("Route overridden to {}", route);
        auto_mgr.params.route = route;
        auto_mgr.params.route_source = RouteSource::Params;
    }

    if opt.debug_steps.is_some() || opt.debug_start.is_some() {
        let defaults = auto_mgr.params.debug;
        auto_mgr
            .set_debug(DebugParams {
                active: true,
                steps: opt.debug_steps.unwrap_or(defaults.steps),
                start_state: opt.debug_start.unwrap_or(defaults.start_state),
            })
            .wrap_err("Could not apply the debug options")?;
    }

    info!("Exec parameters loaded");

    // ---- INITIALISE DATASTORE ----

    let mut ds = DataStore::default();
    ds.init_archives(&session)
        .wrap_err("Failed to initialise the archives")?;

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let mut drive = SimSwerve::new(SimSwerveParams::default());
    drive
        .init(sim_params)
        .wrap_err("Failed to initialise SimSwerve")?;
    info!("SimSwerve init complete");

    let vision: Option<Box<dyn VisionDetector>> = Some(Box::new(SimVision::new(opt.vision_hint)));

    let cycle_period_s = op_mode_params.cycle_period_s;
    let mut op_mode = AutoOpMode::new(op_mode_params, auto_mgr, drive, SimMech::new(), vision);

    let clock: Box<dyn Clock> = if opt.fast {
        info!("Fast mode, using a manual clock");
        Box::new(ManualClock::new())
    } else {
        Box::new(RunClock::new())
    };

    op_mode.init(clock.as_ref());

    info!("Module initialisation complete\n");

    // ---- START ----

    op_mode
        .start(clock.as_ref())
        .wrap_err("Failed to start the autonomous sequence")?;

    let start_s = clock.elapsed_s();
    let mut last_cycle_s = start_s - cycle_period_s;

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    loop {
        // Get cycle start time
        let cycle_start_s = clock.elapsed_s();

        // Clear items that need wiping at the start of the cycle
        ds.cycle_start(cycle_start_s - start_s);

        // ---- SIMULATION PROCESSING ----

        let dt_s = cycle_start_s - last_cycle_s;
        last_cycle_s = cycle_start_s;

        match op_mode.drive.proc(&SimSwerveInput { dt_s }) {
            Ok((output, _)) => ds.sim_output = Some(output),
            Err(e) => warn!("SimSwerve error: {}", e),
        }
        op_mode.mech.update(dt_s);

        // ---- AUTONOMY PROCESSING ----

        ds.auto_tm = op_mode
            .loop_cycle(clock.as_ref())
            .wrap_err("Error stepping the autonomous opmode")?;

        // ---- TELEMETRY ----

        if let Some(ref tm) = ds.auto_tm {
            match serde_json::to_string(tm) {
                Ok(s) => trace!("AutoTm: {}", s),
                Err(e) => warn!("Could not serialise AutoTm: {}", e),
            }
        }

        if let Err(e) = ds.write() {
            warn!("Could not archive cycle data: {}", e);
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur_s = clock.elapsed_s() - cycle_start_s;

        // Get sleep duration
        if cycle_dur_s < cycle_period_s {
            ds.cycle_end(false);
            clock.sleep(cycle_period_s - cycle_dur_s);
        } else {
            warn!("Cycle overran by {:.06} s", cycle_dur_s - cycle_period_s);
            ds.cycle_end(true);
        }

        if ds.run_time_s >= opt.run_time_s {
            info!("End of the autonomous period reached, stopping");
            break;
        }
    }

    // ---- SHUTDOWN ----

    op_mode.stop();

    info!(
        "Executed {} cycles, finished in {}",
        ds.num_cycles,
        op_mode.mgr.state()
    );

    Ok(())
}
