//! # Defines Telemetry Pack for Autonomy

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use serde::Serialize;

use super::AutoState;

// -----------------------------------------------------------------------------------------------
// STRUCTS
// -----------------------------------------------------------------------------------------------

/// Per-cycle status of the autonomy manager.
///
/// Fields are flat so the packet can be archived directly as a CSV row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AutoTm {
    /// Run time the packet was produced at.
    pub time_s: f64,

    pub state: AutoState,

    /// Time since the current state was entered.
    pub time_in_state_s: f64,

    /// Dwell requested for the current state.
    pub state_wait_ms: u64,

    /// Why the manager is waiting, empty if it is not.
    pub wait_report: String,

    pub drive_pending: bool,

    pub rotating: bool,

    /// Remaining debug transitions, `None` if debugging is off.
    pub debug_steps_remaining: Option<i64>,

    /// Number of state changes since start.
    pub num_state_changes: u64,

    pub heading_deg: f64,
}
