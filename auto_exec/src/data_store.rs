//! # Data Store

use util::{
    archive::{ArchiveError, Archived, Archiver},
    session::Session,
};

use crate::{auto::auto_mgr::tm::AutoTm, sim::SimSwerveOutput};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
#[derive(Default)]
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u64,

    /// Run time at the start of this cycle
    pub run_time_s: f64,

    // Autonomy
    pub auto_tm: Option<AutoTm>,
    arch_auto_tm: Archiver,

    // Simulation
    pub sim_output: Option<SimSwerveOutput>,
    arch_sim_output: Archiver,

    // Monitoring Counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Create the archive files in the session's archive directory.
    pub fn init_archives(&mut self, session: &Session) -> Result<(), ArchiveError> {
        self.arch_auto_tm = Archiver::from_path(session, "auto_tm.csv")?;
        self.arch_sim_output = Archiver::from_path(session, "sim_swerve.csv")?;

        Ok(())
    }

    /// Perform actions required at the start of a cycle.
    ///
    /// Clears those items that need clearing at the start of a cycle.
    pub fn cycle_start(&mut self, run_time_s: f64) {
        self.run_time_s = run_time_s;
        self.auto_tm = None;
        self.sim_output = None;
    }

    /// Record the timing of the cycle that just ended.
    pub fn cycle_end(&mut self, overran: bool) {
        if overran {
            self.num_consec_cycle_overruns += 1;
        } else {
            self.num_consec_cycle_overruns = 0;
        }

        self.num_cycles += 1;
    }
}

impl Archived for DataStore {
    fn write(&mut self) -> Result<(), ArchiveError> {
        // Archivers are only set up in a session, skip silently otherwise
        if let Some(ref tm) = self.auto_tm {
            if self.arch_auto_tm.is_init() {
                self.arch_auto_tm.serialise(tm)?;
            }
        }

        if let Some(out) = self.sim_output {
            if self.arch_sim_output.is_init() {
                self.arch_sim_output.serialise(out)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_cycle_counters() {
        let mut ds = DataStore::default();

        ds.cycle_start(0.0);
        ds.cycle_end(true);
        ds.cycle_start(0.1);
        ds.cycle_end(true);
        assert_eq!(ds.num_consec_cycle_overruns, 2);

        ds.cycle_end(false);
        assert_eq!(ds.num_consec_cycle_overruns, 0);
        assert_eq!(ds.num_cycles, 3);
    }

    #[test]
    fn test_write_without_archives() {
        let mut ds = DataStore::default();
        ds.sim_output = Some(SimSwerveOutput {
            heading_deg: 0.0,
            x_cm: 0.0,
            y_cm: 0.0,
            moving: false,
        });

        // Nothing to write to, so nothing is written
        assert!(ds.write().is_ok());
    }
}
