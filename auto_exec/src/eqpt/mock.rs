//! Recording equipment used by unit tests.

use comms_if::eqpt::{
    drive::{BrakeMode, DriveCmd, Leg, ModuleDems, RawDrive},
    mech::MechDems,
};

use super::{DriveActuator, MechActuator};

/// Drive which records every command it receives.
#[derive(Debug, Default)]
pub struct MockDrive {
    /// Every motion command in order, including stops.
    pub cmds: Vec<DriveCmd>,

    /// Number of `stop` calls.
    pub num_stops: usize,

    /// The `stop_on_complete` flag of every completion poll.
    pub polls: Vec<bool>,

    /// Value returned by `poll_completion`.
    pub always_complete: bool,

    /// Heading reported by `heading_deg`.
    pub heading_deg: f64,

    /// Heading change applied for each raw rotation demand, towards the rotation's direction.
    pub heading_step_deg: f64,

    pub brake: Option<BrakeMode>,

    pub field_oriented: bool,
}

/// Mechanisms which record their demands.
#[derive(Debug, Default)]
pub struct MockMech {
    pub dems: MechDems,
    pub num_encoder_resets: usize,
    pub deactivated: bool,
}

impl MockDrive {
    pub fn completing() -> Self {
        Self {
            always_complete: true,
            ..Default::default()
        }
    }

    /// All legs received, in order.
    pub fn legs(&self) -> Vec<Leg> {
        self.cmds
            .iter()
            .filter_map(|c| match c {
                DriveCmd::Vector(l) => Some(*l),
                _ => None,
            })
            .collect()
    }

    pub fn last_cmd(&self) -> Option<DriveCmd> {
        self.cmds.last().copied()
    }
}

impl DriveActuator for MockDrive {
    fn drive_vector(&mut self, leg: Leg) {
        self.cmds.push(DriveCmd::Vector(leg));
    }

    fn drive_raw(&mut self, raw: RawDrive) {
        self.cmds.push(DriveCmd::Raw(raw));

        // Negative rotate increases heading
        if raw.rotate < 0.0 {
            self.heading_deg += self.heading_step_deg;
        } else if raw.rotate > 0.0 {
            self.heading_deg -= self.heading_step_deg;
        }
    }

    fn set_modules(&mut self, dems: ModuleDems) {
        self.cmds.push(DriveCmd::Modules(dems));
    }

    fn stop(&mut self) {
        self.num_stops += 1;
        self.cmds.push(DriveCmd::Stop);
    }

    fn poll_completion(&mut self, stop_on_complete: bool) -> bool {
        self.polls.push(stop_on_complete);
        self.always_complete
    }

    fn set_field_orientation(&mut self) {
        self.field_oriented = true;
    }

    fn set_brake(&mut self, mode: BrakeMode) {
        self.brake = Some(mode);
    }

    fn heading_deg(&self) -> f64 {
        self.heading_deg
    }
}

impl MechActuator for MockMech {
    fn reset_lift_encoder(&mut self) {
        self.num_encoder_resets += 1;
    }

    fn set_lift_target(&mut self, ticks: i32) {
        self.dems.lift_target_ticks = Some(ticks);
    }

    fn set_lift_power(&mut self, power: f64) {
        self.dems.lift_power = power;
    }

    fn set_marker_pos(&mut self, pos: f64) {
        self.dems.marker_pos = pos;
    }

    fn deactivate(&mut self) {
        self.deactivated = true;
        self.dems.lift_power = 0.0;
    }
}
