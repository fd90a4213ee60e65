//! # Simulated mechanisms

use comms_if::eqpt::mech::MechDems;
use log::debug;

use crate::eqpt::MechActuator;

/// Rate the lift moves at under full power.
///
/// Units: encoder ticks/second
const LIFT_RATE_TICKS_S: f64 = 1000.0;

/// Simulated lift and marker servo.
#[derive(Debug, Default)]
pub struct SimMech {
    dems: MechDems,

    /// Lift encoder position relative to the last reset.
    lift_pos_ticks: f64,
}

impl SimMech {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dems(&self) -> &MechDems {
        &self.dems
    }

    pub fn lift_pos_ticks(&self) -> f64 {
        self.lift_pos_ticks
    }

    /// Move the lift towards its target.
    pub fn update(&mut self, dt_s: f64) {
        if self.dems.is_inactive() {
            return;
        }

        let target = match self.dems.lift_target_ticks {
            Some(t) => t as f64,
            None => return,
        };

        let max_step = LIFT_RATE_TICKS_S * self.dems.lift_power.abs() * dt_s;
        let err = target - self.lift_pos_ticks;

        self.lift_pos_ticks += util::maths::clamp(err, -max_step, max_step);
    }
}

impl MechActuator for SimMech {
    fn reset_lift_encoder(&mut self) {
        self.lift_pos_ticks = 0.0;
    }

    fn set_lift_target(&mut self, ticks: i32) {
        self.dems.lift_target_ticks = Some(ticks);
    }

    fn set_lift_power(&mut self, power: f64) {
        self.dems.lift_power = power;
    }

    fn set_marker_pos(&mut self, pos: f64) {
        debug!("Sim marker servo to {:.2}", pos);
        self.dems.marker_pos = pos;
    }

    fn deactivate(&mut self) {
        self.dems.lift_power = 0.0;
        self.dems.lift_target_ticks = None;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_lift() {
        let mut mech = SimMech::new();

        mech.reset_lift_encoder();
        mech.set_lift_target(3800);
        mech.set_lift_power(1.0);

        mech.update(1.0);
        assert_eq!(mech.lift_pos_ticks(), 1000.0);

        mech.update(10.0);
        assert_eq!(mech.lift_pos_ticks(), 3800.0);

        mech.deactivate();
        assert!(mech.dems().is_inactive());
    }
}
