//! # Autonomy states

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Every state, in declaration order.
pub const ALL_STATES: [AutoState; 21] = [
    AutoState::Init,
    AutoState::Start,
    AutoState::Drop,
    AutoState::Slide,
    AutoState::PreScan,
    AutoState::Scan,
    AutoState::ToParticles,
    AutoState::ToWall,
    AutoState::WallPause,
    AutoState::WallTurn,
    AutoState::ToDepot,
    AutoState::PlaceMarker,
    AutoState::ToPit,
    AutoState::LastMove,
    AutoState::Done,
    AutoState::TestTurnRobot,
    AutoState::TestMoveRobot,
    AutoState::TestMove1Robot,
    AutoState::TestMove2Robot,
    AutoState::TestBreakRobot,
    AutoState::Delay,
];

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Stages of the autonomous run.
///
/// `Done` is the only terminal state. The `Test*` states are only reachable as the debug entry
/// state and exercise a single leg or turn in isolation.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AutoState {
    /// Placeholder held between construction and `start`.
    Init,
    Start,
    Drop,
    Slide,
    PreScan,
    Scan,
    ToParticles,
    ToWall,
    WallPause,
    WallTurn,
    ToDepot,
    PlaceMarker,
    ToPit,
    LastMove,
    Done,
    TestTurnRobot,
    TestMoveRobot,
    TestMove1Robot,
    TestMove2Robot,
    TestBreakRobot,
    Delay,
}

/// The given name does not match any state.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Unknown autonomy state \"{0}\"")]
pub struct UnknownStateError(pub String);

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl AutoState {
    /// Short identifier of the state, as used in parameter files.
    pub fn name(&self) -> &'static str {
        match self {
            AutoState::Init => "INIT",
            AutoState::Start => "START",
            AutoState::Drop => "DROP",
            AutoState::Slide => "SLIDE",
            AutoState::PreScan => "PRE_SCAN",
            AutoState::Scan => "SCAN",
            AutoState::ToParticles => "TO_PARTICLES",
            AutoState::ToWall => "TO_WALL",
            AutoState::WallPause => "WALL_PAUSE",
            AutoState::WallTurn => "WALL_TURN",
            AutoState::ToDepot => "TO_DEPOT",
            AutoState::PlaceMarker => "PLACE_MARKER",
            AutoState::ToPit => "TO_PIT",
            AutoState::LastMove => "LAST_MOVE",
            AutoState::Done => "DONE",
            AutoState::TestTurnRobot => "TEST_TURN_ROBOT",
            AutoState::TestMoveRobot => "TEST_MOVE_ROBOT",
            AutoState::TestMove1Robot => "TEST_MOVE1_ROBOT",
            AutoState::TestMove2Robot => "TEST_MOVE2_ROBOT",
            AutoState::TestBreakRobot => "TEST_BREAK_ROBOT",
            AutoState::Delay => "DELAY",
        }
    }

    /// Operator facing description of what the robot is doing.
    pub fn description(&self) -> &'static str {
        match self {
            AutoState::Init => "Initialising",
            AutoState::Start => "Start",
            AutoState::Drop => "Drop down from lander",
            AutoState::Slide => "Slide over after drop",
            AutoState::PreScan => "Prepare to scan the minerals",
            AutoState::Scan => "Scan the minerals",
            AutoState::ToParticles => "Move to particles",
            AutoState::ToWall => "Run to the wall",
            AutoState::WallPause => "Wait for partner at the wall",
            AutoState::WallTurn => "Turn/orient at the wall",
            AutoState::ToDepot => "Head for the depot",
            AutoState::PlaceMarker => "Place the team marker",
            AutoState::ToPit => "Move into the pit",
            AutoState::LastMove => "Waiting for last move to complete",
            AutoState::Done => "All done - robot waits while stopped",
            AutoState::TestTurnRobot => "TEST - turn robot",
            AutoState::TestMoveRobot => "TEST - move robot",
            AutoState::TestMove1Robot => "TEST - move robot, first leg",
            AutoState::TestMove2Robot => "TEST - move robot, second leg",
            AutoState::TestBreakRobot => "TEST - brake robot",
            AutoState::Delay => "Hold before sliding",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, AutoState::Done)
    }
}

impl Display for AutoState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for AutoState {
    type Err = UnknownStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();

        ALL_STATES
            .iter()
            .find(|st| st.name() == upper)
            .copied()
            .ok_or_else(|| UnknownStateError(s.to_string()))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Wrapper {
        state: AutoState,
    }

    #[test]
    fn test_from_str() {
        assert_eq!("TO_WALL".parse::<AutoState>(), Ok(AutoState::ToWall));
        assert_eq!("test_move1_robot".parse::<AutoState>(), Ok(AutoState::TestMove1Robot));
        assert_eq!(
            "SIDEWAYS".parse::<AutoState>(),
            Err(UnknownStateError("SIDEWAYS".into()))
        );
    }

    #[test]
    fn test_names_match_serde() {
        // The parameter files use the serde names, which must agree with `name`
        for state in ALL_STATES.iter() {
            let w: Wrapper = toml::from_str(&format!("state = \"{}\"", state.name())).unwrap();
            assert_eq!(w.state, *state);
        }
    }

    #[test]
    fn test_only_done_is_terminal() {
        let terminal: Vec<_> = ALL_STATES.iter().filter(|s| s.is_terminal()).collect();
        assert_eq!(terminal, vec![&AutoState::Done]);
    }
}
