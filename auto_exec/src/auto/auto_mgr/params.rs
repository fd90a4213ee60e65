//! # AutoMgr Parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{fmt::Display, str::FromStr};

use serde::Deserialize;

use super::AutoState;
use crate::auto::orient::OrientParams;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct AutoMgrParams {
    /// Route taken from the particles to the wall, unless the vision hint overrides it.
    pub route: Route,

    /// Where the route is decided.
    pub route_source: RouteSource,

    /// Longest time a leg may be waited on before the drive is stopped and the leg abandoned.
    ///
    /// Units: seconds
    pub max_leg_wait_s: f64,

    /// Debug truncation of the sequence.
    pub debug: DebugParams,

    /// Tuning of the closed loop turn.
    pub orient: OrientParams,
}

/// Debug configuration, applied before the run starts.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct DebugParams {
    /// If true the run jumps to `start_state` and is truncated after `steps` transitions.
    pub active: bool,

    /// Number of transitions allowed before the run is forced to `Done`.
    pub steps: i64,

    /// State entered from `Start` when debugging.
    pub start_state: AutoState,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// The two alternative leg sequences from the particles to the wall.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    /// Long diagonal leg to the wall, followed by a settle at the wall.
    Primary,

    /// Fixed raw creep towards the wall, straight into the wall pause.
    Alternate,
}

/// Source of the route decision.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteSource {
    /// Use [`AutoMgrParams::route`].
    Params,

    /// Use the vision detector's hint at start, falling back to [`AutoMgrParams::route`].
    Vision,
}

/// The given name is not a route.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Unknown route \"{0}\", expected \"primary\" or \"alternate\"")]
pub struct UnknownRouteError(pub String);

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for AutoMgrParams {
    fn default() -> Self {
        Self {
            route: Route::Primary,
            route_source: RouteSource::Params,
            max_leg_wait_s: 15.0,
            debug: DebugParams::default(),
            orient: OrientParams::default(),
        }
    }
}

impl Default for DebugParams {
    fn default() -> Self {
        Self {
            active: false,
            steps: 1,
            start_state: AutoState::Done,
        }
    }
}

impl FromStr for Route {
    type Err = UnknownRouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "primary" => Ok(Route::Primary),
            "alternate" => Ok(Route::Alternate),
            _ => Err(UnknownRouteError(s.to_string())),
        }
    }
}

impl Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Route::Primary => write!(f, "primary"),
            Route::Alternate => write!(f, "alternate"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_deserialise() {
        let p: AutoMgrParams = toml::from_str(
            r#"
            route = "alternate"
            route_source = "vision"
            max_leg_wait_s = 12.5

            [debug]
            active = true
            steps = 3
            start_state = "TEST_MOVE1_ROBOT"

            [orient]
            tolerance_deg = 5.0
            coarse_threshold_deg = 90.0
            coarse_rate = 0.2
            fine_rate = 0.1
            timeout_s = 10.0
            poll_period_s = 0.01
            "#,
        )
        .unwrap();

        assert_eq!(p.route, Route::Alternate);
        assert_eq!(p.route_source, RouteSource::Vision);
        assert!(p.debug.active);
        assert_eq!(p.debug.steps, 3);
        assert_eq!(p.debug.start_state, AutoState::TestMove1Robot);
        assert_eq!(p.orient.timeout_s, 10.0);
    }

    #[test]
    fn test_route_from_str() {
        assert_eq!("Primary".parse::<Route>(), Ok(Route::Primary));
        assert_eq!("alternate".parse::<Route>(), Ok(Route::Alternate));
        assert!("left".parse::<Route>().is_err());
    }
}
