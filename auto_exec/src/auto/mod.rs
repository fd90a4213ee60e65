//! # Autonomy Module
//!
//! This module provides the autonomous period of the robot: a timed sequence of drive legs and
//! mechanism actions, and a closed loop turn to a heading.

pub use auto_mgr::AutoMgr;

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Automation Manager module
pub mod auto_mgr;

/// Orientation correction - turns the chassis on the spot to a heading
pub mod orient;
