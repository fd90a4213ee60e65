//! # Communications interface crate.
//!
//! Provides the common interface types passed between the autonomy executive and the equipment
//! it commands (the swerve chassis, the lift and marker mechanisms, and the vision detector).

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Command and response definitions for equipment (like the drive and mechanisms)
pub mod eqpt;
