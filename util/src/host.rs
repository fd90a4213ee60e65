//! Host platform utility functions

use std::{env, path::PathBuf};

/// Environment variable pointing at the root of the software checkout.
///
/// Parameter files are loaded from `$AUTO_SW_ROOT/params` and sessions are created under
/// `$AUTO_SW_ROOT/sessions`.
pub const SW_ROOT_ENV_VAR: &str = "AUTO_SW_ROOT";

/// Get the software root directory from the environment.
pub fn get_sw_root() -> Result<PathBuf, env::VarError> {
    env::var(SW_ROOT_ENV_VAR).map(PathBuf::from)
}
