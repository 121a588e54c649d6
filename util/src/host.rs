//! Host platform (linux for example) utility functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::path::PathBuf;
use uname;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Retrieve uname information.
pub fn get_uname() -> std::io::Result<uname::Info> {
    uname::uname()
}

/// Get the software root directory from the `PET_SW_ROOT` environment
/// variable.
///
/// The parameter and session directories are resolved relative to this root.
pub fn get_pet_sw_root() -> Result<PathBuf, std::env::VarError> {
    std::env::var("PET_SW_ROOT").map(PathBuf::from)
}
