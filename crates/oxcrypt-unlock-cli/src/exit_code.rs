//! Exit codes for the CLI.
//!
//! Scripts can tell a cancelled cycle apart from a failure to run one.

/// Successful execution
pub const SUCCESS: u8 = 0;

/// General/unspecified error
pub const GENERAL_ERROR: u8 = 1;

/// Command-line usage error (bad arguments, malformed step)
pub const USAGE_ERROR: u8 = 2;

/// Dialog configuration could not be loaded
pub const CONFIG_ERROR: u8 = 3;

/// The simulated cycle ended without an accepted unlock
pub const CANCELLED: u8 = 8;
