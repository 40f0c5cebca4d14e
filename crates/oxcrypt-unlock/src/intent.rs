//! Purpose of an unlock cycle

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Why the dialog is being shown.
///
/// The intent is set by the host before a cycle starts and only read while
/// the cycle runs. It decides where the unlocked result is delivered:
/// - [`Intent::Merge`] delivers to the vault that was last selected, and the
///   host's own active vault is left untouched.
/// - Any other intent delivers to the vault under the current tab, and the
///   host is asked to make that vault its active one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    /// No intent recorded (the idle state between cycles)
    #[default]
    None,
    /// Plain unlock of the selected vault
    Open,
    /// Unlock a vault so its contents can be merged into another
    Merge,
}

impl Intent {
    /// Get all intents, in declaration order
    pub fn all() -> &'static [Intent] {
        &[Intent::None, Intent::Open, Intent::Merge]
    }

    /// Lowercase name used in config files and on the command line
    pub fn as_str(self) -> &'static str {
        match self {
            Intent::None => "none",
            Intent::Open => "open",
            Intent::Merge => "merge",
        }
    }

    pub fn is_merge(self) -> bool {
        matches!(self, Intent::Merge)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Intent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Intent::None),
            "open" => Ok(Intent::Open),
            "merge" => Ok(Intent::Merge),
            other => Err(format!(
                "unknown intent '{other}' (expected one of: none, open, merge)"
            )),
        }
    }
}
