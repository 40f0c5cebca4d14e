//! Error types for the unlock dialog crate
//!
//! Coordinator operations never fail: invalid-but-reachable input (an
//! out-of-range tab, cycling with fewer than two tabs) is a silent no-op.
//! The only fallible surface is loading presentation settings and parsing
//! keyboard shortcuts.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced when parsing a key chord such as `Ctrl+PageDown`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShortcutError {
    #[error("shortcut is empty")]
    Empty,
    #[error("unknown modifier '{0}'")]
    UnknownModifier(String),
    #[error("unknown key '{0}'")]
    UnknownKey(String),
    #[error("shortcut '{0}' has modifiers but no key")]
    MissingKey(String),
}

/// Errors that can occur while loading dialog configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Failed to find config directory")]
    NoConfigDir,
    #[error("Invalid shortcut: {0}")]
    Shortcut(#[from] ShortcutError),
    #[error("Previous-tab and next-tab shortcuts are both bound to '{0}'")]
    ConflictingShortcuts(String),
}
