//! Presentation settings for the unlock dialog.
//!
//! Settings live in `unlock-dialog.toml` inside the OxCrypt config directory
//! (`~/.config/oxcrypt/` on Linux, `~/Library/Application Support/com.oxidized.oxcrypt/`
//! on macOS). `OXCRYPT_CONFIG_DIR` overrides the directory. Every field is
//! optional.
//!
//! # Example configuration
//!
//! ```toml
//! title = "Unlock Vault - OxCrypt"
//! min_width = 700
//! stays_on_top = true
//! modality = "application"
//!
//! [tab_bar]
//! auto_hide = true
//! expanding = false
//!
//! [shortcuts]
//! previous_tab = "Ctrl+PageUp"
//! next_tab = "Ctrl+PageDown"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::shortcuts::{KeyChord, TabShortcuts};

/// File name of the dialog settings inside the config directory
pub const CONFIG_FILE_NAME: &str = "unlock-dialog.toml";

/// Environment variable overriding the config directory
pub const CONFIG_DIR_ENV: &str = "OXCRYPT_CONFIG_DIR";

/// Which windows the dialog blocks while shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    /// Block every window of the application
    #[default]
    Application,
    /// Block only the parent window
    Window,
}

/// Tab strip behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TabBarConfig {
    /// Hide the strip while fewer than two vaults are pending
    pub auto_hide: bool,
    /// Stretch tabs to fill the dialog width
    pub expanding: bool,
}

impl Default for TabBarConfig {
    fn default() -> Self {
        Self {
            auto_hide: true,
            expanding: false,
        }
    }
}

/// Tab-cycling shortcuts as they appear in the config file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShortcutConfig {
    pub previous_tab: KeyChord,
    pub next_tab: KeyChord,
}

impl Default for ShortcutConfig {
    fn default() -> Self {
        let defaults = TabShortcuts::default();
        Self {
            previous_tab: defaults.previous,
            next_tab: defaults.next,
        }
    }
}

impl From<ShortcutConfig> for TabShortcuts {
    fn from(config: ShortcutConfig) -> Self {
        TabShortcuts {
            previous: config.previous_tab,
            next: config.next_tab,
        }
    }
}

/// Settings for the unlock dialog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogConfig {
    /// Window title
    pub title: String,
    /// Minimum dialog width in logical pixels
    pub min_width: u32,
    /// Keep the dialog above other windows
    pub stays_on_top: bool,
    pub modality: Modality,
    pub tab_bar: TabBarConfig,
    pub shortcuts: ShortcutConfig,
}

impl Default for DialogConfig {
    fn default() -> Self {
        Self {
            title: "Unlock Vault - OxCrypt".to_string(),
            min_width: 700,
            stays_on_top: true,
            modality: Modality::default(),
            tab_bar: TabBarConfig::default(),
            shortcuts: ShortcutConfig::default(),
        }
    }
}

impl DialogConfig {
    /// Load settings from `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No dialog config, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content).map_err(|err| match err {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Load settings from the default location
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_path()?)
    }

    /// Parse settings from TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: DialogConfig = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Render the settings as TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject settings the dialog cannot honour
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.shortcuts.previous_tab == self.shortcuts.next_tab {
            return Err(ConfigError::ConflictingShortcuts(
                self.shortcuts.next_tab.to_string(),
            ));
        }
        Ok(())
    }

    pub fn tab_shortcuts(&self) -> TabShortcuts {
        self.shortcuts.into()
    }
}

/// Directory holding OxCrypt configuration files.
///
/// Honours `OXCRYPT_CONFIG_DIR`, otherwise uses the platform config dir.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }

    let base_dirs = directories::BaseDirs::new().ok_or(ConfigError::NoConfigDir)?;

    #[cfg(target_os = "macos")]
    {
        Ok(base_dirs
            .config_dir()
            .join("com.oxidized.oxcrypt"))
    }

    #[cfg(not(target_os = "macos"))]
    {
        Ok(base_dirs.config_dir().join("oxcrypt"))
    }
}

/// Path of the dialog settings file
pub fn config_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shortcuts::Key;

    #[test]
    fn test_defaults() {
        let config = DialogConfig::default();
        assert_eq!(config.min_width, 700);
        assert!(config.stays_on_top);
        assert_eq!(config.modality, Modality::Application);
        assert!(config.tab_bar.auto_hide);
        assert!(!config.tab_bar.expanding);
        assert_eq!(config.tab_shortcuts(), TabShortcuts::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let config = DialogConfig::from_toml(
            r#"
            title = "Unlock"

            [shortcuts]
            next_tab = "Ctrl+Tab"
            "#,
        )
        .unwrap();

        assert_eq!(config.title, "Unlock");
        assert_eq!(config.min_width, 700);
        assert_eq!(config.shortcuts.next_tab, KeyChord::ctrl(Key::Tab));
        assert_eq!(config.shortcuts.previous_tab, KeyChord::ctrl(Key::PageUp));
    }

    #[test]
    fn test_invalid_shortcut_is_parse_error() {
        let err = DialogConfig::from_toml("[shortcuts]\nnext_tab = \"Ctrl+Nope\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_conflicting_shortcuts_rejected() {
        let err = DialogConfig::from_toml(
            "[shortcuts]\nprevious_tab = \"Ctrl+Tab\"\nnext_tab = \"ctrl+tab\"",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::ConflictingShortcuts(ref chord) if chord == "Ctrl+Tab"));
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = DialogConfig::default();
        config.modality = Modality::Window;
        config.tab_bar.expanding = true;

        let loaded = DialogConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_plus_key_survives_save_and_load() {
        let config = DialogConfig::from_toml("[shortcuts]\nprevious_tab = \"++\"\n").unwrap();
        let written = config.to_toml().unwrap();
        assert!(written.contains(r#"previous_tab = "+""#));

        let reloaded = DialogConfig::from_toml(&written).unwrap();
        assert_eq!(reloaded, config);
        assert_eq!(reloaded.shortcuts.previous_tab.key, Key::Char('+'));
    }

    #[test]
    fn test_load_from_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = DialogConfig::load_from(&dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(config, DialogConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "min_width = 520\nstays_on_top = false\n").unwrap();

        let config = DialogConfig::load_from(&path).unwrap();
        assert_eq!(config.min_width, 520);
        assert!(!config.stays_on_top);
    }

    #[test]
    fn test_load_from_reports_path_on_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "min_width = \"wide\"").unwrap();

        match DialogConfig::load_from(&path).unwrap_err() {
            ConfigError::Parse { path: reported, .. } => assert_eq!(reported, path),
            other => panic!("expected parse error, got {other:?}"),
        }
    }
}
