//! Headless coordinator for the multi-vault unlock dialog.
//!
//! A single dialog surface is reused to unlock one or more locked vaults.
//! Each pending vault gets a tab; switching tabs reloads the credential form
//! against the selected vault and re-points the completion route at it. When
//! the form finishes, the coordinator resolves which vault receives the
//! outcome (depending on the [`Intent`] of the cycle), notifies the host, and
//! resets itself for the next cycle.
//!
//! # Components
//!
//! - [`TabIndexMap`] - Tab position to pending vault mapping, kept 1:1 with the
//!   tab strip
//! - [`Intent`] - Purpose of the current cycle (plain open or merge)
//! - [`UnlockCoordinator`] - Owns the map and the intent, routes completion
//! - [`cycler`] - Keyboard-driven tab cycling with wraparound
//! - [`DialogConfig`] - Presentation settings and tab-cycling shortcuts
//!
//! The credential form, the vault objects and the host window are
//! collaborators supplied through the [`UnlockForm`], [`PendingTarget`] and
//! [`DialogHost`] traits. Nothing here touches a windowing toolkit.
//!
//! # Example
//!
//! ```
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! use oxcrypt_unlock::{
//!     DialogHost, Intent, PathTarget, TargetHandle, UnlockCoordinator, UnlockForm,
//! };
//!
//! #[derive(Default)]
//! struct Form {
//!     loaded: Option<String>,
//! }
//!
//! impl UnlockForm for Form {
//!     type Unlocked = String;
//!
//!     fn load(&mut self, path: &Path) {
//!         self.loaded = Some(path.display().to_string());
//!     }
//!
//!     fn current_result(&mut self) -> Option<String> {
//!         self.loaded.take()
//!     }
//! }
//!
//! struct Host;
//!
//! impl DialogHost for Host {
//!     fn accept(&mut self) {}
//!     fn reject(&mut self) {}
//!     fn activate(&mut self, _target: &TargetHandle) {}
//!     fn cycle_finished(&mut self, _accepted: bool, _target: Option<&TargetHandle>) {}
//! }
//!
//! let work: TargetHandle = Arc::new(PathTarget::new("/vaults/work"));
//! let home: TargetHandle = Arc::new(PathTarget::new("/vaults/home"));
//!
//! let mut dialog = UnlockCoordinator::new(Form::default(), Host);
//! dialog.set_intent(Intent::Open);
//! dialog.register_target(Arc::clone(&work));
//! dialog.register_target(Arc::clone(&home));
//! dialog.select_tab(1);
//!
//! let outcome = dialog.on_form_finished(true);
//! assert!(outcome.accepted);
//! assert!(Arc::ptr_eq(outcome.target.as_ref().unwrap(), &home));
//! assert_eq!(outcome.result.as_deref(), Some("/vaults/home"));
//! assert_eq!(dialog.tabs().len(), 0);
//! ```

pub mod config;
pub mod coordinator;
pub mod cycler;
pub mod error;
pub mod intent;
pub mod shortcuts;
pub mod tab_map;
pub mod target;

pub use config::{DialogConfig, Modality, ShortcutConfig, TabBarConfig};
pub use coordinator::{CycleOutcome, CycleState, DialogHost, UnlockCoordinator, UnlockForm};
pub use error::{ConfigError, ShortcutError};
pub use intent::Intent;
pub use shortcuts::{Key, KeyChord, Modifiers, TabShortcuts};
pub use tab_map::{SelectionChanged, TabIndexMap, TabStrip};
pub use target::{PathTarget, PendingTarget, TargetHandle, TargetRef};
