//! Pending vaults and the non-owning references the dialog keeps to them

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

/// A locked vault waiting to be unlocked through the dialog.
///
/// The host owns these objects. The coordinator only holds [`TargetRef`]s and
/// forgets them when a cycle resets; the vault itself is never destroyed by
/// the dialog.
pub trait PendingTarget {
    /// Path of the vault, used as its identity when loading the form
    fn path(&self) -> &Path;

    /// Label shown on the vault's tab.
    ///
    /// Defaults to the last path segment, or the whole path when it has none.
    fn display_name(&self) -> String {
        label_for_path(self.path())
    }

    /// Receive the outcome of a submission routed to this vault
    fn unlock(&self, accepted: bool);
}

/// Shared handle the host uses to register a vault
pub type TargetHandle = Arc<dyn PendingTarget>;

/// Tab label for a vault path
pub fn label_for_path(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Non-owning reference to a registered vault.
///
/// Upgrading fails once the host has dropped the vault, which callers treat
/// the same as an out-of-range lookup.
#[derive(Clone)]
pub struct TargetRef(Weak<dyn PendingTarget>);

impl TargetRef {
    pub fn new(target: &TargetHandle) -> Self {
        Self(Arc::downgrade(target))
    }

    pub fn upgrade(&self) -> Option<TargetHandle> {
        self.0.upgrade()
    }

    /// Returns true if this reference points at `target`
    pub fn refers_to(&self, target: &TargetHandle) -> bool {
        self.upgrade()
            .is_some_and(|inner| Arc::ptr_eq(&inner, target))
    }
}

impl fmt::Debug for TargetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upgrade() {
            Some(target) => f
                .debug_tuple("TargetRef")
                .field(&target.path())
                .finish(),
            None => f.write_str("TargetRef(<dropped>)"),
        }
    }
}

/// A vault identified only by its path.
///
/// Records every outcome routed to it. Frontends that track richer vault
/// state implement [`PendingTarget`] on their own types instead.
#[derive(Debug)]
pub struct PathTarget {
    path: PathBuf,
    outcomes: Mutex<Vec<bool>>,
}

impl PathTarget {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            outcomes: Mutex::new(Vec::new()),
        }
    }

    /// Outcomes received so far, oldest first
    pub fn outcomes(&self) -> Vec<bool> {
        self.outcomes.lock().clone()
    }

    /// Returns true if the last routed outcome was an accepted unlock
    pub fn is_unlocked(&self) -> bool {
        self.outcomes.lock().last().copied().unwrap_or(false)
    }
}

impl PendingTarget for PathTarget {
    fn path(&self) -> &Path {
        &self.path
    }

    fn unlock(&self, accepted: bool) {
        tracing::debug!(path = %self.path.display(), accepted, "Outcome routed to vault");
        self.outcomes.lock().push(accepted);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_uses_last_segment() {
        let target = PathTarget::new("/home/user/Vaults/work.vault");
        assert_eq!(target.display_name(), "work.vault");
    }

    #[test]
    fn test_display_name_falls_back_to_full_path() {
        assert_eq!(label_for_path(Path::new("/")), "/");
    }

    #[test]
    fn test_target_ref_does_not_keep_target_alive() {
        let target: TargetHandle = Arc::new(PathTarget::new("/tmp/vault"));
        let reference = TargetRef::new(&target);
        assert!(reference.refers_to(&target));

        drop(target);
        assert!(reference.upgrade().is_none());
    }

    #[test]
    fn test_path_target_records_outcomes() {
        let target = PathTarget::new("/tmp/vault");
        assert!(!target.is_unlocked());

        target.unlock(false);
        target.unlock(true);
        assert_eq!(target.outcomes(), vec![false, true]);
        assert!(target.is_unlocked());
    }
}
