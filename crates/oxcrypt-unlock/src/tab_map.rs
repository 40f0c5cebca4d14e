//! Tab position to pending vault mapping
//!
//! [`TabIndexMap`] owns both the vault references and the headless tab strip
//! model, so position `i` in one is always position `i` in the other.
//!
//! Changes to the strip never call back into the coordinator. Operations that
//! move the current tab return a [`SelectionChanged`] instead, and the caller
//! dispatches it once the map is consistent again. Teardown through
//! [`TabIndexMap::clear`] returns nothing, so it cannot trigger a reload
//! against a map that is being emptied.

use crate::target::{TargetHandle, TargetRef};

/// The current tab moved to `index`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionChanged {
    pub index: usize,
}

/// Headless model of the dialog's tab strip
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabStrip {
    labels: Vec<String>,
    current: Option<usize>,
}

impl TabStrip {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Tab labels in position order
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Index of the selected tab, `None` only while the strip is empty
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    /// Append a tab. The first tab of an empty strip becomes current.
    fn push(&mut self, label: String) -> Option<SelectionChanged> {
        self.labels.push(label);
        if self.current.is_none() {
            self.current = Some(0);
            return Some(SelectionChanged { index: 0 });
        }
        None
    }

    /// Move the selection. Returns `None` if `index` is out of range or
    /// already selected.
    pub fn set_current(&mut self, index: usize) -> Option<SelectionChanged> {
        if index >= self.labels.len() || self.current == Some(index) {
            return None;
        }
        self.current = Some(index);
        Some(SelectionChanged { index })
    }

    /// Point the selection at `index` without reporting a change.
    fn sync_current(&mut self, index: usize) {
        if index < self.labels.len() {
            self.current = Some(index);
        }
    }

    fn clear(&mut self) {
        self.labels.clear();
        self.current = None;
    }
}

/// Ordered mapping from tab position to pending vault
#[derive(Debug, Default)]
pub struct TabIndexMap {
    targets: Vec<TargetRef>,
    tabs: TabStrip,
}

impl TabIndexMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a vault and add its tab.
    ///
    /// The reference is stored before the tab exists: the returned selection
    /// change (produced when the first tab is added) must always find its
    /// vault.
    pub fn register(&mut self, target: &TargetHandle) -> Option<SelectionChanged> {
        self.targets.push(TargetRef::new(target));
        let change = self.tabs.push(target.display_name());

        debug_assert_eq!(
            self.targets.len(),
            self.tabs.len(),
            "tab strip out of sync with registered vaults"
        );
        if self.targets.len() != self.tabs.len() {
            tracing::error!(
                targets = self.targets.len(),
                tabs = self.tabs.len(),
                "Tab strip out of sync with registered vaults"
            );
        }

        change
    }

    /// Vault at `index`, or `None` if out of range or already dropped
    pub fn resolve(&self, index: usize) -> Option<TargetHandle> {
        self.targets.get(index).and_then(TargetRef::upgrade)
    }

    /// Reference at `index` without upgrading it
    pub fn target_ref(&self, index: usize) -> Option<&TargetRef> {
        self.targets.get(index)
    }

    /// Tab index of a registered vault
    pub fn position_of(&self, target: &TargetHandle) -> Option<usize> {
        self.targets.iter().position(|r| r.refers_to(target))
    }

    /// Vault under the currently selected tab
    pub fn current(&self) -> Option<TargetHandle> {
        self.tabs.current_index().and_then(|index| self.resolve(index))
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn tabs(&self) -> &TabStrip {
        &self.tabs
    }

    pub(crate) fn tabs_mut(&mut self) -> &mut TabStrip {
        &mut self.tabs
    }

    /// Select `index` as a user action would
    pub fn select(&mut self, index: usize) -> Option<SelectionChanged> {
        self.tabs.set_current(index)
    }

    pub(crate) fn sync_current(&mut self, index: usize) {
        self.tabs.sync_current(index);
    }

    /// Drop every tab and every vault reference.
    ///
    /// Works on the containers directly; no selection change is produced.
    pub fn clear(&mut self) {
        self.targets.clear();
        self.tabs.clear();
    }
}
