//! Unlock dialog coordinator
//!
//! One [`UnlockCoordinator`] serves any number of unlock cycles. A cycle
//! starts when the host registers the first pending vault and ends exactly
//! once, in [`UnlockCoordinator::on_form_finished`], which always resets the
//! coordinator before returning.
//!
//! ```text
//!              register_target            select_tab / advance_tab
//!   Idle ───────────────────────► AwaitingInput ◄──────────────┐
//!    ▲                                  │ │                     │
//!    │                                  │ └─────────────────────┘
//!    │       reset (unconditional)      │ on_form_finished
//!    └──────────────── Completing ◄─────┘
//! ```
//!
//! Completion routing is plain state: every selection change replaces
//! `route`, and completion reads it. There is no callback to disconnect and
//! reconnect, so a stale route cannot survive a tab switch. Overlapping
//! submissions from different tabs are not supported; the form is modal for
//! the selected tab.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::DialogConfig;
use crate::cycler;
use crate::intent::Intent;
use crate::shortcuts::{KeyChord, TabShortcuts};
use crate::tab_map::{SelectionChanged, TabIndexMap};
use crate::target::{TargetHandle, TargetRef};

/// Credential entry form shown inside the dialog.
///
/// The form validates credentials and unlocks the vault on its own; the
/// coordinator only tells it which vault to show and reads its result when
/// it reports that it has finished.
pub trait UnlockForm {
    /// What a successful unlock produces (e.g. an opened vault)
    type Unlocked;

    /// Show the credential form for the vault at `path`
    fn load(&mut self, path: &Path);

    /// Take the form's current result.
    ///
    /// Called once per cycle, right after the form finished and before it is
    /// cleared.
    fn current_result(&mut self) -> Option<Self::Unlocked>;

    /// Forget any per-vault state.
    ///
    /// Called when the coordinator resets and when the selected tab's vault
    /// is gone.
    fn clear(&mut self) {}
}

/// Window that owns the dialog
pub trait DialogHost {
    /// Close the dialog surface as accepted
    fn accept(&mut self);

    /// Close the dialog surface as rejected
    fn reject(&mut self);

    /// Make `target` the active vault in the host's own UI.
    ///
    /// Not called for merge cycles.
    fn activate(&mut self, target: &TargetHandle);

    /// The cycle ended. Fires exactly once per cycle.
    fn cycle_finished(&mut self, accepted: bool, target: Option<&TargetHandle>);
}

/// Lifecycle state of the coordinator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CycleState {
    /// No vault registered
    #[default]
    Idle,
    /// At least one vault registered, waiting for the form to finish
    AwaitingInput,
    /// Delivering the outcome of a finished form
    Completing,
}

/// What a finished cycle produced
pub struct CycleOutcome<R> {
    pub accepted: bool,
    /// Vault the outcome was delivered to
    pub target: Option<TargetHandle>,
    /// Form result captured at completion, `None` on cancellation
    pub result: Option<R>,
}

impl<R: std::fmt::Debug> std::fmt::Debug for CycleOutcome<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CycleOutcome")
            .field("accepted", &self.accepted)
            .field("target", &self.target.as_ref().map(|t| t.path().to_path_buf()))
            .field("result", &self.result)
            .finish()
    }
}

/// Coordinates the tabs, the credential form and result delivery of the
/// unlock dialog
pub struct UnlockCoordinator<F: UnlockForm, H: DialogHost> {
    form: F,
    host: H,
    tabs: TabIndexMap,
    intent: Intent,
    /// Last vault selected while the intent was `Merge`
    merge_target: Option<TargetRef>,
    /// Vault that receives the form's outcome
    route: Option<TargetRef>,
    state: CycleState,
    shortcuts: TabShortcuts,
    auto_hide_tabs: bool,
    cycle: u64,
}

impl<F: UnlockForm, H: DialogHost> UnlockCoordinator<F, H> {
    /// Create a coordinator with default settings
    pub fn new(form: F, host: H) -> Self {
        Self::with_config(form, host, &DialogConfig::default())
    }

    pub fn with_config(form: F, host: H, config: &DialogConfig) -> Self {
        Self {
            form,
            host,
            tabs: TabIndexMap::new(),
            intent: Intent::None,
            merge_target: None,
            route: None,
            state: CycleState::Idle,
            shortcuts: config.tab_shortcuts(),
            auto_hide_tabs: config.tab_bar.auto_hide,
            cycle: 1,
        }
    }

    // ------------------------------------------------------------------
    // Host-facing API
    // ------------------------------------------------------------------

    /// Add a vault to the dialog.
    ///
    /// The first vault of a cycle becomes the selected tab immediately, which
    /// loads the form for it.
    pub fn register_target(&mut self, target: TargetHandle) {
        debug!(
            cycle = self.cycle,
            path = %target.path().display(),
            index = self.tabs.len(),
            "Registering pending vault"
        );

        let change = self.tabs.register(&target);
        if self.state == CycleState::Idle {
            self.state = CycleState::AwaitingInput;
        }
        if let Some(change) = change {
            self.dispatch(change);
        }
    }

    pub fn set_intent(&mut self, intent: Intent) {
        if self.state != CycleState::Idle && intent != self.intent {
            debug!(cycle = self.cycle, from = %self.intent, to = %intent, "Intent changed mid-cycle");
        }
        self.intent = intent;
    }

    pub fn intent(&self) -> Intent {
        self.intent
    }

    /// Vault that would receive the outcome if the form finished now.
    ///
    /// For merge cycles this is the last selected vault; otherwise the vault
    /// under the current tab.
    pub fn active_target(&self) -> Option<TargetHandle> {
        if self.intent.is_merge() {
            return self.merge_target.as_ref().and_then(TargetRef::upgrade);
        }
        self.tabs.current()
    }

    /// Alias of [`active_target`](Self::active_target) under the host-facing name
    pub fn result_target(&self) -> Option<TargetHandle> {
        self.active_target()
    }

    /// Vault currently wired to receive the form's outcome
    pub fn completion_route(&self) -> Option<TargetHandle> {
        self.route.as_ref().and_then(TargetRef::upgrade)
    }

    pub fn state(&self) -> CycleState {
        self.state
    }

    /// Tabs and their vaults, for rendering
    pub fn tabs(&self) -> &TabIndexMap {
        &self.tabs
    }

    /// Whether the tab strip should be shown
    pub fn tab_bar_visible(&self) -> bool {
        !self.auto_hide_tabs || self.tabs.len() > 1
    }

    pub fn shortcuts(&self) -> &TabShortcuts {
        &self.shortcuts
    }

    pub fn form(&self) -> &F {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut F {
        &mut self.form
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Number of the current (or next) cycle, starting at 1
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    // ------------------------------------------------------------------
    // UI events
    // ------------------------------------------------------------------

    /// Select a tab as a click on it would.
    ///
    /// Does nothing if `index` is out of range or already selected.
    pub fn select_tab(&mut self, index: usize) {
        match self.tabs.select(index) {
            Some(change) => self.dispatch(change),
            None if index >= self.tabs.len() => {
                warn!(cycle = self.cycle, index, tabs = self.tabs.len(), "Ignoring selection of missing tab");
            }
            None => {}
        }
    }

    /// Move the selection `offset` tabs, wrapping around both ends
    pub fn advance_tab(&mut self, offset: isize) {
        if let Some(change) = cycler::advance(self.tabs.tabs_mut(), offset) {
            self.dispatch(change);
        }
    }

    /// Handle a key chord pressed while focus is inside the dialog.
    ///
    /// Returns true if the chord is one of the tab-cycling shortcuts.
    pub fn handle_key(&mut self, chord: &KeyChord) -> bool {
        match self.shortcuts.offset_for(chord) {
            Some(offset) => {
                self.advance_tab(offset);
                true
            }
            None => false,
        }
    }

    /// React to the selected tab becoming `index`.
    ///
    /// Re-points the completion route at the tab's vault and reloads the form
    /// for it. Out-of-range indices are ignored. A tab whose vault the host
    /// already dropped leaves the dialog with no route and an empty form.
    pub fn on_selection_changed(&mut self, index: usize) {
        if index >= self.tabs.len() {
            debug!(cycle = self.cycle, index, "Selection change past the last tab ignored");
            return;
        }
        self.tabs.sync_current(index);

        match self.tabs.resolve(index) {
            Some(target) => {
                let path = target.path().to_path_buf();
                self.set_target(&target, &path);
            }
            None => self.detach_route(index),
        }
    }

    /// Point the dialog at `target` and load the form for `path`.
    ///
    /// The tab holding `target` becomes the selected one. A vault not
    /// registered yet gets a tab first, so the recipient reported to the
    /// host is always the vault the outcome is delivered to.
    pub fn set_target(&mut self, target: &TargetHandle, path: &Path) {
        let on_current = self
            .tabs
            .current()
            .is_some_and(|current| Arc::ptr_eq(&current, target));
        if !on_current {
            let index = match self.tabs.position_of(target) {
                Some(index) => index,
                None => {
                    debug!(cycle = self.cycle, path = %path.display(), "Adding tab for unregistered vault");
                    let index = self.tabs.len();
                    // Selection is synced right below; the first-tab change is not dispatched
                    self.tabs.register(target);
                    if self.state == CycleState::Idle {
                        self.state = CycleState::AwaitingInput;
                    }
                    index
                }
            };
            self.tabs.sync_current(index);
        }

        let route = TargetRef::new(target);
        if self.intent.is_merge() {
            self.merge_target = Some(route.clone());
        }
        // Replacing the field drops the previous route in the same step
        let previous = self.route.replace(route);
        debug!(
            cycle = self.cycle,
            path = %path.display(),
            previous = ?previous,
            "Completion route moved"
        );

        self.form.load(path);
    }

    /// The form finished with `accepted`.
    ///
    /// Delivers the outcome, notifies the host once and resets for the next
    /// cycle. Closing the dialog without submitting must also come through
    /// here (with `accepted == false`) so the reset happens.
    pub fn on_form_finished(&mut self, accepted: bool) -> CycleOutcome<F::Unlocked> {
        let span = tracing::info_span!("unlock_cycle", cycle = self.cycle, intent = %self.intent);
        let _guard = span.enter();

        self.state = CycleState::Completing;

        // The form invalidates its result once the dialog closes
        let result = self.form.current_result();

        if accepted {
            self.host.accept();
        } else {
            self.host.reject();
        }

        let recipient = self.active_target();
        if !self.intent.is_merge()
            && let Some(target) = &recipient
        {
            self.host.activate(target);
        }

        if let Some(route) = self.completion_route() {
            route.unlock(accepted);
        }

        info!(
            accepted,
            target = ?recipient.as_ref().map(|t| t.path().display().to_string()),
            "Unlock cycle finished"
        );
        self.host.cycle_finished(accepted, recipient.as_ref());

        let outcome = CycleOutcome {
            accepted,
            target: recipient,
            result,
        };
        self.reset();
        outcome
    }

    /// Return to the idle state: no tabs, no vaults, no intent, no route.
    pub fn reset(&mut self) {
        debug!(cycle = self.cycle, tabs = self.tabs.len(), "Resetting unlock dialog");

        self.intent = Intent::None;
        self.merge_target = None;
        self.route = None;
        self.tabs.clear();
        self.form.clear();

        if self.state != CycleState::Idle {
            self.cycle += 1;
        }
        self.state = CycleState::Idle;
    }

    fn detach_route(&mut self, index: usize) {
        debug!(cycle = self.cycle, index, "Selected tab has no live vault; completion route cleared");
        self.route = None;
        if self.intent.is_merge() {
            self.merge_target = None;
        }
        self.form.clear();
    }

    fn dispatch(&mut self, change: SelectionChanged) {
        self.on_selection_changed(change.index);
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;

    use super::*;
    use crate::shortcuts::{Key, Modifiers};
    use crate::target::PathTarget;

    #[derive(Default)]
    struct Form {
        loads: Vec<PathBuf>,
        clears: usize,
    }

    impl UnlockForm for Form {
        type Unlocked = PathBuf;

        fn load(&mut self, path: &Path) {
            self.loads.push(path.to_path_buf());
        }

        fn current_result(&mut self) -> Option<PathBuf> {
            self.loads.last().cloned()
        }

        fn clear(&mut self) {
            self.clears += 1;
        }
    }

    #[derive(Default)]
    struct Host {
        accepted: usize,
        rejected: usize,
        activated: Vec<PathBuf>,
        finished: Vec<(bool, Option<PathBuf>)>,
    }

    impl DialogHost for Host {
        fn accept(&mut self) {
            self.accepted += 1;
        }

        fn reject(&mut self) {
            self.rejected += 1;
        }

        fn activate(&mut self, target: &TargetHandle) {
            self.activated.push(target.path().to_path_buf());
        }

        fn cycle_finished(&mut self, accepted: bool, target: Option<&TargetHandle>) {
            self.finished
                .push((accepted, target.map(|t| t.path().to_path_buf())));
        }
    }

    fn vault(path: &str) -> TargetHandle {
        Arc::new(PathTarget::new(path))
    }

    fn dialog() -> UnlockCoordinator<Form, Host> {
        UnlockCoordinator::new(Form::default(), Host::default())
    }

    #[test]
    fn test_starts_idle() {
        let dialog = dialog();
        assert_eq!(dialog.state(), CycleState::Idle);
        assert_eq!(dialog.intent(), Intent::None);
        assert!(dialog.active_target().is_none());
        assert!(dialog.completion_route().is_none());
        assert_eq!(dialog.cycle(), 1);
    }

    #[test]
    fn test_first_registration_loads_form() {
        let mut dialog = dialog();
        let a = vault("/vaults/a");
        dialog.register_target(Arc::clone(&a));

        assert_eq!(dialog.state(), CycleState::AwaitingInput);
        assert_eq!(dialog.form().loads, vec![PathBuf::from("/vaults/a")]);
        assert!(Arc::ptr_eq(&dialog.completion_route().unwrap(), &a));
    }

    #[test]
    fn test_later_registrations_do_not_reload() {
        let mut dialog = dialog();
        dialog.register_target(vault("/vaults/a"));
        let b = vault("/vaults/b");
        dialog.register_target(Arc::clone(&b));

        assert_eq!(dialog.form().loads.len(), 1);
        assert_eq!(dialog.tabs().len(), 2);
        assert_eq!(dialog.tabs().tabs().len(), 2);
    }

    #[test]
    fn test_selecting_current_tab_is_noop() {
        let mut dialog = dialog();
        let a = vault("/vaults/a");
        dialog.register_target(Arc::clone(&a));
        dialog.select_tab(0);
        dialog.select_tab(5);

        assert_eq!(dialog.form().loads.len(), 1);
    }

    #[test]
    fn test_on_selection_changed_reloads_even_when_unchanged() {
        let mut dialog = dialog();
        let a = vault("/vaults/a");
        dialog.register_target(Arc::clone(&a));
        dialog.on_selection_changed(0);

        assert_eq!(dialog.form().loads.len(), 2);
    }

    #[test]
    fn test_on_selection_changed_syncs_tab_strip() {
        let mut dialog = dialog();
        let a = vault("/vaults/a");
        let b = vault("/vaults/b");
        dialog.register_target(Arc::clone(&a));
        dialog.register_target(Arc::clone(&b));

        dialog.on_selection_changed(1);
        assert_eq!(dialog.tabs().tabs().current_index(), Some(1));
        assert!(Arc::ptr_eq(&dialog.active_target().unwrap(), &b));
    }

    #[test]
    fn test_dropped_target_clears_route() {
        let mut dialog = dialog();
        let a = vault("/vaults/a");
        dialog.register_target(Arc::clone(&a));
        // Only the dialog's weak reference remains after this call
        dialog.register_target(vault("/vaults/gone"));

        dialog.select_tab(1);
        assert_eq!(dialog.form().loads.len(), 1);
        assert_eq!(dialog.form().clears, 1);
        assert_eq!(dialog.tabs().tabs().current_index(), Some(1));
        assert!(dialog.completion_route().is_none());
        assert!(dialog.active_target().is_none());
    }

    #[test]
    fn test_completion_on_dropped_tab_reaches_nobody() {
        let mut dialog = dialog();
        dialog.set_intent(Intent::Open);
        let a = Arc::new(PathTarget::new("/vaults/a"));
        dialog.register_target(a.clone());
        dialog.register_target(vault("/vaults/gone"));
        dialog.select_tab(1);

        let outcome = dialog.on_form_finished(true);
        assert!(outcome.target.is_none());
        assert!(a.outcomes().is_empty());
        assert!(dialog.host().activated.is_empty());
        assert_eq!(dialog.host().finished, vec![(true, None)]);
    }

    #[test]
    fn test_dropped_tab_clears_merge_target() {
        let mut dialog = dialog();
        dialog.set_intent(Intent::Merge);
        let a = vault("/vaults/a");
        dialog.register_target(Arc::clone(&a));
        dialog.register_target(vault("/vaults/gone"));
        assert!(Arc::ptr_eq(&dialog.active_target().unwrap(), &a));

        dialog.select_tab(1);
        assert!(dialog.active_target().is_none());
        assert!(dialog.completion_route().is_none());
    }

    #[test]
    fn test_set_target_rewires_route_and_loads_path() {
        let mut dialog = dialog();
        let a = vault("/vaults/a");
        let b = vault("/vaults/b");
        dialog.register_target(Arc::clone(&a));
        dialog.register_target(Arc::clone(&b));

        dialog.set_target(&b, Path::new("/mnt/backup/b.vault"));
        assert_eq!(
            dialog.form().loads,
            vec![PathBuf::from("/vaults/a"), PathBuf::from("/mnt/backup/b.vault")]
        );
        assert!(Arc::ptr_eq(&dialog.completion_route().unwrap(), &b));
        assert_eq!(dialog.tabs().tabs().current_index(), Some(1));
        assert!(Arc::ptr_eq(&dialog.active_target().unwrap(), &b));
    }

    #[test]
    fn test_set_target_under_merge_updates_merge_target() {
        let mut dialog = dialog();
        dialog.set_intent(Intent::Merge);
        let a = vault("/vaults/a");
        let b = vault("/vaults/b");
        dialog.register_target(Arc::clone(&a));
        dialog.register_target(Arc::clone(&b));

        dialog.set_target(&b, Path::new("/vaults/b"));
        let outcome = dialog.on_form_finished(true);
        assert!(Arc::ptr_eq(outcome.target.as_ref().unwrap(), &b));
        assert!(dialog.host().activated.is_empty());
    }

    #[test]
    fn test_set_target_adds_tab_for_unregistered_vault() {
        let mut dialog = dialog();
        let a = vault("/vaults/a");
        dialog.register_target(Arc::clone(&a));
        let outside = Arc::new(PathTarget::new("/vaults/outside"));
        let outside_handle: TargetHandle = outside.clone();

        dialog.set_target(&outside_handle, Path::new("/vaults/outside"));
        assert_eq!(dialog.tabs().len(), 2);
        assert_eq!(dialog.tabs().tabs().current_index(), Some(1));

        let outcome = dialog.on_form_finished(true);
        assert!(Arc::ptr_eq(outcome.target.as_ref().unwrap(), &outside_handle));
        assert_eq!(outside.outcomes(), vec![true]);
        assert_eq!(dialog.host().activated, vec![PathBuf::from("/vaults/outside")]);
    }

    #[test]
    fn test_set_target_on_idle_dialog_starts_cycle() {
        let mut dialog = dialog();
        let a = vault("/vaults/a");
        dialog.set_target(&a, Path::new("/vaults/a"));

        assert_eq!(dialog.state(), CycleState::AwaitingInput);
        assert_eq!(dialog.tabs().tabs().current_index(), Some(0));
        assert_eq!(dialog.form().loads, vec![PathBuf::from("/vaults/a")]);
    }

    #[test]
    fn test_handle_key_cycles_tabs() {
        let mut dialog = dialog();
        let a = vault("/vaults/a");
        let b = vault("/vaults/b");
        dialog.register_target(Arc::clone(&a));
        dialog.register_target(Arc::clone(&b));

        assert!(dialog.handle_key(&KeyChord::ctrl(Key::PageUp)));
        assert_eq!(dialog.tabs().tabs().current_index(), Some(1));
        assert!(dialog.handle_key(&KeyChord::ctrl(Key::PageDown)));
        assert_eq!(dialog.tabs().tabs().current_index(), Some(0));

        assert!(!dialog.handle_key(&KeyChord::new(Modifiers::NONE, Key::Tab)));
        assert_eq!(dialog.form().loads.len(), 3);
    }

    #[test]
    fn test_custom_shortcuts_from_config() {
        let mut config = DialogConfig::default();
        config.shortcuts.next_tab = KeyChord::ctrl(Key::Tab);
        let mut dialog = UnlockCoordinator::with_config(Form::default(), Host::default(), &config);
        let a = vault("/vaults/a");
        let b = vault("/vaults/b");
        dialog.register_target(Arc::clone(&a));
        dialog.register_target(Arc::clone(&b));

        assert!(!dialog.handle_key(&KeyChord::ctrl(Key::PageDown)));
        assert!(dialog.handle_key(&KeyChord::ctrl(Key::Tab)));
        assert_eq!(dialog.tabs().tabs().current_index(), Some(1));
    }

    #[test]
    fn test_tab_bar_auto_hide() {
        let mut dialog = dialog();
        assert!(!dialog.tab_bar_visible());
        dialog.register_target(vault("/vaults/a"));
        assert!(!dialog.tab_bar_visible());
        dialog.register_target(vault("/vaults/b"));
        assert!(dialog.tab_bar_visible());

        let mut config = DialogConfig::default();
        config.tab_bar.auto_hide = false;
        let dialog = UnlockCoordinator::with_config(Form::default(), Host::default(), &config);
        assert!(dialog.tab_bar_visible());
    }

    #[test]
    fn test_open_cycle_activates_recipient_in_host() {
        let mut dialog = dialog();
        dialog.set_intent(Intent::Open);
        let a = vault("/vaults/a");
        let b = vault("/vaults/b");
        dialog.register_target(Arc::clone(&a));
        dialog.register_target(Arc::clone(&b));
        dialog.select_tab(1);

        let outcome = dialog.on_form_finished(true);
        assert_eq!(outcome.result, Some(PathBuf::from("/vaults/b")));

        let host = dialog.host();
        assert_eq!(host.accepted, 1);
        assert_eq!(host.activated, vec![PathBuf::from("/vaults/b")]);
        assert_eq!(host.finished, vec![(true, Some(PathBuf::from("/vaults/b")))]);
    }

    #[test]
    fn test_merge_cycle_leaves_host_selection_alone() {
        let mut dialog = dialog();
        dialog.set_intent(Intent::Merge);
        let a = vault("/vaults/a");
        dialog.register_target(Arc::clone(&a));

        let outcome = dialog.on_form_finished(true);
        assert!(Arc::ptr_eq(outcome.target.as_ref().unwrap(), &a));
        assert!(dialog.host().activated.is_empty());
        assert_eq!(dialog.host().finished, vec![(true, Some(PathBuf::from("/vaults/a")))]);
    }

    #[test]
    fn test_reset_clears_form_and_advances_cycle() {
        let mut dialog = dialog();
        dialog.register_target(vault("/vaults/a"));
        dialog.on_form_finished(false);

        assert_eq!(dialog.form().clears, 1);
        assert_eq!(dialog.cycle(), 2);
        assert_eq!(dialog.state(), CycleState::Idle);

        // Resetting an idle dialog is harmless and does not count as a cycle
        dialog.reset();
        assert_eq!(dialog.cycle(), 2);
    }
}
