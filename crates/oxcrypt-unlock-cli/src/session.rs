//! Scripted collaborators for driving the unlock dialog without a window.
//!
//! The form, host and vaults all append to one shared [`EventLog`], so the
//! order in which the coordinator talks to them is visible in the output.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use thiserror::Error;

use oxcrypt_unlock::{
    DialogConfig, DialogHost, Intent, KeyChord, PendingTarget, ShortcutError, TargetHandle,
    UnlockCoordinator, UnlockForm,
};

/// One thing that happened during a simulated cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    Registered { index: usize, label: String, path: String },
    FormLoaded { path: String },
    KeyPressed { chord: String, consumed: bool },
    Accepted,
    Rejected,
    Activated { path: String },
    VaultNotified { path: String, accepted: bool },
    CycleFinished { accepted: bool, target: Option<String> },
}

impl SessionEvent {
    /// Short event name, as used in JSON output
    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::Registered { .. } => "registered",
            SessionEvent::FormLoaded { .. } => "form_loaded",
            SessionEvent::KeyPressed { .. } => "key_pressed",
            SessionEvent::Accepted => "accepted",
            SessionEvent::Rejected => "rejected",
            SessionEvent::Activated { .. } => "activated",
            SessionEvent::VaultNotified { .. } => "vault_notified",
            SessionEvent::CycleFinished { .. } => "cycle_finished",
        }
    }

    /// Human-readable details for table output
    pub fn detail(&self) -> String {
        match self {
            SessionEvent::Registered { index, label, path } => {
                format!("tab {index} \"{label}\" ({path})")
            }
            SessionEvent::FormLoaded { path } | SessionEvent::Activated { path } => path.clone(),
            SessionEvent::KeyPressed { chord, consumed } => {
                if *consumed {
                    chord.clone()
                } else {
                    format!("{chord} (not bound)")
                }
            }
            SessionEvent::Accepted | SessionEvent::Rejected => String::new(),
            SessionEvent::VaultNotified { path, accepted } => {
                format!("{path} accepted={accepted}")
            }
            SessionEvent::CycleFinished { accepted, target } => format!(
                "accepted={accepted} target={}",
                target.as_deref().unwrap_or("none")
            ),
        }
    }
}

pub type EventLog = Arc<Mutex<Vec<SessionEvent>>>;

fn display(path: &Path) -> String {
    path.display().to_string()
}

/// A vault given on the command line
pub struct ScriptedVault {
    path: PathBuf,
    log: EventLog,
}

impl PendingTarget for ScriptedVault {
    fn path(&self) -> &Path {
        &self.path
    }

    fn unlock(&self, accepted: bool) {
        self.log.lock().push(SessionEvent::VaultNotified {
            path: display(&self.path),
            accepted,
        });
    }
}

/// Form that unlocks whichever vault it shows when the script submits it
pub struct ScriptedForm {
    log: EventLog,
    showing: Option<PathBuf>,
    unlocked: Option<PathBuf>,
}

impl ScriptedForm {
    /// Finish the form; an accepted submission unlocks the shown vault
    fn submit(&mut self, accepted: bool) {
        self.unlocked = if accepted { self.showing.clone() } else { None };
    }
}

impl UnlockForm for ScriptedForm {
    type Unlocked = PathBuf;

    fn load(&mut self, path: &Path) {
        self.showing = Some(path.to_path_buf());
        self.log.lock().push(SessionEvent::FormLoaded {
            path: display(path),
        });
    }

    fn current_result(&mut self) -> Option<PathBuf> {
        self.unlocked.take()
    }

    fn clear(&mut self) {
        self.showing = None;
        self.unlocked = None;
    }
}

pub struct ScriptedHost {
    log: EventLog,
}

impl DialogHost for ScriptedHost {
    fn accept(&mut self) {
        self.log.lock().push(SessionEvent::Accepted);
    }

    fn reject(&mut self) {
        self.log.lock().push(SessionEvent::Rejected);
    }

    fn activate(&mut self, target: &TargetHandle) {
        self.log.lock().push(SessionEvent::Activated {
            path: display(target.path()),
        });
    }

    fn cycle_finished(&mut self, accepted: bool, target: Option<&TargetHandle>) {
        self.log.lock().push(SessionEvent::CycleFinished {
            accepted,
            target: target.map(|t| display(t.path())),
        });
    }
}

/// Errors in a step script
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScriptError {
    #[error("unknown step '{0}' (expected select:N, next, prev, key:CHORD, accept or reject)")]
    UnknownStep(String),
    #[error("invalid tab index in '{0}'")]
    InvalidIndex(String),
    #[error("invalid key in '{step}': {source}")]
    InvalidKey {
        step: String,
        #[source]
        source: ShortcutError,
    },
    #[error("step '{0}' comes after the form was already submitted")]
    AfterSubmit(String),
    #[error("at least one vault is required")]
    NoVaults,
}

/// A single user action in a script
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Click the tab at an index
    Select(usize),
    Next,
    Prev,
    /// Press a key chord inside the dialog
    Key(KeyChord),
    Accept,
    Reject,
}

impl Step {
    fn is_submit(self) -> bool {
        matches!(self, Step::Accept | Step::Reject)
    }
}

impl FromStr for Step {
    type Err = ScriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(index) = s.strip_prefix("select:") {
            return index
                .trim()
                .parse()
                .map(Step::Select)
                .map_err(|_| ScriptError::InvalidIndex(s.to_string()));
        }
        if let Some(chord) = s.strip_prefix("key:") {
            return chord
                .parse()
                .map(Step::Key)
                .map_err(|source| ScriptError::InvalidKey {
                    step: s.to_string(),
                    source,
                });
        }
        match s.to_ascii_lowercase().as_str() {
            "next" => Ok(Step::Next),
            "prev" | "previous" => Ok(Step::Prev),
            "accept" => Ok(Step::Accept),
            "reject" | "cancel" => Ok(Step::Reject),
            _ => Err(ScriptError::UnknownStep(s.to_string())),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Select(index) => write!(f, "select:{index}"),
            Step::Next => f.write_str("next"),
            Step::Prev => f.write_str("prev"),
            Step::Key(chord) => write!(f, "key:{chord}"),
            Step::Accept => f.write_str("accept"),
            Step::Reject => f.write_str("reject"),
        }
    }
}

/// Result of running a script
#[derive(Debug, Serialize)]
pub struct SessionReport {
    pub intent: Intent,
    pub accepted: bool,
    pub target: Option<String>,
    pub unlocked: Option<String>,
    /// True when the script ended without a submission and the dialog was
    /// closed instead
    pub closed_without_submit: bool,
    pub events: Vec<SessionEvent>,
}

/// Register `vaults`, replay `steps` and finish the cycle.
pub fn run_script(
    config: &DialogConfig,
    intent: Intent,
    vaults: &[PathBuf],
    steps: &[Step],
) -> Result<SessionReport, ScriptError> {
    if vaults.is_empty() {
        return Err(ScriptError::NoVaults);
    }
    if let Some(pos) = steps.iter().position(|step| step.is_submit())
        && let Some(extra) = steps.get(pos + 1)
    {
        return Err(ScriptError::AfterSubmit(extra.to_string()));
    }

    let log = EventLog::default();
    let form = ScriptedForm {
        log: Arc::clone(&log),
        showing: None,
        unlocked: None,
    };
    let host = ScriptedHost {
        log: Arc::clone(&log),
    };
    let mut dialog = UnlockCoordinator::with_config(form, host, config);
    dialog.set_intent(intent);

    // The dialog only keeps weak references; the script owns the vaults
    let handles: Vec<TargetHandle> = vaults
        .iter()
        .map(|path| -> TargetHandle {
            Arc::new(ScriptedVault {
                path: path.clone(),
                log: Arc::clone(&log),
            })
        })
        .collect();

    for (index, handle) in handles.iter().enumerate() {
        log.lock().push(SessionEvent::Registered {
            index,
            label: handle.display_name(),
            path: display(handle.path()),
        });
        dialog.register_target(Arc::clone(handle));
    }

    let mut submitted = None;
    for step in steps {
        tracing::debug!(%step, "Replaying step");
        match *step {
            Step::Select(index) => dialog.select_tab(index),
            Step::Next => dialog.advance_tab(1),
            Step::Prev => dialog.advance_tab(-1),
            Step::Key(chord) => {
                let consumed = dialog.handle_key(&chord);
                log.lock().push(SessionEvent::KeyPressed {
                    chord: chord.to_string(),
                    consumed,
                });
            }
            Step::Accept => submitted = Some(true),
            Step::Reject => submitted = Some(false),
        }
    }

    // Closing the dialog goes through the same completion path
    let accepted = submitted.unwrap_or(false);
    dialog.form_mut().submit(accepted);
    let outcome = dialog.on_form_finished(accepted);

    let events = std::mem::take(&mut *log.lock());
    Ok(SessionReport {
        intent,
        accepted: outcome.accepted,
        target: outcome.target.as_ref().map(|t| display(t.path())),
        unlocked: outcome.result.as_deref().map(display),
        closed_without_submit: submitted.is_none(),
        events,
    })
}
