//! Shared recording doubles for coordinator integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use oxcrypt_unlock::{
    DialogHost, PathTarget, TargetHandle, UnlockCoordinator, UnlockForm,
};

/// Everything the coordinator did to its collaborators, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Load(PathBuf),
    FormCleared,
    Accept,
    Reject,
    Activate(PathBuf),
    CycleFinished(bool, Option<PathBuf>),
}

pub type EventLog = Arc<Mutex<Vec<Event>>>;

/// Form that "unlocks" whatever vault it last showed
pub struct RecordingForm {
    log: EventLog,
    showing: Option<PathBuf>,
}

impl UnlockForm for RecordingForm {
    type Unlocked = PathBuf;

    fn load(&mut self, path: &Path) {
        self.showing = Some(path.to_path_buf());
        self.log.lock().push(Event::Load(path.to_path_buf()));
    }

    fn current_result(&mut self) -> Option<PathBuf> {
        self.showing.clone()
    }

    fn clear(&mut self) {
        self.showing = None;
        self.log.lock().push(Event::FormCleared);
    }
}

pub struct RecordingHost {
    log: EventLog,
}

impl DialogHost for RecordingHost {
    fn accept(&mut self) {
        self.log.lock().push(Event::Accept);
    }

    fn reject(&mut self) {
        self.log.lock().push(Event::Reject);
    }

    fn activate(&mut self, target: &TargetHandle) {
        self.log
            .lock()
            .push(Event::Activate(target.path().to_path_buf()));
    }

    fn cycle_finished(&mut self, accepted: bool, target: Option<&TargetHandle>) {
        self.log.lock().push(Event::CycleFinished(
            accepted,
            target.map(|t| t.path().to_path_buf()),
        ));
    }
}

pub type Dialog = UnlockCoordinator<RecordingForm, RecordingHost>;

/// A coordinator wired to a fresh event log
pub fn dialog() -> (Dialog, EventLog) {
    let log = EventLog::default();
    let form = RecordingForm {
        log: Arc::clone(&log),
        showing: None,
    };
    let host = RecordingHost {
        log: Arc::clone(&log),
    };
    (UnlockCoordinator::new(form, host), log)
}

/// Create a vault handle plus a typed handle for inspecting its outcomes
pub fn vault(name: &str) -> (TargetHandle, Arc<PathTarget>) {
    let target = Arc::new(PathTarget::new(format!("/vaults/{name}")));
    let handle: TargetHandle = target.clone();
    (handle, target)
}

pub fn path(name: &str) -> PathBuf {
    PathBuf::from(format!("/vaults/{name}"))
}

/// Drain the log
pub fn take(log: &EventLog) -> Vec<Event> {
    std::mem::take(&mut *log.lock())
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "oxcrypt_unlock=debug".into()),
        )
        .with_test_writer()
        .try_init();
}
