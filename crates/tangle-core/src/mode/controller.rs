//! View-mode controller over an injected preference store.
//!
//! The mode ("chat" vs "mind") only determines how graph query results are
//! rendered client-side; it never mutates the graph and carries no server
//! authority. The store is dependency-injected and scoped to one client
//! session -- there is no process-wide mutable singleton.

use tangle_types::mode::{ModePreference, ViewMode};
use thiserror::Error;

/// Errors from loading or persisting the mode preference.
#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("io error: {0}")]
    Io(String),

    #[error("malformed preference data: {0}")]
    Malformed(String),
}

/// Persistence seam for the client's last-chosen mode.
///
/// Implementations live in tangle-infra (e.g. a JSON file next to the data
/// directory). Synchronous: preference IO is tiny and client-local.
pub trait PreferenceStore {
    /// Load the persisted preference, `None` if never saved.
    fn load(&self) -> Result<Option<ModePreference>, PreferenceError>;

    /// Persist the preference so it survives reloads.
    fn save(&self, preference: &ModePreference) -> Result<(), PreferenceError>;
}

/// Toggle between linear "chat" and graph "mind" projections.
pub struct ModeController<P: PreferenceStore> {
    store: P,
    current: ModePreference,
}

impl<P: PreferenceStore> ModeController<P> {
    /// Create a controller, restoring the last persisted mode if present.
    pub fn new(store: P) -> Result<Self, PreferenceError> {
        let current = store.load()?.unwrap_or_default();
        Ok(Self { store, current })
    }

    /// Create a controller with an explicit starting preference, skipping the
    /// load. This is the recovery path when the persisted data is malformed:
    /// the caller warns and starts over from a known mode, and the next save
    /// replaces the bad data.
    pub fn starting_from(store: P, current: ModePreference) -> Self {
        Self { store, current }
    }

    /// The currently selected mode.
    pub fn mode(&self) -> ViewMode {
        self.current.mode
    }

    /// Select a mode explicitly and persist it.
    pub fn set_mode(&mut self, mode: ViewMode) -> Result<ModePreference, PreferenceError> {
        self.current.mode = mode;
        self.store.save(&self.current)?;
        Ok(self.current.clone())
    }

    /// Flip to the other mode and persist it.
    pub fn toggle(&mut self) -> Result<ModePreference, PreferenceError> {
        let next = self.current.mode.toggled();
        self.set_mode(next)
    }
}
