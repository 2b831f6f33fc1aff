//! File-backed view-mode preference store.
//!
//! Persists the client's last-chosen view mode as a small JSON file, by
//! default next to the SQLite database under the data directory. A missing
//! file means "never saved"; unreadable JSON is surfaced as `Malformed` so
//! the caller can fall back to the default mode explicitly.

use std::path::{Path, PathBuf};

use tangle_core::mode::controller::{PreferenceError, PreferenceStore};
use tangle_types::mode::ModePreference;
use tracing::warn;

/// Stores the mode preference as JSON at a fixed path.
pub struct FilePreferenceStore {
    path: PathBuf,
}

impl FilePreferenceStore {
    /// Create a store backed by the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default store location inside the data directory.
    pub fn in_data_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join("view_mode.json"))
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn load(&self) -> Result<Option<ModePreference>, PreferenceError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(PreferenceError::Io(e.to_string())),
        };

        let preference = serde_json::from_str(&contents).map_err(|e| {
            warn!(path = %self.path.display(), error = %e, "malformed mode preference file");
            PreferenceError::Malformed(e.to_string())
        })?;

        Ok(Some(preference))
    }

    fn save(&self, preference: &ModePreference) -> Result<(), PreferenceError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| PreferenceError::Io(e.to_string()))?;
        }

        let contents = serde_json::to_string_pretty(preference)
            .map_err(|e| PreferenceError::Malformed(e.to_string()))?;
        std::fs::write(&self.path, contents).map_err(|e| PreferenceError::Io(e.to_string()))
    }
}
