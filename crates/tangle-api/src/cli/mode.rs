//! `tangle mode` implementation.
//!
//! The view mode ("chat" vs "mind") is a client-side rendering choice with no
//! server authority, so it lives in a preference file under the data
//! directory rather than in the database.

use tangle_core::mode::controller::{ModeController, PreferenceError};
use tangle_infra::preference::FilePreferenceStore;
use tangle_types::mode::{ModePreference, ViewMode};

use crate::state::resolve_data_dir;

/// Show, set, or toggle the persisted view mode.
///
/// A malformed preference file is not fatal: warn and fall back to the
/// default mode, letting the next save overwrite the bad data.
pub fn mode(set: Option<ViewMode>, toggle: bool) -> anyhow::Result<()> {
    let data_dir = resolve_data_dir();
    let store = FilePreferenceStore::in_data_dir(&data_dir);
    let mut controller = match ModeController::new(store) {
        Ok(controller) => controller,
        Err(PreferenceError::Malformed(reason)) => {
            eprintln!("Warning: ignoring malformed preference file ({reason}); using default mode");
            ModeController::starting_from(
                FilePreferenceStore::in_data_dir(&data_dir),
                ModePreference::default(),
            )
        }
        Err(e) => return Err(anyhow::anyhow!("preference store: {e}")),
    };

    let current = match (set, toggle) {
        (Some(mode), _) => {
            controller
                .set_mode(mode)
                .map_err(|e| anyhow::anyhow!("preference store: {e}"))?
                .mode
        }
        (None, true) => {
            controller
                .toggle()
                .map_err(|e| anyhow::anyhow!("preference store: {e}"))?
                .mode
        }
        (None, false) => controller.mode(),
    };

    println!("{current}");
    Ok(())
}
