//! View-mode preference types.
//!
//! A purely client-local flag selecting how the message graph is projected:
//! `chat` renders one root-to-leaf path linearly, `mind` renders the full
//! branching graph. Toggling never mutates the graph and carries no server
//! authority.

use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// How the client projects the message graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Linear projection of a single ancestry path.
    Chat,
    /// Full branching graph.
    Mind,
}

impl ViewMode {
    /// The other mode.
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Chat => ViewMode::Mind,
            ViewMode::Mind => ViewMode::Chat,
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewMode::Chat => write!(f, "chat"),
            ViewMode::Mind => write!(f, "mind"),
        }
    }
}

impl FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "chat" => Ok(ViewMode::Chat),
            "mind" => Ok(ViewMode::Mind),
            other => Err(format!("invalid view mode: '{other}'")),
        }
    }
}

impl Default for ViewMode {
    fn default() -> Self {
        ViewMode::Chat
    }
}

/// Persisted client preference wrapping the current mode.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModePreference {
    pub mode: ViewMode,
}
