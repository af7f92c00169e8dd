//! Listener actions

use serde::{Deserialize, Serialize};

use super::view::ViewId;
use super::window::WindowRole;

/// Key that closes the dashboard and mini windows
pub const CLOSE_KEY: &str = "Escape";

/// What a click on a wired element asks for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Action {
    /// Activate another view in the same window
    SwitchView(ViewId),
    /// Open (or un-hide) an auxiliary window
    #[serde(rename_all = "camelCase")]
    OpenAuxiliary {
        role: WindowRole,
        context: Option<String>,
    },
    /// Hide an auxiliary window and return to main
    CloseAuxiliary(WindowRole),
    /// Close a popup window and return to main
    ClosePopup(String),
    /// Plain message dialog
    ShowMessage(String),
}

impl Action {
    /// Action bound to a key press in the window of `role`
    ///
    /// Only the dashboard and mini windows bind a key: `Escape` closes them.
    #[must_use]
    pub fn for_key(role: &WindowRole, key: &str) -> Option<Self> {
        match role {
            WindowRole::Dashboard | WindowRole::Mini if key == CLOSE_KEY => {
                Some(Self::CloseAuxiliary(role.clone()))
            }
            _ => None,
        }
    }
}
