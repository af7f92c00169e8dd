//! Window type definitions

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Role a host window plays
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum WindowRole {
    Main,
    Dashboard,
    Mini,
    /// One-off popup, keyed by its type (`A`, `B`, ...)
    Popup(String),
}

impl WindowRole {
    /// Host label of the window (`main`, `dashboard`, `mini`, `popupA`)
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Main => "main".to_string(),
            Self::Dashboard => "dashboard".to_string(),
            Self::Mini => "mini".to_string(),
            Self::Popup(kind) => format!("popup{kind}"),
        }
    }

    /// Role for a host label; unknown labels starting with `popup` are popups
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "main" => Some(Self::Main),
            "dashboard" => Some(Self::Dashboard),
            "mini" => Some(Self::Mini),
            other => other
                .strip_prefix("popup")
                .filter(|kind| !kind.is_empty())
                .map(|kind| Self::Popup(kind.to_string())),
        }
    }

    #[must_use]
    pub fn is_auxiliary(&self) -> bool {
        !matches!(self, Self::Main)
    }

    /// Page loaded into a popup window
    #[must_use]
    pub fn popup_url(&self) -> Option<String> {
        match self {
            Self::Popup(kind) => Some(format!("popup{kind}.html")),
            _ => None,
        }
    }

    /// Window title used when the host creates the window
    #[must_use]
    pub fn title(&self) -> String {
        match self {
            Self::Main => "Queuelip".to_string(),
            Self::Dashboard => "Dashboard".to_string(),
            Self::Mini => "Mini".to_string(),
            Self::Popup(kind) => format!("Popup {kind}"),
        }
    }
}

impl fmt::Display for WindowRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Main => f.write_str("main"),
            Self::Dashboard => f.write_str("dashboard"),
            Self::Mini => f.write_str("mini"),
            Self::Popup(kind) => write!(f, "popup:{kind}"),
        }
    }
}

impl FromStr for WindowRole {
    type Err = CoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "main" => Ok(Self::Main),
            "dashboard" => Ok(Self::Dashboard),
            "mini" => Ok(Self::Mini),
            other => other
                .strip_prefix("popup:")
                .filter(|kind| !kind.is_empty())
                .map(|kind| Self::Popup(kind.to_string()))
                .ok_or_else(|| CoreError::ValidationError(format!("Unknown window role: {raw}"))),
        }
    }
}

impl From<WindowRole> for String {
    fn from(role: WindowRole) -> Self {
        role.to_string()
    }
}

impl TryFrom<String> for WindowRole {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Last commanded visibility of a window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WindowVisibility {
    Visible,
    Hidden,
    /// Closed, or never created
    #[default]
    Closed,
}

/// Coordinator's record of a host window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowHandle {
    pub label: String,
    pub role: WindowRole,
    pub visibility: WindowVisibility,
}

impl WindowHandle {
    #[must_use]
    pub fn new(role: WindowRole, visibility: WindowVisibility) -> Self {
        Self {
            label: role.label(),
            role,
            visibility,
        }
    }
}

/// Popup type from a page path: `/popupA.html` → `A`
///
/// Returns `None` when the file name is not `popup<type>...`.
#[must_use]
pub fn popup_type_from_path(path: &str) -> Option<String> {
    let filename = path.rsplit('/').next().unwrap_or(path);
    let rest = filename.strip_prefix("popup")?;
    rest.chars().next().map(|c| c.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip_through_from_label() {
        for role in [
            WindowRole::Main,
            WindowRole::Dashboard,
            WindowRole::Mini,
            WindowRole::Popup("B".into()),
        ] {
            assert_eq!(WindowRole::from_label(&role.label()), Some(role));
        }
        assert_eq!(WindowRole::from_label("popup"), None);
        assert_eq!(WindowRole::from_label("settings"), None);
    }

    #[test]
    fn role_serializes_as_string() {
        let json = serde_json::to_value(WindowRole::Popup("A".into())).unwrap();
        assert_eq!(json, "popup:A");
        let role: WindowRole = serde_json::from_value(serde_json::json!("mini")).unwrap();
        assert_eq!(role, WindowRole::Mini);
        assert!(serde_json::from_value::<WindowRole>(serde_json::json!("tray")).is_err());
    }

    #[test]
    fn popup_type_is_the_character_after_prefix() {
        assert_eq!(popup_type_from_path("/popupA.html"), Some("A".into()));
        assert_eq!(popup_type_from_path("popupC.html"), Some("C".into()));
        assert_eq!(popup_type_from_path("/index.html"), None);
        assert_eq!(popup_type_from_path("/popup"), None);
    }

    #[test]
    fn popup_url_only_for_popups() {
        assert_eq!(
            WindowRole::Popup("A".into()).popup_url().as_deref(),
            Some("popupA.html")
        );
        assert_eq!(WindowRole::Dashboard.popup_url(), None);
    }
}
