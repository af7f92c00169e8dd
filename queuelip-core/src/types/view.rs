//! View type definitions

use std::fmt;

use serde::{Deserialize, Serialize};

use super::template::Node;

/// Class of the navigation tab region
pub const NAV_TABS_CLASS: &str = "nav-tabs";
/// Class of a single navigation tab
pub const NAV_TAB_CLASS: &str = "nav-tab";
/// Attribute binding a tab to its view
pub const DATA_VIEW_ATTR: &str = "data-view";
/// Class common to every view container
pub const VIEW_CLASS: &str = "view";
/// Class marking the active view and tab
pub const ACTIVE_CLASS: &str = "active";
/// Transient class applied while a view animates in
pub const ENTERING_CLASS: &str = "fade-in";

/// View identifier (`main`, `a`, `b`, `c`, ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewId(String);

impl ViewId {
    /// Id of the view whose markup ships with the host document
    pub const MAIN: &'static str = "main";

    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn main() -> Self {
        Self::new(Self::MAIN)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_main(&self) -> bool {
        self.0 == Self::MAIN
    }

    /// Element id of the view container (`view-<id>`)
    #[must_use]
    pub fn container_id(&self) -> String {
        format!("view-{}", self.0)
    }

    /// Dashboard context tag sent when this view opens an auxiliary window
    #[must_use]
    pub fn context_tag(&self) -> String {
        format!("view-{}", self.0)
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ViewId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Where a view's markup comes from
#[derive(Debug, Clone, PartialEq)]
pub enum ViewContent {
    /// Markup already present in the host document
    Static,
    /// Markup injected on every render
    Template(Vec<Node>),
}

/// Activation status of one view, as reported to the webview
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewStatus {
    pub id: ViewId,
    pub is_active: bool,
    /// `None` when the view has no tab bound to it
    pub tab_active: Option<bool>,
    pub inert: bool,
}

/// State of a window's views after a switch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewSnapshot {
    pub active: ViewId,
    pub views: Vec<ViewStatus>,
    /// Markup of the active view container
    pub html: String,
    /// Selector describing the focused element, if any
    pub focused: Option<String>,
}
