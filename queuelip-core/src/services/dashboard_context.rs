//! Dashboard window content selected by the `dashboard-context` event

use serde::Serialize;

use crate::error::{CoreError, CoreResult};
use crate::types::{accordion_group, Action, Document, ListenerId, Node, Selector, WindowRole};

/// Host event carrying the context tag
pub const DASHBOARD_CONTEXT_EVENT: &str = "dashboard-context";

const CONTENT_CLASS: &str = "dashboard-content";
const ACCORDION_CLASS: &str = "dashboard-accordion";
const CLOSE_BUTTON_ID: &str = "closeButton";

/// Panel rendered inside the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DashboardPanel {
    ClipboardMonitor,
    Clock,
    Placeholder,
}

impl DashboardPanel {
    /// `view-a` → clipboard monitor, `view-b` → clock, anything else → placeholder
    #[must_use]
    pub fn from_context(payload: &str) -> Self {
        match payload {
            "view-a" => Self::ClipboardMonitor,
            "view-b" => Self::Clock,
            _ => Self::Placeholder,
        }
    }

    #[must_use]
    pub fn template(self) -> Vec<Node> {
        let items = match self {
            Self::ClipboardMonitor => vec![
                (
                    "Clipboard Monitor".to_string(),
                    vec![
                        Node::new("p").text("Latest copied text:"),
                        Node::new("div").id("clipboard-content").text("Monitoring..."),
                        Node::new("button").id("refresh-clipboard").text("Refresh"),
                    ],
                    true,
                ),
                (
                    "Statistics".to_string(),
                    vec![
                        Node::new("p").text("Clipboard usage:"),
                        Node::new("ul").children([
                            stat_item("Monitoring since: ", "monitor-start-time", "-"),
                            stat_item("Updates: ", "update-count", "0"),
                            stat_item("Last update: ", "last-update", "-"),
                        ]),
                    ],
                    false,
                ),
            ],
            Self::Clock => vec![
                (
                    "Clock".to_string(),
                    vec![Node::new("div").class("clock").children([
                        Node::new("div").id("current-time").text("--:--:--"),
                        Node::new("div").id("current-date").text("----/--/--"),
                    ])],
                    true,
                ),
                (
                    "Time Settings".to_string(),
                    vec![Node::new("ul").children([
                        Node::new("li").text("Format: 24-hour"),
                        Node::new("li").text("Update interval: 1 second"),
                    ])],
                    false,
                ),
            ],
            Self::Placeholder => vec![(
                "Dashboard".to_string(),
                vec![
                    Node::new("p").text("Open the dashboard from view A or view B to see dedicated content."),
                    Node::new("ul").children([
                        Node::new("li").text("View A: clipboard monitor"),
                        Node::new("li").text("View B: clock"),
                    ]),
                ],
                true,
            )],
        };
        accordion_group(ACCORDION_CLASS, items)
    }
}

fn stat_item(label: &str, id: &str, initial: &str) -> Node {
    Node::new("li")
        .text(label)
        .child(Node::new("span").id(id).text(initial))
}

/// Document of the dashboard window
pub struct DashboardView {
    doc: Document,
    context: String,
    panel: DashboardPanel,
    close_listener: Option<ListenerId>,
}

impl Default for DashboardView {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardView {
    /// Dashboard with the placeholder panel and a wired close button
    #[must_use]
    pub fn new() -> Self {
        let doc = Document::from_nodes(&[Node::new("div")
            .class("dashboard-container")
            .children([
                Node::new("h1").text("Dashboard"),
                Node::new("div").class(CONTENT_CLASS),
                Node::new("button")
                    .id(CLOSE_BUTTON_ID)
                    .class("close-button")
                    .text("Close"),
            ])]);
        let mut view = Self {
            doc,
            context: "default".to_string(),
            panel: DashboardPanel::Placeholder,
            close_listener: None,
        };
        view.wire_close_button();
        view.fill(DashboardPanel::Placeholder);
        view
    }

    /// Apply a `dashboard-context` payload
    pub fn load_context(&mut self, payload: &str) -> CoreResult<DashboardPanel> {
        let panel = DashboardPanel::from_context(payload);
        if !self.fill(panel) {
            return Err(CoreError::ElementNotFound(format!(".{CONTENT_CLASS}")));
        }
        self.context = payload.to_string();
        log::info!("Dashboard content loaded for context: {payload} ({panel:?})");
        Ok(panel)
    }

    #[must_use]
    pub fn panel(&self) -> DashboardPanel {
        self.panel
    }

    #[must_use]
    pub fn context(&self) -> &str {
        &self.context
    }

    #[must_use]
    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Markup of the content region
    #[must_use]
    pub fn content_html(&self) -> String {
        self.content_region()
            .map(|region| self.doc.inner_html(region))
            .unwrap_or_default()
    }

    /// Actions fired by a click on the element with the given `id`
    pub fn click_by_id(&self, element_id: &str) -> CoreResult<Vec<Action>> {
        let element = self
            .doc
            .element_by_id(element_id)
            .ok_or_else(|| CoreError::ElementNotFound(element_id.to_string()))?;
        Ok(self.doc.click(element))
    }

    /// Actions bound to a key pressed in the dashboard
    #[must_use]
    pub fn key(&self, key: &str) -> Vec<Action> {
        Action::for_key(&WindowRole::Dashboard, key).into_iter().collect()
    }

    fn content_region(&self) -> Option<crate::types::ElementId> {
        self.doc
            .query_selector(self.doc.root(), &Selector::class(CONTENT_CLASS))
    }

    fn fill(&mut self, panel: DashboardPanel) -> bool {
        let Some(region) = self.content_region() else {
            log::warn!("Dashboard content region not found");
            return false;
        };
        self.doc.replace_children(region, &panel.template());
        self.panel = panel;
        true
    }

    fn wire_close_button(&mut self) {
        if let Some(listener) = self.close_listener.take() {
            self.doc.remove_listener(listener);
        }
        let Some(button) = self.doc.element_by_id(CLOSE_BUTTON_ID) else {
            return;
        };
        match self
            .doc
            .on_click(button, Action::CloseAuxiliary(WindowRole::Dashboard))
        {
            Ok(listener) => self.close_listener = Some(listener),
            Err(e) => log::warn!("Failed to wire dashboard close button: {e}"),
        }
    }
}
