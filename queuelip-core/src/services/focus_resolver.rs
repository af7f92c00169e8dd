//! 焦点解析服务 - 视图激活时的初始焦点控制

use std::collections::HashMap;
use std::time::Duration;

use crate::error::CoreResult;
use crate::types::{
    Display, Document, Element, ElementId, FocusPolicyConfig, Selector, UiConfig, ViewId,
    Visibility, NAV_TABS_CLASS, NAV_TAB_CLASS,
};

/// How the focus target of a view is chosen
#[derive(Debug, Clone)]
pub enum FocusPolicy {
    /// Fixed `view -> selector` table; unmapped views get no focus
    StaticMap(HashMap<ViewId, Selector>),
    /// First visible focusable element outside the navigation tabs
    DynamicScan,
}

impl FocusPolicy {
    pub fn from_config(config: &FocusPolicyConfig) -> CoreResult<Self> {
        match config {
            FocusPolicyConfig::Dynamic => Ok(Self::DynamicScan),
            FocusPolicyConfig::Static { selectors } => {
                let mut map = HashMap::with_capacity(selectors.len());
                for (view, raw) in selectors {
                    map.insert(ViewId::new(view.as_str()), raw.parse::<Selector>()?);
                }
                Ok(Self::StaticMap(map))
            }
        }
    }
}

/// Resolves and applies the initial focus of a view
#[derive(Debug, Clone)]
pub struct FocusResolver {
    policy: FocusPolicy,
    settle_delay: Duration,
}

impl FocusResolver {
    #[must_use]
    pub fn new(policy: FocusPolicy, settle_delay: Duration) -> Self {
        Self {
            policy,
            settle_delay,
        }
    }

    pub fn from_config(config: &UiConfig) -> CoreResult<Self> {
        Ok(Self::new(
            FocusPolicy::from_config(&config.focus_policy)?,
            config.focus_delay(),
        ))
    }

    /// Delay between a view switch and the focus call
    #[must_use]
    pub fn settle_delay(&self) -> Duration {
        self.settle_delay
    }

    pub fn set_settle_delay(&mut self, delay: Duration) {
        self.settle_delay = delay;
        log::debug!("Focus delay set to: {}ms", delay.as_millis());
    }

    #[must_use]
    pub fn policy(&self) -> &FocusPolicy {
        &self.policy
    }

    /// Element that should receive focus when `view` activates
    ///
    /// Returns `None` (with a warning) when the view container is missing.
    #[must_use]
    pub fn resolve(&self, doc: &Document, view: &ViewId) -> Option<ElementId> {
        let Some(container) = doc.element_by_id(&view.container_id()) else {
            log::warn!("View container not found: {}", view.container_id());
            return None;
        };

        match &self.policy {
            FocusPolicy::StaticMap(map) => {
                let selector = map.get(view)?;
                doc.query_selector(container, selector)
            }
            FocusPolicy::DynamicScan => self
                .focusable_candidates(doc, container)
                .into_iter()
                .find(|&id| is_visible(doc, id)),
        }
    }

    /// Focusable, visible elements of `view` outside the tab region (diagnostics)
    #[must_use]
    pub fn focusable_elements(&self, doc: &Document, view: &ViewId) -> Vec<ElementId> {
        let Some(container) = doc.element_by_id(&view.container_id()) else {
            log::warn!("View container not found for debug: {}", view.container_id());
            return Vec::new();
        };
        self.focusable_candidates(doc, container)
            .into_iter()
            .filter(|&id| is_visible(doc, id))
            .collect()
    }

    /// Resolve and focus; failures are logged, never returned
    pub fn apply(&self, doc: &mut Document, view: &ViewId) -> Option<ElementId> {
        let Some(target) = self.resolve(doc, view) else {
            log::warn!("No focusable element found in view: {view}");
            return None;
        };
        match doc.focus(target) {
            Ok(()) => {
                if let Some(el) = doc.get(target) {
                    log::debug!("Focus set in view {view}: {}", el.describe());
                }
                Some(target)
            }
            Err(e) => {
                log::error!("Failed to set focus on element in view {view}: {e}");
                None
            }
        }
    }

    #[allow(clippy::unused_self)]
    fn focusable_candidates(&self, doc: &Document, container: ElementId) -> Vec<ElementId> {
        doc.descendants(container)
            .into_iter()
            .filter(|&id| doc.get(id).is_some_and(is_focusable))
            .filter(|&id| !is_within_nav_tabs(doc, id))
            .filter(|&id| !is_inert(doc, id))
            .collect()
    }
}

fn is_disabled(el: &Element) -> bool {
    el.has_attribute("disabled")
}

/// Focusable predicates: form controls, links, disclosure widgets, explicit
/// tab order and editable regions
fn is_focusable(el: &Element) -> bool {
    let tag = el.tag.to_ascii_lowercase();
    let by_tag = match tag.as_str() {
        "button" | "input" | "select" | "textarea" | "details" => !is_disabled(el),
        "a" | "area" => el.has_attribute("href"),
        "summary" => true,
        _ => false,
    };
    if by_tag {
        return true;
    }
    let tab_order = el
        .attribute("tabindex")
        .and_then(|v| v.trim().parse::<i32>().ok())
        .is_some_and(|order| order >= 0);
    if tab_order && !is_disabled(el) {
        return true;
    }
    el.attribute("contenteditable") == Some("true")
}

fn is_within_nav_tabs(doc: &Document, id: ElementId) -> bool {
    doc.ancestors_or_self(id)
        .into_iter()
        .filter_map(|cur| doc.get(cur))
        .any(|el| el.has_class(NAV_TABS_CLASS))
        || doc.get(id).is_some_and(|el| el.has_class(NAV_TAB_CLASS))
}

fn is_inert(doc: &Document, id: ElementId) -> bool {
    doc.ancestors_or_self(id)
        .into_iter()
        .filter_map(|cur| doc.get(cur))
        .any(|el| el.has_attribute("inert"))
}

/// Non-zero box, not `display:none` (self or ancestor), not
/// `visibility:hidden`, opacity not zero
fn is_visible(doc: &Document, id: ElementId) -> bool {
    let Some(el) = doc.get(id) else {
        return false;
    };
    if el.layout.is_empty() || el.style.opacity <= 0.0 {
        return false;
    }
    doc.ancestors_or_self(id)
        .into_iter()
        .filter_map(|cur| doc.get(cur))
        .all(|node| node.style.display != Display::None && node.style.visibility != Visibility::Hidden)
}
