//! View switcher - active view state machine of one window

use std::collections::HashMap;
use std::time::Duration;

use crate::error::{CoreError, CoreResult};
use crate::types::{
    Action, Document, ElementId, ListenerId, Node, Selector, UiConfig, ViewId, ViewSnapshot,
    ViewStatus, ACTIVE_CLASS, DATA_VIEW_ATTR, ENTERING_CLASS, NAV_TABS_CLASS, NAV_TAB_CLASS,
    VIEW_CLASS,
};

use super::focus_resolver::FocusResolver;
use super::view_registry::ViewRegistry;

/// Legacy buttons of the main view and the views they open
const LEGACY_BUTTONS: &[(&str, &str)] = &[("buttonA", "a"), ("buttonB", "b"), ("buttonC", "c")];

/// Deferred work produced by a transition
///
/// The caller sleeps for `delay()` and hands the task back to
/// [`ViewSwitcher::fire`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduledTask {
    /// Place focus in `view` if it is still active
    Focus {
        view: ViewId,
        generation: u64,
        delay: Duration,
    },
    /// Drop a transient class from the view container
    RemoveClass {
        view: ViewId,
        class: String,
        generation: u64,
        delay: Duration,
    },
}

impl ScheduledTask {
    #[must_use]
    pub fn delay(&self) -> Duration {
        match self {
            Self::Focus { delay, .. } | Self::RemoveClass { delay, .. } => *delay,
        }
    }

    #[must_use]
    pub fn view(&self) -> &ViewId {
        match self {
            Self::Focus { view, .. } | Self::RemoveClass { view, .. } => view,
        }
    }
}

/// Committed view transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub from: ViewId,
    pub to: ViewId,
    pub generation: u64,
    pub scheduled: Vec<ScheduledTask>,
}

/// Result of dispatching a click
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClickOutcome {
    /// Transitions committed by `SwitchView` listeners
    pub transitions: Vec<Transition>,
    /// Actions the switcher does not handle itself (windows, messages)
    pub actions: Vec<Action>,
}

/// Active view state machine of one window
///
/// Owns the window's document, its view registry and its focus resolver.
/// Exactly one registered view is active at any time.
pub struct ViewSwitcher {
    doc: Document,
    registry: ViewRegistry,
    focus: FocusResolver,
    enter_animation: Duration,
    active: ViewId,
    generation: u64,
    entered: HashMap<ViewId, u64>,
    nav_listeners: Vec<ListenerId>,
}

impl ViewSwitcher {
    /// Create a switcher over an existing document; `main` starts active
    #[must_use]
    pub fn new(
        doc: Document,
        registry: ViewRegistry,
        focus: FocusResolver,
        enter_animation: Duration,
    ) -> Self {
        Self {
            doc,
            registry,
            focus,
            enter_animation,
            active: ViewId::main(),
            generation: 0,
            entered: HashMap::new(),
            nav_listeners: Vec::new(),
        }
    }

    /// Main window switcher: built-in views, default layout, initialized
    pub fn from_config(config: &UiConfig) -> CoreResult<Self> {
        let mut switcher = Self::new(
            main_window_document(),
            ViewRegistry::with_builtin_views(),
            FocusResolver::from_config(config)?,
            config.enter_animation(),
        );
        switcher.initialize();
        Ok(switcher)
    }

    /// Activate `main`, isolate every other view and wire navigation controls
    pub fn initialize(&mut self) {
        self.active = ViewId::main();
        for id in self.registry.view_ids().to_vec() {
            if id.is_main() {
                self.activate(&id);
            } else {
                self.deactivate(&id);
            }
        }
        self.wire_navigation();
        log::info!("View switcher initialized, active view: {}", self.active);
    }

    /// Switch the window to `target`
    ///
    /// Unregistered views and missing containers leave the current view
    /// active. Switching to the active view re-renders it.
    pub fn switch_view(&mut self, target: &ViewId) -> CoreResult<Transition> {
        if !self.registry.contains(target) {
            log::warn!("Cannot switch to unregistered view: {target}");
            return Err(CoreError::ViewNotFound(target.to_string()));
        }
        let container_id = target.container_id();
        if self.doc.element_by_id(&container_id).is_none() {
            log::warn!("Cannot switch to {target}: container {container_id} not found");
            return Err(CoreError::ContainerNotFound(container_id));
        }

        let from = self.active.clone();
        log::debug!("Switching view: {from} -> {target}");

        self.deactivate(&from);
        self.registry.teardown(&mut self.doc, &from);

        // Teardown hooks may have detached the target container
        if !self.registry.render(&mut self.doc, target, &container_id) {
            log::error!("Render failed for {target}, restoring {from}");
            let restore_container = from.container_id();
            self.registry.render(&mut self.doc, &from, &restore_container);
            self.activate(&from);
            return Err(CoreError::RenderFailed(target.to_string()));
        }

        self.activate(target);
        self.active = target.clone();
        self.generation += 1;
        let generation = self.generation;

        let mut scheduled = Vec::with_capacity(2);
        if let Some(container) = self.doc.element_by_id(&container_id) {
            self.doc.add_class(container, ENTERING_CLASS);
            self.entered.insert(target.clone(), generation);
            scheduled.push(ScheduledTask::RemoveClass {
                view: target.clone(),
                class: ENTERING_CLASS.to_string(),
                generation,
                delay: self.enter_animation,
            });
        }
        scheduled.push(ScheduledTask::Focus {
            view: target.clone(),
            generation,
            delay: self.focus.settle_delay(),
        });

        log::info!("Switched to view: {target}");
        Ok(Transition {
            from,
            to: target.clone(),
            generation,
            scheduled,
        })
    }

    /// Run a task produced by an earlier transition
    ///
    /// Returns whether the task acted. Focus for a view that is no longer
    /// active, and class removal superseded by a later entry, are skipped.
    pub fn fire(&mut self, task: &ScheduledTask) -> bool {
        match task {
            ScheduledTask::Focus { view, .. } => {
                if *view != self.active {
                    log::debug!("Skipping focus for inactive view: {view}");
                    return false;
                }
                self.focus.apply(&mut self.doc, view).is_some()
            }
            ScheduledTask::RemoveClass {
                view,
                class,
                generation,
                ..
            } => {
                if self.entered.get(view) != Some(generation) {
                    return false;
                }
                match self.doc.element_by_id(&view.container_id()) {
                    Some(container) => {
                        self.doc.remove_class(container, class);
                        true
                    }
                    None => false,
                }
            }
        }
    }

    /// Dispatch a click on `element`
    ///
    /// View switches are handled here; other actions go back to the caller.
    pub fn click(&mut self, element: ElementId) -> ClickOutcome {
        let mut outcome = ClickOutcome::default();
        for action in self.doc.click(element) {
            match action {
                Action::SwitchView(view) => match self.switch_view(&view) {
                    Ok(transition) => outcome.transitions.push(transition),
                    Err(e) => log::warn!("View switch from click ignored: {e}"),
                },
                other => outcome.actions.push(other),
            }
        }
        outcome
    }

    /// Dispatch a click on the element with the given `id`
    pub fn click_by_id(&mut self, element_id: &str) -> CoreResult<ClickOutcome> {
        let element = self
            .doc
            .element_by_id(element_id)
            .ok_or_else(|| CoreError::ElementNotFound(element_id.to_string()))?;
        Ok(self.click(element))
    }

    /// Switch by clicking the navigation tab bound to `name`
    pub fn show_view(&mut self, name: &str) -> CoreResult<ClickOutcome> {
        let Some(tab) = self.tab_for(&ViewId::new(name)) else {
            log::warn!("No navigation tab for view: {name}");
            return Err(CoreError::ElementNotFound(format!(
                ".{NAV_TAB_CLASS}[{DATA_VIEW_ATTR}=\"{name}\"]"
            )));
        };
        Ok(self.click(tab))
    }

    #[must_use]
    pub fn active_view(&self) -> &ViewId {
        &self.active
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    #[must_use]
    pub fn registry(&self) -> &ViewRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ViewRegistry {
        &mut self.registry
    }

    #[must_use]
    pub fn focus_resolver(&self) -> &FocusResolver {
        &self.focus
    }

    /// `#id` or `tag.class` of the focused element
    #[must_use]
    pub fn focused_selector(&self) -> Option<String> {
        self.doc
            .focused()
            .and_then(|id| self.doc.get(id))
            .map(crate::types::Element::describe)
    }

    /// Per-view activation state
    #[must_use]
    pub fn statuses(&self) -> Vec<ViewStatus> {
        self.registry
            .view_ids()
            .iter()
            .map(|id| {
                let container = self.doc.element_by_id(&id.container_id());
                ViewStatus {
                    id: id.clone(),
                    is_active: *id == self.active,
                    tab_active: self
                        .tab_for(id)
                        .map(|tab| self.doc.has_class(tab, ACTIVE_CLASS)),
                    inert: container.is_some_and(|c| self.doc.attribute(c, "inert").is_some()),
                }
            })
            .collect()
    }

    #[must_use]
    pub fn snapshot(&self) -> ViewSnapshot {
        let html = self
            .doc
            .element_by_id(&self.active.container_id())
            .map(|container| self.doc.inner_html(container))
            .unwrap_or_default();
        ViewSnapshot {
            active: self.active.clone(),
            views: self.statuses(),
            html,
            focused: self.focused_selector(),
        }
    }

    /// Markup of the whole window body
    #[must_use]
    pub fn document_html(&self) -> String {
        self.doc.inner_html(self.doc.root())
    }

    fn tab_for(&self, view: &ViewId) -> Option<ElementId> {
        let selector = Selector::class(NAV_TAB_CLASS).with_attribute(DATA_VIEW_ATTR, view.as_str());
        self.doc.query_selector(self.doc.root(), &selector)
    }

    fn wire_navigation(&mut self) {
        for listener in self.nav_listeners.drain(..) {
            self.doc.remove_listener(listener);
        }

        let root = self.doc.root();
        let tabs = self
            .doc
            .query_selector_all(root, &Selector::class(NAV_TAB_CLASS));
        let mut wiring: Vec<(ElementId, ViewId)> = tabs
            .into_iter()
            .filter_map(|tab| {
                self.doc
                    .attribute(tab, DATA_VIEW_ATTR)
                    .map(|view| (tab, ViewId::new(view)))
            })
            .collect();
        for (button_id, view) in LEGACY_BUTTONS {
            if let Some(button) = self.doc.element_by_id(button_id) {
                wiring.push((button, ViewId::new(*view)));
            }
        }

        for (element, view) in wiring {
            match self.doc.on_click(element, Action::SwitchView(view)) {
                Ok(listener) => self.nav_listeners.push(listener),
                Err(e) => log::warn!("Failed to wire navigation control: {e}"),
            }
        }
        log::debug!("Wired {} navigation controls", self.nav_listeners.len());
    }

    /// Mark `view` and its tab active; every other view and tab inactive
    fn activate(&mut self, view: &ViewId) {
        let root = self.doc.root();
        for tab in self
            .doc
            .query_selector_all(root, &Selector::class(NAV_TAB_CLASS))
        {
            let bound = self.doc.attribute(tab, DATA_VIEW_ATTR) == Some(view.as_str());
            if bound {
                self.doc.add_class(tab, ACTIVE_CLASS);
            } else {
                self.doc.remove_class(tab, ACTIVE_CLASS);
            }
        }

        let target = self.doc.element_by_id(&view.container_id());
        for container in self
            .doc
            .query_selector_all(root, &Selector::class(VIEW_CLASS))
        {
            if Some(container) != target {
                self.doc.remove_class(container, ACTIVE_CLASS);
            }
        }
        if let Some(container) = target {
            self.doc.add_class(container, ACTIVE_CLASS);
            self.doc.remove_attribute(container, "inert");
            self.doc.remove_attribute(container, "aria-hidden");
            self.doc.remove_attribute(container, "tabindex");
        }
    }

    /// Mark `view` and its tab inactive and isolate its subtree
    fn deactivate(&mut self, view: &ViewId) {
        if let Some(tab) = self.tab_for(view) {
            self.doc.remove_class(tab, ACTIVE_CLASS);
        }
        if let Some(container) = self.doc.element_by_id(&view.container_id()) {
            self.doc.remove_class(container, ACTIVE_CLASS);
            self.doc.remove_class(container, ENTERING_CLASS);
            self.doc.set_attribute(container, "inert", "");
            self.doc.set_attribute(container, "aria-hidden", "true");
            self.doc.set_attribute(container, "tabindex", "-1");
            self.doc.blur_within(container);
        }
    }
}

/// Host document of the main window: navigation tabs, the static `main`
/// view and empty containers for the templated views
#[must_use]
pub fn main_window_document() -> Document {
    let tab = |view: &str, label: &str| {
        Node::new("button")
            .class(NAV_TAB_CLASS)
            .attr(DATA_VIEW_ATTR, view)
            .text(label)
    };
    let legacy = |id: &str, label: &str| Node::new("button").id(id).class("view-button").text(label);

    Document::from_nodes(&[
        Node::new("nav").class(NAV_TABS_CLASS).children([
            tab("main", "Main"),
            tab("a", "A"),
            tab("b", "B"),
            tab("c", "C"),
        ]),
        Node::new("div")
            .id("view-main")
            .class(VIEW_CLASS)
            .children([
                Node::new("h1").text("Queuelip"),
                Node::new("div").class("button-row").children([
                    legacy("buttonA", "A"),
                    legacy("buttonB", "B"),
                    legacy("buttonC", "C"),
                ]),
                Node::new("details").children([
                    Node::new("summary")
                        .class("focus-control-main")
                        .text("Details"),
                    Node::new("div")
                        .class("accordion-content")
                        .child(Node::new("p").text("Switch views with the tabs or the buttons above.")),
                ]),
            ]),
        Node::new("div").id("view-a").class(VIEW_CLASS),
        Node::new("div").id("view-b").class(VIEW_CLASS),
        Node::new("div").id("view-c").class(VIEW_CLASS),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::services::focus_resolver::FocusPolicy;
    use crate::services::view_registry::{ViewHook, ViewScope};
    use crate::types::{ViewContent, WindowRole};

    fn switcher() -> ViewSwitcher {
        ViewSwitcher::from_config(&UiConfig::default()).unwrap()
    }

    fn fire_all(switcher: &mut ViewSwitcher, transition: &Transition) {
        for task in &transition.scheduled {
            switcher.fire(task);
        }
    }

    fn active_views(switcher: &ViewSwitcher) -> Vec<String> {
        switcher
            .statuses()
            .into_iter()
            .filter(|s| s.is_active)
            .map(|s| s.id.to_string())
            .collect()
    }

    fn containers_with_active_class(switcher: &ViewSwitcher) -> usize {
        let doc = switcher.document();
        doc.query_selector_all(doc.root(), &Selector::class(VIEW_CLASS))
            .into_iter()
            .filter(|&c| doc.has_class(c, ACTIVE_CLASS))
            .count()
    }

    #[test]
    fn starts_on_main_with_others_isolated() {
        let s = switcher();
        assert_eq!(s.active_view(), &ViewId::main());
        for status in s.statuses() {
            assert_eq!(status.is_active, status.id.is_main());
            assert_eq!(status.tab_active, Some(status.id.is_main()));
            assert_eq!(status.inert, !status.id.is_main());
        }
    }

    #[test]
    fn every_switch_leaves_exactly_one_active_view() {
        let mut s = switcher();
        for view in ["a", "b", "c", "main", "b", "b"] {
            s.switch_view(&ViewId::from(view)).unwrap();
            assert_eq!(active_views(&s), vec![view.to_string()]);
            assert_eq!(containers_with_active_class(&s), 1);
            let tabs: Vec<_> = s
                .statuses()
                .into_iter()
                .filter(|st| st.tab_active == Some(true))
                .map(|st| st.id.to_string())
                .collect();
            assert_eq!(tabs, vec![view.to_string()]);
        }
    }

    #[test]
    fn unregistered_view_leaves_state_unchanged() {
        let mut s = switcher();
        s.switch_view(&ViewId::from("a")).unwrap();
        let before = s.snapshot();

        let err = s.switch_view(&ViewId::from("zzz")).unwrap_err();
        assert!(matches!(err, CoreError::ViewNotFound(_)));
        assert_eq!(s.snapshot(), before);
    }

    #[test]
    fn missing_container_leaves_state_unchanged() {
        let mut s = switcher();
        s.registry_mut()
            .add_template(ViewId::from("d"), vec![Node::new("p").text("D")]);
        let before = s.snapshot();

        let err = s.switch_view(&ViewId::from("d")).unwrap_err();
        assert!(matches!(err, CoreError::ContainerNotFound(_)));
        assert_eq!(s.active_view(), &ViewId::main());
        assert_eq!(s.snapshot(), before);
    }

    #[test]
    fn container_detached_by_teardown_fails_without_switching() {
        let mut s = switcher();
        let detach_all: ViewHook = Arc::new(|scope: &mut ViewScope<'_>| {
            let doc = scope.document_mut();
            let root = doc.root();
            doc.clear_children(root);
            Ok(())
        });
        s.registry_mut().register(
            ViewId::from("a"),
            ViewContent::Template(vec![Node::new("p").text("A")]),
            None,
            Some(detach_all),
        );
        s.switch_view(&ViewId::from("a")).unwrap();
        let generation = s.generation();

        let err = s.switch_view(&ViewId::from("b")).unwrap_err();
        assert!(matches!(err, CoreError::RenderFailed(_)));
        assert_eq!(s.active_view(), &ViewId::from("a"));
        assert_eq!(s.generation(), generation);
    }

    #[test]
    fn repeated_switches_reuse_arena_slots() {
        let mut s = switcher();
        s.switch_view(&ViewId::from("a")).unwrap();
        s.switch_view(&ViewId::from("b")).unwrap();
        let capacity = s.document().capacity();
        let live = s.document().len();

        for _ in 0..50 {
            s.switch_view(&ViewId::from("a")).unwrap();
            s.switch_view(&ViewId::from("b")).unwrap();
        }
        assert_eq!(s.document().capacity(), capacity);
        assert_eq!(s.document().len(), live);
        let button = s.document().element_by_id("popButtonB").unwrap();
        assert!(button.index() < capacity);
    }

    #[test]
    fn outgoing_view_is_isolated_and_target_released() {
        let mut s = switcher();
        s.switch_view(&ViewId::from("a")).unwrap();
        let doc = s.document();
        let main = doc.element_by_id("view-main").unwrap();
        let a = doc.element_by_id("view-a").unwrap();

        assert_eq!(doc.attribute(main, "inert"), Some(""));
        assert_eq!(doc.attribute(main, "aria-hidden"), Some("true"));
        assert_eq!(doc.attribute(main, "tabindex"), Some("-1"));
        assert!(doc.attribute(a, "inert").is_none());
        assert!(doc.attribute(a, "tabindex").is_none());
    }

    #[test]
    fn entering_class_is_transient() {
        let mut s = switcher();
        let t = s.switch_view(&ViewId::from("a")).unwrap();
        let a = s.document().element_by_id("view-a").unwrap();
        assert!(s.document().has_class(a, ENTERING_CLASS));

        let remove = t
            .scheduled
            .iter()
            .find(|task| matches!(task, ScheduledTask::RemoveClass { .. }))
            .unwrap();
        assert_eq!(remove.delay(), Duration::from_millis(300));
        assert!(s.fire(remove));
        assert!(!s.document().has_class(a, ENTERING_CLASS));
    }

    #[test]
    fn stale_class_removal_does_not_strip_reentered_view() {
        let mut s = switcher();
        let first = s.switch_view(&ViewId::from("a")).unwrap();
        s.switch_view(&ViewId::from("b")).unwrap();
        s.switch_view(&ViewId::from("a")).unwrap();

        let stale = first
            .scheduled
            .iter()
            .find(|task| matches!(task, ScheduledTask::RemoveClass { .. }))
            .unwrap();
        assert!(!s.fire(stale));
        let a = s.document().element_by_id("view-a").unwrap();
        assert!(s.document().has_class(a, ENTERING_CLASS));
    }

    #[test]
    fn late_focus_timer_for_previous_view_is_ignored() {
        let mut s = switcher();
        let to_a = s.switch_view(&ViewId::from("a")).unwrap();
        let to_b = s.switch_view(&ViewId::from("b")).unwrap();

        fire_all(&mut s, &to_a);
        assert!(s.document().focused().is_none());
        fire_all(&mut s, &to_b);

        let focused = s.document().focused().unwrap();
        let view_b = s.document().element_by_id("view-b").unwrap();
        assert!(s.document().is_within(focused, view_b));
        assert_eq!(s.focused_selector().as_deref(), Some("#popButtonB"));
    }

    #[test]
    fn focus_on_main_lands_on_first_view_button() {
        let mut s = switcher();
        s.switch_view(&ViewId::from("a")).unwrap();
        let back = s.switch_view(&ViewId::main()).unwrap();
        fire_all(&mut s, &back);
        assert_eq!(s.focused_selector().as_deref(), Some("#buttonA"));
    }

    #[test]
    fn switching_away_blurs_the_outgoing_view() {
        let mut s = switcher();
        let t = s.switch_view(&ViewId::from("a")).unwrap();
        fire_all(&mut s, &t);
        assert!(s.document().focused().is_some());

        s.switch_view(&ViewId::from("c")).unwrap();
        assert!(s.document().focused().is_none());
    }

    #[test]
    fn reentrant_switch_rerenders_without_duplicate_listeners() {
        let mut s = switcher();
        s.switch_view(&ViewId::from("a")).unwrap();
        let first = s.generation();
        s.switch_view(&ViewId::from("a")).unwrap();
        assert_eq!(s.generation(), first + 1);

        let outcome = s.click_by_id("popButtonA").unwrap();
        assert_eq!(
            outcome.actions,
            vec![Action::OpenAuxiliary {
                role: WindowRole::Dashboard,
                context: Some("view-a".to_string()),
            }]
        );
        assert!(outcome.transitions.is_empty());
    }

    #[test]
    fn tab_and_legacy_button_clicks_switch_views() {
        let mut s = switcher();
        let outcome = s.click_by_id("buttonB").unwrap();
        assert_eq!(outcome.transitions.len(), 1);
        assert_eq!(s.active_view(), &ViewId::from("b"));

        let outcome = s.show_view("c").unwrap();
        assert_eq!(outcome.transitions[0].from, ViewId::from("b"));
        assert_eq!(s.active_view(), &ViewId::from("c"));

        assert!(s.show_view("zzz").is_err());
        assert_eq!(s.active_view(), &ViewId::from("c"));
    }

    #[test]
    fn snapshot_reports_active_markup() {
        let mut s = switcher();
        s.switch_view(&ViewId::from("c")).unwrap();
        let snapshot = s.snapshot();
        assert_eq!(snapshot.active, ViewId::from("c"));
        assert!(snapshot.html.contains(r#"id="popButtonC""#));
        assert!(s.document_html().contains("nav-tabs"));
    }

    #[test]
    fn static_policy_without_mapping_focuses_nothing() {
        let mut registry = ViewRegistry::new();
        registry.register(ViewId::main(), ViewContent::Static, None, None);
        registry.add_template(ViewId::from("a"), vec![Node::new("button").id("go")]);
        let mut s = ViewSwitcher::new(
            main_window_document(),
            registry,
            FocusResolver::new(FocusPolicy::StaticMap(HashMap::new()), Duration::ZERO),
            Duration::ZERO,
        );
        s.initialize();

        let t = s.switch_view(&ViewId::from("a")).unwrap();
        fire_all(&mut s, &t);
        assert!(s.document().focused().is_none());
    }
}
