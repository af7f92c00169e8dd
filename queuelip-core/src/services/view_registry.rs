//! View registry - view content, initializers and listener ownership

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{CoreError, CoreResult};
use crate::types::{Action, Document, ElementId, ListenerId, Node, ViewContent, ViewId, WindowRole};

/// Initializer / teardown callback of a view
pub type ViewHook = Arc<dyn Fn(&mut ViewScope<'_>) -> CoreResult<()> + Send + Sync>;

/// Handle given to view hooks
///
/// Listeners attached through the scope are owned by the view and detached
/// on its next render or teardown.
pub struct ViewScope<'a> {
    view: &'a ViewId,
    doc: &'a mut Document,
    container: ElementId,
    listeners: &'a mut Vec<ListenerId>,
}

impl ViewScope<'_> {
    #[must_use]
    pub fn view(&self) -> &ViewId {
        self.view
    }

    #[must_use]
    pub fn container(&self) -> ElementId {
        self.container
    }

    #[must_use]
    pub fn document(&self) -> &Document {
        self.doc
    }

    pub fn document_mut(&mut self) -> &mut Document {
        self.doc
    }

    /// Element with the given `id` inside the view container
    #[must_use]
    pub fn find(&self, element_id: &str) -> Option<ElementId> {
        self.doc
            .element_by_id(element_id)
            .filter(|&id| self.doc.is_within(id, self.container))
    }

    /// Attach a view-owned click listener
    pub fn on_click(&mut self, element: ElementId, action: Action) -> CoreResult<ListenerId> {
        let id = self.doc.on_click(element, action)?;
        self.listeners.push(id);
        Ok(id)
    }

    /// Attach a view-owned click listener to the element with the given `id`
    pub fn on_click_by_id(&mut self, element_id: &str, action: Action) -> CoreResult<ListenerId> {
        let element = self
            .find(element_id)
            .ok_or_else(|| CoreError::ElementNotFound(element_id.to_string()))?;
        self.on_click(element, action)
    }
}

struct ViewEntry {
    content: ViewContent,
    init: Option<ViewHook>,
    teardown: Option<ViewHook>,
    listeners: Vec<ListenerId>,
}

/// Registry of views known to one window
pub struct ViewRegistry {
    entries: HashMap<ViewId, ViewEntry>,
    order: Vec<ViewId>,
}

impl Default for ViewRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewRegistry {
    /// Empty registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Registry with `main` (static) and the templated views `a`, `b`, `c`
    #[must_use]
    pub fn with_builtin_views() -> Self {
        let mut registry = Self::new();
        registry.register(ViewId::main(), ViewContent::Static, None, None);
        for letter in ['a', 'b', 'c'] {
            let view = ViewId::new(letter.to_string());
            registry.register(
                view,
                ViewContent::Template(letter_view_template(letter)),
                Some(pop_button_initializer(letter)),
                None,
            );
        }
        registry
    }

    /// Register (or replace) a view
    pub fn register(
        &mut self,
        id: ViewId,
        content: ViewContent,
        init: Option<ViewHook>,
        teardown: Option<ViewHook>,
    ) {
        let listeners = match self.entries.remove(&id) {
            Some(previous) => {
                log::debug!("Replacing registered view: {id}");
                previous.listeners
            }
            None => {
                self.order.push(id.clone());
                Vec::new()
            }
        };
        self.entries.insert(
            id,
            ViewEntry {
                content,
                init,
                teardown,
                listeners,
            },
        );
    }

    /// Add or replace a templated view without hooks
    pub fn add_template(&mut self, id: ViewId, template: Vec<Node>) {
        match self.entries.get_mut(&id) {
            Some(entry) => entry.content = ViewContent::Template(template),
            None => self.register(id, ViewContent::Template(template), None, None),
        }
    }

    #[must_use]
    pub fn get(&self, id: &ViewId) -> Option<&ViewContent> {
        self.entries.get(id).map(|entry| &entry.content)
    }

    #[must_use]
    pub fn contains(&self, id: &ViewId) -> bool {
        self.entries.contains_key(id)
    }

    /// Registered view ids in registration order
    #[must_use]
    pub fn view_ids(&self) -> &[ViewId] {
        &self.order
    }

    /// Listeners currently owned by a view
    #[must_use]
    pub fn listener_count(&self, id: &ViewId) -> usize {
        self.entries.get(id).map_or(0, |entry| entry.listeners.len())
    }

    /// Render a view into its container
    ///
    /// Returns `false` only when the container is missing. An unknown view
    /// renders a visible placeholder; initializer failures are logged.
    pub fn render(&mut self, doc: &mut Document, id: &ViewId, container_id: &str) -> bool {
        let Some(container) = doc.element_by_id(container_id) else {
            log::error!("Container not found: {container_id}");
            return false;
        };

        if id.is_main() {
            return true;
        }

        self.detach_listeners(doc, id);

        let Some(entry) = self.entries.get_mut(id) else {
            log::warn!("No template registered for view: {id}");
            doc.replace_children(container, &[not_found_placeholder(id)]);
            return true;
        };

        if let ViewContent::Template(nodes) = &entry.content {
            doc.replace_children(container, nodes);
        }

        if let Some(init) = entry.init.clone() {
            let mut scope = ViewScope {
                view: id,
                doc,
                container,
                listeners: &mut entry.listeners,
            };
            if let Err(e) = init(&mut scope) {
                log::error!("View initializer failed for {id}: {e}");
            }
        }

        log::debug!(
            "Rendered view {id} ({} listeners)",
            entry.listeners.len()
        );
        true
    }

    /// Detach the view's listeners and run its teardown hook
    pub fn teardown(&mut self, doc: &mut Document, id: &ViewId) {
        self.detach_listeners(doc, id);

        let Some(entry) = self.entries.get_mut(id) else {
            return;
        };
        let Some(hook) = entry.teardown.clone() else {
            return;
        };
        let Some(container) = doc.element_by_id(&id.container_id()) else {
            log::warn!("Skipping teardown of {id}: container missing");
            return;
        };
        let mut scope = ViewScope {
            view: id,
            doc,
            container,
            listeners: &mut entry.listeners,
        };
        if let Err(e) = hook(&mut scope) {
            log::error!("View teardown failed for {id}: {e}");
        }
    }

    /// Empty the container of every templated view
    pub fn clear_all(&mut self, doc: &mut Document) {
        let templated: Vec<ViewId> = self
            .order
            .iter()
            .filter(|id| matches!(self.get(id), Some(ViewContent::Template(_))))
            .cloned()
            .collect();
        for id in templated {
            self.detach_listeners(doc, &id);
            if let Some(container) = doc.element_by_id(&id.container_id()) {
                doc.clear_children(container);
            }
        }
    }

    fn detach_listeners(&mut self, doc: &mut Document, id: &ViewId) {
        if let Some(entry) = self.entries.get_mut(id) {
            for listener in entry.listeners.drain(..) {
                doc.remove_listener(listener);
            }
        }
    }
}

fn not_found_placeholder(id: &ViewId) -> Node {
    Node::new("div")
        .class("error view-not-found")
        .text(&format!("View {} not found", id.as_str().to_uppercase()))
}

/// Heading, large letter and a `POP` button
fn letter_view_template(letter: char) -> Vec<Node> {
    let upper = letter.to_ascii_uppercase();
    vec![
        Node::new("h2")
            .class("text-center")
            .text(&format!("View {upper}")),
        Node::new("div").class("text-center mb-4").child(
            Node::new("div")
                .class("text-lg font-bold")
                .text(&upper.to_string()),
        ),
        Node::new("div").class("text-center").child(
            Node::new("button")
                .id(&format!("popButton{upper}"))
                .class("popup-button")
                .text("POP"),
        ),
    ]
}

/// Wires the `POP` button to open the dashboard with the view as context
fn pop_button_initializer(letter: char) -> ViewHook {
    let button_id = format!("popButton{}", letter.to_ascii_uppercase());
    Arc::new(move |scope: &mut ViewScope<'_>| {
        let context = scope.view().context_tag();
        scope.on_click_by_id(
            &button_id,
            Action::OpenAuxiliary {
                role: WindowRole::Dashboard,
                context: Some(context),
            },
        )?;
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn containers() -> Document {
        Document::from_nodes(&[
            Node::new("div").id("view-main").child(Node::new("p").text("home")),
            Node::new("div").id("view-a"),
            Node::new("div").id("view-b"),
            Node::new("div").id("view-zzz"),
        ])
    }

    #[test]
    fn main_is_a_no_op() {
        let mut doc = containers();
        let mut registry = ViewRegistry::with_builtin_views();
        let container = doc.element_by_id("view-main").unwrap();
        let before = doc.inner_html(container);

        assert!(registry.render(&mut doc, &ViewId::main(), "view-main"));
        assert_eq!(doc.inner_html(container), before);
    }

    #[test]
    fn renders_builtin_template_and_wires_pop() {
        let mut doc = containers();
        let mut registry = ViewRegistry::with_builtin_views();
        let view = ViewId::from("a");

        assert!(registry.render(&mut doc, &view, "view-a"));

        let button = doc.element_by_id("popButtonA").unwrap();
        assert_eq!(doc.get(button).unwrap().text, "POP");
        assert_eq!(
            doc.click(button),
            vec![Action::OpenAuxiliary {
                role: WindowRole::Dashboard,
                context: Some("view-a".to_string()),
            }]
        );
    }

    #[test]
    fn rerender_is_idempotent() {
        let mut doc = containers();
        let mut registry = ViewRegistry::with_builtin_views();
        let view = ViewId::from("b");
        let container = doc.element_by_id("view-b").unwrap();

        registry.render(&mut doc, &view, "view-b");
        let once = doc.inner_html(container);
        registry.render(&mut doc, &view, "view-b");

        assert_eq!(doc.inner_html(container), once);
        assert_eq!(registry.listener_count(&view), 1);
        let button = doc.element_by_id("popButtonB").unwrap();
        assert_eq!(doc.click(button).len(), 1);
    }

    #[test]
    fn unknown_view_renders_placeholder() {
        let mut doc = containers();
        let mut registry = ViewRegistry::with_builtin_views();
        let container = doc.element_by_id("view-zzz").unwrap();

        assert!(registry.render(&mut doc, &ViewId::from("zzz"), "view-zzz"));
        assert_eq!(
            doc.inner_html(container),
            r#"<div class="error view-not-found">View ZZZ not found</div>"#
        );
    }

    #[test]
    fn missing_container_fails() {
        let mut doc = Document::new();
        let mut registry = ViewRegistry::with_builtin_views();
        assert!(!registry.render(&mut doc, &ViewId::from("a"), "view-a"));
        assert!(!registry.render(&mut doc, &ViewId::main(), "view-main"));
    }

    #[test]
    fn initializer_failure_keeps_render_successful() {
        let mut doc = containers();
        let mut registry = ViewRegistry::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        registry.register(
            ViewId::from("a"),
            ViewContent::Template(vec![Node::new("p").text("content")]),
            Some(Arc::new(move |scope: &mut ViewScope<'_>| {
                counter.fetch_add(1, Ordering::SeqCst);
                scope.on_click_by_id("missing", Action::ShowMessage("x".into()))?;
                Ok(())
            })),
            None,
        );

        assert!(registry.render(&mut doc, &ViewId::from("a"), "view-a"));
        assert!(registry.render(&mut doc, &ViewId::from("a"), "view-a"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        let container = doc.element_by_id("view-a").unwrap();
        assert_eq!(doc.inner_html(container), "<p>content</p>");
    }

    #[test]
    fn teardown_detaches_listeners_and_runs_hook() {
        let mut doc = containers();
        let mut registry = ViewRegistry::with_builtin_views();
        let view = ViewId::from("a");
        registry.register(
            view.clone(),
            ViewContent::Template(letter_view_template('a')),
            Some(pop_button_initializer('a')),
            Some(Arc::new(|scope: &mut ViewScope<'_>| {
                let container = scope.container();
                scope
                    .document_mut()
                    .set_attribute(container, "data-torn-down", "true");
                Ok(())
            })),
        );

        registry.render(&mut doc, &view, "view-a");
        let button = doc.element_by_id("popButtonA").unwrap();
        registry.teardown(&mut doc, &view);

        assert!(doc.click(button).is_empty());
        assert_eq!(registry.listener_count(&view), 0);
        let container = doc.element_by_id("view-a").unwrap();
        assert_eq!(doc.attribute(container, "data-torn-down"), Some("true"));
    }

    #[test]
    fn add_template_and_clear_all() {
        let mut doc = containers();
        let mut registry = ViewRegistry::with_builtin_views();
        registry.add_template(ViewId::from("zzz"), vec![Node::new("p").text("late")]);
        assert!(registry.contains(&ViewId::from("zzz")));

        registry.render(&mut doc, &ViewId::from("a"), "view-a");
        registry.render(&mut doc, &ViewId::from("zzz"), "view-zzz");
        registry.clear_all(&mut doc);

        for container in ["view-a", "view-zzz"] {
            let id = doc.element_by_id(container).unwrap();
            assert!(doc.inner_html(id).is_empty());
        }
        let main = doc.element_by_id("view-main").unwrap();
        assert_eq!(doc.inner_html(main), "<p>home</p>");
        assert_eq!(registry.listener_count(&ViewId::from("a")), 0);
    }

    #[test]
    fn registration_order_is_kept() {
        let registry = ViewRegistry::with_builtin_views();
        let ids: Vec<&str> = registry.view_ids().iter().map(ViewId::as_str).collect();
        assert_eq!(ids, vec!["main", "a", "b", "c"]);
        assert_eq!(registry.get(&ViewId::main()), Some(&ViewContent::Static));
    }
}
