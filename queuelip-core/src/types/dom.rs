//! In-memory document model
//!
//! An arena of elements standing in for the webview DOM. The core mutates this
//! model; the webview renders markup and snapshots produced from it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::action::Action;
use super::selector::Selector;
use super::template::Node;
use crate::error::{CoreError, CoreResult};

/// Arena slot of an element, tagged with the slot's generation
///
/// A freed slot is reused with a bumped generation, so ids of removed
/// elements never resolve to their successors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId {
    index: u32,
    generation: u32,
}

impl ElementId {
    /// Raw arena index (stable for the element's lifetime)
    #[must_use]
    pub fn index(self) -> usize {
        self.index as usize
    }

    #[must_use]
    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    element: Option<Element>,
}

/// Listener handle returned by [`Document::on_click`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// CSS `display`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Display {
    #[default]
    Block,
    Inline,
    None,
}

/// CSS `visibility`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
}

/// Computed style subset relevant to focus visibility checks
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputedStyle {
    pub display: Display,
    pub visibility: Visibility,
    pub opacity: f32,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            display: Display::Block,
            visibility: Visibility::Visible,
            opacity: 1.0,
        }
    }
}

impl ComputedStyle {
    /// Whether any property differs from the default
    #[must_use]
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// Layout box size. Elements are laid out with a nominal 1×1 box unless a
/// template collapses them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutBox {
    pub width: f32,
    pub height: f32,
}

impl LayoutBox {
    /// Zero-size box (`offsetWidth == offsetHeight == 0`)
    pub const EMPTY: Self = Self {
        width: 0.0,
        height: 0.0,
    };

    #[must_use]
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Both dimensions are zero
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 && self.height <= 0.0
    }
}

impl Default for LayoutBox {
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}

/// Document element
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attributes: BTreeMap<String, String>,
    pub text: String,
    pub style: ComputedStyle,
    pub layout: LayoutBox,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
}

impl Element {
    fn from_node(node: &Node, parent: Option<ElementId>) -> Self {
        Self {
            tag: node.tag.clone(),
            id: node.id.clone(),
            classes: node.classes.clone(),
            attributes: node.attributes.clone(),
            text: node.text.clone().unwrap_or_default(),
            style: node.style,
            layout: node.layout,
            parent,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    #[must_use]
    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    #[must_use]
    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    /// `#id` when the element has one, otherwise `tag.class1.class2`
    #[must_use]
    pub fn describe(&self) -> String {
        if let Some(id) = &self.id {
            return format!("#{id}");
        }
        let mut selector = self.tag.to_lowercase();
        for class in &self.classes {
            selector.push('.');
            selector.push_str(class);
        }
        selector
    }
}

#[derive(Debug, Clone)]
struct Listener {
    element: ElementId,
    action: Action,
}

/// Element arena rooted at a `body` element
#[derive(Debug, Clone)]
pub struct Document {
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: ElementId,
    focused: Option<ElementId>,
    listeners: BTreeMap<ListenerId, Listener>,
    next_listener: u64,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Empty document containing only `body`
    #[must_use]
    pub fn new() -> Self {
        let body = Element::from_node(&Node::new("body"), None);
        Self {
            slots: vec![Slot {
                generation: 0,
                element: Some(body),
            }],
            free: Vec::new(),
            root: ElementId {
                index: 0,
                generation: 0,
            },
            focused: None,
            listeners: BTreeMap::new(),
            next_listener: 0,
        }
    }

    /// Build a document whose `body` holds the given nodes
    #[must_use]
    pub fn from_nodes(nodes: &[Node]) -> Self {
        let mut doc = Self::new();
        let root = doc.root;
        for node in nodes {
            doc.instantiate(root, node);
        }
        doc
    }

    #[must_use]
    pub fn root(&self) -> ElementId {
        self.root
    }

    /// Whether the element is still attached
    #[must_use]
    pub fn contains(&self, id: ElementId) -> bool {
        self.get(id).is_some()
    }

    #[must_use]
    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.slots
            .get(id.index())
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.element.as_ref())
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.slots
            .get_mut(id.index())
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.element.as_mut())
    }

    /// Number of attached elements, `body` included
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Never true: `body` is always attached
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Allocated arena slots, free ones included
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn alloc(&mut self, element: Element) -> ElementId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.element = Some(element);
            return ElementId {
                index,
                generation: slot.generation,
            };
        }
        let index = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
        self.slots.push(Slot {
            generation: 0,
            element: Some(element),
        });
        ElementId {
            index,
            generation: 0,
        }
    }

    /// Append a template subtree under `parent`, returning the new subtree root
    pub fn instantiate(&mut self, parent: ElementId, node: &Node) -> ElementId {
        let id = self.alloc(Element::from_node(node, Some(parent)));
        if let Some(parent_el) = self.get_mut(parent) {
            parent_el.children.push(id);
        }
        for child in &node.children {
            self.instantiate(id, child);
        }
        id
    }

    /// Descendants of `id` in document order, excluding `id` itself
    #[must_use]
    pub fn descendants(&self, id: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack: Vec<ElementId> = self
            .get(id)
            .map(|el| el.children.iter().rev().copied().collect())
            .unwrap_or_default();
        while let Some(current) = stack.pop() {
            out.push(current);
            if let Some(el) = self.get(current) {
                stack.extend(el.children.iter().rev().copied());
            }
        }
        out
    }

    /// `id` followed by each of its ancestors up to the root
    #[must_use]
    pub fn ancestors_or_self(&self, id: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut current = self.get(id).map(|_| id);
        while let Some(cur) = current {
            out.push(cur);
            current = self.get(cur).and_then(Element::parent);
        }
        out
    }

    /// Whether `id` is `ancestor` or lies inside it
    #[must_use]
    pub fn is_within(&self, id: ElementId, ancestor: ElementId) -> bool {
        self.ancestors_or_self(id).contains(&ancestor)
    }

    /// Equivalent of `Element.closest(selector)`
    #[must_use]
    pub fn closest(&self, id: ElementId, selector: &Selector) -> Option<ElementId> {
        self.ancestors_or_self(id)
            .into_iter()
            .find(|&cur| self.get(cur).is_some_and(|el| selector.matches(el)))
    }

    /// First element in document order carrying the `id` attribute
    #[must_use]
    pub fn element_by_id(&self, element_id: &str) -> Option<ElementId> {
        std::iter::once(self.root)
            .chain(self.descendants(self.root))
            .find(|&id| {
                self.get(id)
                    .and_then(|el| el.id.as_deref())
                    .is_some_and(|value| value == element_id)
            })
    }

    /// First descendant of `scope` matching `selector`
    #[must_use]
    pub fn query_selector(&self, scope: ElementId, selector: &Selector) -> Option<ElementId> {
        self.descendants(scope)
            .into_iter()
            .find(|&id| self.get(id).is_some_and(|el| selector.matches(el)))
    }

    /// Every descendant of `scope` matching `selector`, in document order
    #[must_use]
    pub fn query_selector_all(&self, scope: ElementId, selector: &Selector) -> Vec<ElementId> {
        self.descendants(scope)
            .into_iter()
            .filter(|&id| self.get(id).is_some_and(|el| selector.matches(el)))
            .collect()
    }

    #[must_use]
    pub fn has_class(&self, id: ElementId, class: &str) -> bool {
        self.get(id).is_some_and(|el| el.has_class(class))
    }

    pub fn add_class(&mut self, id: ElementId, class: &str) {
        if let Some(el) = self.get_mut(id) {
            if !el.has_class(class) {
                el.classes.push(class.to_string());
            }
        }
    }

    pub fn remove_class(&mut self, id: ElementId, class: &str) {
        if let Some(el) = self.get_mut(id) {
            el.classes.retain(|c| c != class);
        }
    }

    #[must_use]
    pub fn attribute(&self, id: ElementId, name: &str) -> Option<&str> {
        self.get(id).and_then(|el| el.attribute(name))
    }

    pub fn set_attribute(&mut self, id: ElementId, name: &str, value: &str) {
        if let Some(el) = self.get_mut(id) {
            el.attributes.insert(name.to_string(), value.to_string());
        }
    }

    pub fn remove_attribute(&mut self, id: ElementId, name: &str) {
        if let Some(el) = self.get_mut(id) {
            el.attributes.remove(name);
        }
    }

    /// Replace the children of `container` with fresh copies of `nodes`
    ///
    /// Removed elements lose their listeners and focus.
    pub fn replace_children(&mut self, container: ElementId, nodes: &[Node]) -> Vec<ElementId> {
        self.clear_children(container);
        nodes
            .iter()
            .map(|node| self.instantiate(container, node))
            .collect()
    }

    /// Remove every child subtree of `container`
    pub fn clear_children(&mut self, container: ElementId) {
        let children = match self.get_mut(container) {
            Some(el) => std::mem::take(&mut el.children),
            None => return,
        };
        for child in children {
            self.free_subtree(child);
        }
    }

    fn free_subtree(&mut self, id: ElementId) {
        let mut doomed = self.descendants(id);
        doomed.push(id);
        for dead in &doomed {
            if let Some(slot) = self.slots.get_mut(dead.index()) {
                if slot.generation == dead.generation && slot.element.take().is_some() {
                    slot.generation = slot.generation.wrapping_add(1);
                    self.free.push(dead.index);
                }
            }
        }
        self.listeners
            .retain(|_, listener| !doomed.contains(&listener.element));
        if self.focused.is_some_and(|f| doomed.contains(&f)) {
            self.focused = None;
        }
    }

    /// Move input focus to `id`
    pub fn focus(&mut self, id: ElementId) -> CoreResult<()> {
        if !self.contains(id) {
            return Err(CoreError::ElementDetached(format!("element {id}")));
        }
        self.focused = Some(id);
        Ok(())
    }

    /// Drop focus if it currently rests inside `scope`
    pub fn blur_within(&mut self, scope: ElementId) {
        if self.focused.is_some_and(|f| self.is_within(f, scope)) {
            self.focused = None;
        }
    }

    /// Equivalent of `document.activeElement`
    #[must_use]
    pub fn focused(&self) -> Option<ElementId> {
        self.focused.filter(|&id| self.contains(id))
    }

    /// Attach a click listener directly to `element`
    pub fn on_click(&mut self, element: ElementId, action: Action) -> CoreResult<ListenerId> {
        if !self.contains(element) {
            return Err(CoreError::ElementDetached(format!("element {element}")));
        }
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.insert(id, Listener { element, action });
        Ok(id)
    }

    /// Detach a listener; returns whether it was still attached
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(&id).is_some()
    }

    /// Number of listeners attached directly to `element`
    #[must_use]
    pub fn listener_count(&self, element: ElementId) -> usize {
        self.listeners
            .values()
            .filter(|l| l.element == element)
            .count()
    }

    /// Fire a click on `element` and collect the actions of its listeners in
    /// registration order
    #[must_use]
    pub fn click(&self, element: ElementId) -> Vec<Action> {
        self.listeners
            .values()
            .filter(|l| l.element == element)
            .map(|l| l.action.clone())
            .collect()
    }

    /// Snapshot a subtree back into a template node
    #[must_use]
    pub fn to_node(&self, id: ElementId) -> Option<Node> {
        let el = self.get(id)?;
        let mut node = Node::new(&el.tag);
        node.id.clone_from(&el.id);
        node.classes.clone_from(&el.classes);
        node.attributes.clone_from(&el.attributes);
        node.text = (!el.text.is_empty()).then(|| el.text.clone());
        node.style = el.style;
        node.layout = el.layout;
        node.children = el
            .children
            .iter()
            .filter_map(|&child| self.to_node(child))
            .collect();
        Some(node)
    }

    /// Serialize the children of `id` as HTML (equivalent of `innerHTML`)
    #[must_use]
    pub fn inner_html(&self, id: ElementId) -> String {
        self.get(id)
            .map(|el| {
                el.children
                    .iter()
                    .filter_map(|&child| self.to_node(child))
                    .map(|node| node.to_html())
                    .collect()
            })
            .unwrap_or_default()
    }
}
