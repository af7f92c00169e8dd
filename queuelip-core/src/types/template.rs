//! Declarative markup templates

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use super::dom::{ComputedStyle, Display, LayoutBox, Visibility};

/// Elements serialized without a closing tag
const VOID_ELEMENTS: &[&str] = &["area", "br", "hr", "img", "input", "meta"];

/// Template node
///
/// Injected into the document by the view registry and rendered to HTML for
/// the webview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default)]
    pub style: ComputedStyle,
    #[serde(default)]
    pub layout: LayoutBox,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Node {
    #[must_use]
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            id: None,
            classes: Vec::new(),
            attributes: BTreeMap::new(),
            text: None,
            style: ComputedStyle::default(),
            layout: LayoutBox::default(),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    #[must_use]
    pub fn class(mut self, class: &str) -> Self {
        for part in class.split_whitespace() {
            if !self.classes.iter().any(|c| c == part) {
                self.classes.push(part.to_string());
            }
        }
        self
    }

    #[must_use]
    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    #[must_use]
    pub fn text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    #[must_use]
    pub fn child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    #[must_use]
    pub fn children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(children);
        self
    }

    /// `display: none`
    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.style.display = Display::None;
        self
    }

    /// `visibility: hidden`
    #[must_use]
    pub fn invisible(mut self) -> Self {
        self.style.visibility = Visibility::Hidden;
        self
    }

    #[must_use]
    pub fn opacity(mut self, opacity: f32) -> Self {
        self.style.opacity = opacity;
        self
    }

    /// Zero-size layout box
    #[must_use]
    pub fn collapsed(mut self) -> Self {
        self.layout = LayoutBox::EMPTY;
        self
    }

    /// Serialize as HTML (equivalent of `outerHTML`)
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        let _ = write!(out, "<{}", self.tag);
        if let Some(id) = &self.id {
            let _ = write!(out, " id=\"{}\"", escape(id));
        }
        if !self.classes.is_empty() {
            let _ = write!(out, " class=\"{}\"", escape(&self.classes.join(" ")));
        }
        for (name, value) in &self.attributes {
            if value.is_empty() {
                let _ = write!(out, " {name}");
            } else {
                let _ = write!(out, " {name}=\"{}\"", escape(value));
            }
        }
        if !self.style.is_default() {
            let _ = write!(out, " style=\"{}\"", style_declarations(&self.style));
        }
        out.push('>');

        if VOID_ELEMENTS.contains(&self.tag.as_str()) {
            return;
        }
        if let Some(text) = &self.text {
            out.push_str(&escape(text));
        }
        for child in &self.children {
            child.write_html(out);
        }
        let _ = write!(out, "</{}>", self.tag);
    }
}

fn style_declarations(style: &ComputedStyle) -> String {
    let mut decls = Vec::new();
    match style.display {
        Display::Block => {}
        Display::Inline => decls.push("display: inline".to_string()),
        Display::None => decls.push("display: none".to_string()),
    }
    if style.visibility == Visibility::Hidden {
        decls.push("visibility: hidden".to_string());
    }
    if (style.opacity - 1.0).abs() > f32::EPSILON {
        decls.push(format!("opacity: {}", style.opacity));
    }
    decls.join("; ")
}

/// Escape text for element content and quoted attribute values
#[must_use]
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Collapsible section (`details` + `summary` + content wrapper)
#[must_use]
pub fn accordion(title: &str, content: Vec<Node>, open: bool) -> Node {
    let mut details = Node::new("details")
        .child(Node::new("summary").text(title))
        .child(Node::new("div").class("accordion-content").children(content));
    if open {
        details = details.attr("open", "");
    }
    details
}

/// Group of accordions, each wrapped for dashboard styling
#[must_use]
pub fn accordion_group(wrapper_class: &str, items: Vec<(String, Vec<Node>, bool)>) -> Vec<Node> {
    items
        .into_iter()
        .map(|(title, content, open)| {
            Node::new("div")
                .class(wrapper_class)
                .child(accordion(&title, content, open))
        })
        .collect()
}
