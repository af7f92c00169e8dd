//! Compound selector subset
//!
//! Supports a single compound selector: optional tag, `#id`, any number of
//! `.class` and `[attr]` / `[attr="value"]` parts. Combinators are rejected.

use std::str::FromStr;

use super::dom::Element;
use crate::error::CoreError;

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttributeMatch {
    name: String,
    value: Option<String>,
}

/// Parsed compound selector
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selector {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<AttributeMatch>,
}

impl Selector {
    /// `#id`
    #[must_use]
    pub fn id(id: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            ..Self::default()
        }
    }

    /// `.class`
    #[must_use]
    pub fn class(class: &str) -> Self {
        Self {
            classes: vec![class.to_string()],
            ..Self::default()
        }
    }

    /// `[name="value"]` appended to this selector
    #[must_use]
    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.attributes.push(AttributeMatch {
            name: name.to_string(),
            value: Some(value.to_string()),
        });
        self
    }

    #[must_use]
    pub fn matches(&self, element: &Element) -> bool {
        if let Some(tag) = &self.tag {
            if tag != "*" && !tag.eq_ignore_ascii_case(&element.tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if element.id.as_deref() != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|c| element.has_class(c)) {
            return false;
        }
        self.attributes.iter().all(|m| match &m.value {
            Some(expected) => element.attribute(&m.name) == Some(expected.as_str()),
            None => element.has_attribute(&m.name),
        })
    }
}

fn is_ident_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '-' || ch == '_'
}

fn take_ident(chars: &[char], pos: &mut usize) -> String {
    let start = *pos;
    while *pos < chars.len() && is_ident_char(chars[*pos]) {
        *pos += 1;
    }
    chars[start..*pos].iter().collect()
}

impl FromStr for Selector {
    type Err = CoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let input = raw.trim();
        let invalid = || CoreError::InvalidSelector(raw.to_string());
        if input.is_empty() {
            return Err(invalid());
        }

        let chars: Vec<char> = input.chars().collect();
        let mut pos = 0;
        let mut selector = Self::default();

        if chars[0] == '*' {
            selector.tag = Some("*".to_string());
            pos = 1;
        } else if is_ident_char(chars[0]) {
            selector.tag = Some(take_ident(&chars, &mut pos));
        }

        while pos < chars.len() {
            match chars[pos] {
                '#' => {
                    pos += 1;
                    let ident = take_ident(&chars, &mut pos);
                    if ident.is_empty() || selector.id.is_some() {
                        return Err(invalid());
                    }
                    selector.id = Some(ident);
                }
                '.' => {
                    pos += 1;
                    let ident = take_ident(&chars, &mut pos);
                    if ident.is_empty() {
                        return Err(invalid());
                    }
                    selector.classes.push(ident);
                }
                '[' => {
                    pos += 1;
                    let name = take_ident(&chars, &mut pos);
                    if name.is_empty() {
                        return Err(invalid());
                    }
                    let mut value = None;
                    if chars.get(pos) == Some(&'=') {
                        pos += 1;
                        let quote = chars.get(pos).copied().filter(|c| *c == '"' || *c == '\'');
                        if let Some(q) = quote {
                            pos += 1;
                            let start = pos;
                            while pos < chars.len() && chars[pos] != q {
                                pos += 1;
                            }
                            if pos >= chars.len() {
                                return Err(invalid());
                            }
                            value = Some(chars[start..pos].iter().collect());
                            pos += 1;
                        } else {
                            value = Some(take_ident(&chars, &mut pos));
                        }
                    }
                    if chars.get(pos) != Some(&']') {
                        return Err(invalid());
                    }
                    pos += 1;
                    selector.attributes.push(AttributeMatch { name, value });
                }
                _ => return Err(invalid()),
            }
        }

        Ok(selector)
    }
}
