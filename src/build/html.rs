//! HTML trees for structural template work, parsed with html5ever through
//! kuchikiki.
//!
//! A [`Document`] is either a full page (it has a doctype or an `<html>`
//! element) or a fragment. Both are parsed the way a browser would parse
//! them; a fragment serializes back to just the nodes it produced, without
//! the `<html>`/`<head>`/`<body>` wrappers the parser adds.
//!
//! The free functions are small helpers over [`NodeRef`] for the handful of
//! edits templates need.

use kuchikiki::traits::TendrilSink;
use kuchikiki::{NodeData, NodeRef, Selectors};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid selector '{selector}': {reason}")]
pub struct SelectorError {
    pub selector: String,
    pub reason: &'static str,
}

/// A compiled CSS selector.
pub struct Selector {
    compiled: Selectors,
}

impl Selector {
    pub fn parse(selector: &str) -> Result<Self, SelectorError> {
        if selector.trim().is_empty() {
            return Err(SelectorError {
                selector: selector.to_string(),
                reason: "empty selector",
            });
        }
        let compiled = Selectors::compile(selector).map_err(|()| SelectorError {
            selector: selector.to_string(),
            reason: "not a valid CSS selector",
        })?;
        Ok(Self { compiled })
    }

    pub fn matches(&self, node: &NodeRef) -> bool {
        node.clone()
            .into_element_ref()
            .is_some_and(|element| self.compiled.matches(&element))
    }
}

// =============================================================================
// Documents
// =============================================================================

pub struct Document {
    root: NodeRef,
    fragment: bool,
}

impl Document {
    /// Parse a full page or a fragment, whichever `html` looks like.
    pub fn parse(html: &str) -> Self {
        Self {
            root: kuchikiki::parse_html().one(html),
            fragment: !is_full_document(html),
        }
    }

    /// Parse `html` as a fragment even if it carries page-level markup.
    pub fn parse_fragment(html: &str) -> Self {
        Self {
            root: kuchikiki::parse_html().one(html),
            fragment: true,
        }
    }

    /// The document node; every element is a descendant of it.
    pub fn root(&self) -> NodeRef {
        self.root.clone()
    }

    /// Serialize the whole document, or for a fragment the nodes it held.
    pub fn to_html(&self) -> String {
        if self.fragment {
            self.top_level_nodes().iter().map(NodeRef::to_string).collect()
        } else {
            self.root.to_string()
        }
    }

    /// Inner HTML of `<body>`. For a fragment that is everything it held.
    pub fn body_html(&self) -> String {
        if self.fragment {
            return self.to_html();
        }
        match self.section("body") {
            Some(body) => inner_html(&body),
            None => self.to_html(),
        }
    }

    /// Nodes a fragment parsed into. Leading `<style>`, `<script>` and such
    /// land in `<head>`, so it comes first.
    fn top_level_nodes(&self) -> Vec<NodeRef> {
        ["head", "body"]
            .into_iter()
            .filter_map(|name| self.section(name))
            .flat_map(|section| section.children().collect::<Vec<_>>())
            .collect()
    }

    fn section(&self, name: &str) -> Option<NodeRef> {
        self.root
            .descendants()
            .find(|node| element_name(node).as_deref() == Some(name))
    }
}

fn is_full_document(html: &str) -> bool {
    let lower = html.trim_start().to_ascii_lowercase();
    lower.starts_with("<!doctype") || lower.contains("<html")
}

// =============================================================================
// Queries
// =============================================================================

/// First descendant of `scope` (not `scope` itself) matching `selector`.
pub fn select_first(scope: &NodeRef, selector: &Selector) -> Option<NodeRef> {
    scope.descendants().find(|node| selector.matches(node))
}

/// Local name of an element node.
pub fn element_name(node: &NodeRef) -> Option<String> {
    node.as_element().map(|element| element.name.local.to_string())
}

pub fn attr(node: &NodeRef, name: &str) -> Option<String> {
    let element = node.as_element()?;
    let attributes = element.attributes.borrow();
    attributes.get(name).map(str::to_string)
}

pub fn set_attr(node: &NodeRef, name: &str, value: &str) {
    if let Some(element) = node.as_element() {
        element
            .attributes
            .borrow_mut()
            .insert(name, value.to_string());
    }
}

pub fn remove_attr(node: &NodeRef, name: &str) {
    if let Some(element) = node.as_element() {
        element.attributes.borrow_mut().remove(name);
    }
}

// =============================================================================
// Classes and style
// =============================================================================

pub fn classes(node: &NodeRef) -> Vec<String> {
    attr(node, "class")
        .map(|value| value.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}

/// Replace the class list; an empty list removes the attribute.
pub fn set_classes(node: &NodeRef, classes: &[String]) {
    if classes.is_empty() {
        remove_attr(node, "class");
    } else {
        set_attr(node, "class", &classes.join(" "));
    }
}

pub fn add_class(node: &NodeRef, class: &str) {
    let mut current = classes(node);
    if !current.iter().any(|c| c == class) {
        current.push(class.to_string());
        set_classes(node, &current);
    }
}

pub fn remove_class(node: &NodeRef, class: &str) {
    let mut current = classes(node);
    let before = current.len();
    current.retain(|c| c != class);
    if current.len() != before {
        set_classes(node, &current);
    }
}

/// Set one declaration in the inline `style`, keeping the others in order.
pub fn set_style_property(node: &NodeRef, property: &str, value: &str) {
    let mut declarations: Vec<(String, String)> = attr(node, "style")
        .unwrap_or_default()
        .split(';')
        .filter_map(|declaration| {
            let (name, value) = declaration.split_once(':')?;
            Some((name.trim().to_string(), value.trim().to_string()))
        })
        .filter(|(name, _)| !name.is_empty())
        .collect();

    match declarations.iter_mut().find(|(name, _)| name == property) {
        Some(existing) => existing.1 = value.to_string(),
        None => declarations.push((property.to_string(), value.to_string())),
    }

    let style: Vec<String> = declarations
        .iter()
        .map(|(name, value)| format!("{name}: {value};"))
        .collect();
    set_attr(node, "style", &style.join(" "));
}

// =============================================================================
// Structure
// =============================================================================

/// Detached copy of `node` and everything under it.
pub fn deep_clone(node: &NodeRef) -> NodeRef {
    clone_subtree(node).unwrap_or_else(|| NodeRef::new_text(""))
}

fn clone_subtree(node: &NodeRef) -> Option<NodeRef> {
    let copy = match node.data() {
        NodeData::Element(element) => NodeRef::new_element(
            element.name.clone(),
            element.attributes.borrow().map.clone(),
        ),
        NodeData::Text(text) => NodeRef::new_text(text.borrow().clone()),
        NodeData::Comment(text) => NodeRef::new_comment(text.borrow().clone()),
        _ => return None,
    };
    for child in node.children() {
        if let Some(child) = clone_subtree(&child) {
            copy.append(child);
        }
    }
    Some(copy)
}

fn clear_children(node: &NodeRef) {
    for child in node.children().collect::<Vec<_>>() {
        child.detach();
    }
}

/// Parse `html` as a fragment and append its nodes to `node`.
pub fn append_html(node: &NodeRef, html: &str) {
    for child in Document::parse_fragment(html).top_level_nodes() {
        node.append(child);
    }
}

pub fn set_inner_html(node: &NodeRef, html: &str) {
    clear_children(node);
    append_html(node, html);
}

/// Replace the children of `node` with one text node. The text is escaped
/// on output.
pub fn set_text(node: &NodeRef, text: &str) {
    clear_children(node);
    node.append(NodeRef::new_text(text));
}

pub fn inner_html(node: &NodeRef) -> String {
    node.children().map(|child| child.to_string()).collect()
}

pub fn outer_html(node: &NodeRef) -> String {
    node.to_string()
}

// =============================================================================
// Escaping for markup built as strings
// =============================================================================

/// Escape text for use as element content.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape text for use inside a double-quoted attribute value.
pub fn escape_attr(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}
