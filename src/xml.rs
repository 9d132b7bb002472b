//! Typed XML document model
//!
//! The compiler builds an [`Element`] tree, later passes take the tree by
//! value and hand back a new one, and [`Document::to_xml`] serializes it.

use std::collections::BTreeMap;

/// A node in the element tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    CData(String),
    Comment(String),
}

/// An XML element with ordered attributes
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Set an attribute, replacing any existing value
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Set an attribute only when a value is present
    pub fn attr_opt<V: Into<String>>(mut self, name: &str, value: Option<V>) -> Self {
        if let Some(v) = value {
            self.set_attr(name, v);
        }
        self
    }

    /// Set a `yes`/`no` attribute only when a value is present
    pub fn yes_no(self, name: &str, value: Option<bool>) -> Self {
        self.attr_opt(name, value.map(yes_no))
    }

    pub fn child(mut self, element: Element) -> Self {
        self.push(element);
        self
    }

    pub fn children<I>(mut self, elements: I) -> Self
    where
        I: IntoIterator<Item = Element>,
    {
        self.children
            .extend(elements.into_iter().map(Node::Element));
        self
    }

    pub fn cdata(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::CData(text.into()));
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    /// Copy every entry of an attribute bag onto the element
    pub fn extend_attrs(mut self, attrs: &BTreeMap<String, String>) -> Self {
        for (name, value) in attrs {
            self.set_attr(name.as_str(), value.as_str());
        }
        self
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn id(&self) -> Option<&str> {
        self.get_attr("Id")
    }

    pub fn push(&mut self, element: Element) {
        self.children.push(Node::Element(element));
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    pub fn elements_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.elements().filter(move |e| e.name == name)
    }

    pub fn first_named(&self, name: &str) -> Option<&Element> {
        self.elements().find(|e| e.name == name)
    }

    pub fn first_named_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.elements_mut().find(|e| e.name == name)
    }

    pub fn has_child(&self, name: &str) -> bool {
        self.elements().any(|e| e.name == name)
    }

    /// Child element with the given tag and `Id`
    pub fn child_with_id_mut(&mut self, name: &str, id: &str) -> Option<&mut Element> {
        self.elements_mut()
            .find(|e| e.name == name && e.id() == Some(id))
    }

    /// All descendant elements in document order, excluding `self`
    pub fn descendants(&self) -> Vec<&Element> {
        let mut out = Vec::new();
        collect_descendants(self, &mut out);
        out
    }

    /// Visit `self` and every descendant element, parents first
    pub fn visit_mut(&mut self, f: &mut impl FnMut(&mut Element)) {
        f(self);
        for child in self.elements_mut() {
            child.visit_mut(f);
        }
    }

    /// Concatenated text and CDATA content of direct children
    pub fn text_content(&self) -> String {
        self.children
            .iter()
            .filter_map(|n| match n {
                Node::Text(t) | Node::CData(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Namespace prefixes used by this element, its attributes and descendants
    pub fn prefixes(&self) -> Vec<String> {
        let mut found = Vec::new();
        let mut push = |name: &str| {
            if let Some((prefix, _)) = name.split_once(':') {
                if prefix != "xmlns" && !found.iter().any(|p| p == prefix) {
                    found.push(prefix.to_string());
                }
            }
        };
        push(&self.name);
        for (attr, _) in &self.attributes {
            push(attr);
        }
        for el in self.descendants() {
            push(&el.name);
            for (attr, _) in &el.attributes {
                push(attr);
            }
        }
        found
    }
}

fn collect_descendants<'a>(element: &'a Element, out: &mut Vec<&'a Element>) {
    for child in element.elements() {
        out.push(child);
        collect_descendants(child, out);
    }
}

pub fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

/// A complete document with its root element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub root: Element,
}

impl Document {
    pub fn new(root: Element) -> Self {
        Self { root }
    }

    /// Serialize with an XML declaration and two-space indentation
    pub fn to_xml(&self) -> String {
        let mut writer = XmlWriter::new();
        writer.write_declaration("1.0", Some("utf-8"));
        writer.newline();
        writer.write_element(&self.root);
        writer.finish()
    }
}

/// XML text writer
pub struct XmlWriter {
    output: String,
    indent_level: usize,
}

impl XmlWriter {
    pub fn new() -> Self {
        Self {
            output: String::new(),
            indent_level: 0,
        }
    }

    pub fn finish(mut self) -> String {
        if !self.output.ends_with('\n') {
            self.output.push('\n');
        }
        self.output
    }

    pub fn newline(&mut self) {
        self.output.push('\n');
    }

    fn write_indent(&mut self) {
        self.output.push_str(&"  ".repeat(self.indent_level));
    }

    pub fn write_declaration(&mut self, version: &str, encoding: Option<&str>) {
        self.output.push_str("<?xml version=\"");
        self.output.push_str(&escape_attr(version));
        self.output.push('"');
        if let Some(enc) = encoding {
            self.output.push_str(" encoding=\"");
            self.output.push_str(&escape_attr(enc));
            self.output.push('"');
        }
        self.output.push_str("?>");
    }

    /// Write an element and its subtree, one tag per line
    pub fn write_element(&mut self, element: &Element) {
        self.write_indent();
        self.output.push('<');
        self.output.push_str(&element.name);
        for (name, value) in &element.attributes {
            self.output.push(' ');
            self.output.push_str(name);
            self.output.push_str("=\"");
            self.output.push_str(&escape_attr(value));
            self.output.push('"');
        }

        if element.children.is_empty() {
            self.output.push_str(" />");
            self.newline();
            return;
        }

        let inline = element
            .children
            .iter()
            .all(|n| matches!(n, Node::Text(_) | Node::CData(_)));

        self.output.push('>');
        if inline {
            for node in &element.children {
                self.write_inline(node);
            }
        } else {
            self.newline();
            self.indent_level += 1;
            for node in &element.children {
                match node {
                    Node::Element(child) => self.write_element(child),
                    other => {
                        self.write_indent();
                        self.write_inline(other);
                        self.newline();
                    }
                }
            }
            self.indent_level -= 1;
            self.write_indent();
        }
        self.output.push_str("</");
        self.output.push_str(&element.name);
        self.output.push('>');
        self.newline();
    }

    fn write_inline(&mut self, node: &Node) {
        match node {
            Node::Text(text) => self.output.push_str(&escape_text(text)),
            Node::CData(text) => {
                self.output.push_str("<![CDATA[");
                self.output.push_str(&text.replace("]]>", "]]]]><![CDATA[>"));
                self.output.push_str("]]>");
            }
            Node::Comment(text) => {
                self.output.push_str("<!--");
                self.output.push_str(text);
                self.output.push_str("-->");
            }
            Node::Element(_) => {}
        }
    }
}

impl Default for XmlWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Escape special characters in attribute values
pub fn escape_attr(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            _ => result.push(c),
        }
    }
    result
}

/// Escape special characters in text content
pub fn escape_text(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            _ => result.push(c),
        }
    }
    result
}
