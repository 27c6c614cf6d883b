//! Minimal element tree used for SVG charts and HTML controls.

use std::fmt::{self, Write};

/// HTML elements serialized without a closing tag.
const VOID_ELEMENTS: [&str; 4] = ["br", "hr", "img", "input"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

impl From<Element> for Node {
    fn from(e: Element) -> Self {
        Node::Element(e)
    }
}

/// A named element with ordered attributes and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attrs: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    pub fn new<S: ToString>(name: S) -> Self {
        Self {
            name: name.to_string(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder form of [`Element::set_attr`].
    pub fn attr<K: ToString, V: ToString>(mut self, key: K, value: V) -> Self {
        self.set_attr(key, value);
        self
    }

    /// Sets an attribute, keeping its original position when it already exists.
    pub fn set_attr<K: ToString, V: ToString>(&mut self, key: K, value: V) -> &mut Self {
        let (key, value) = (key.to_string(), value.to_string());
        match self.attrs.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((key, value)),
        }
        self
    }

    pub fn child<N: Into<Node>>(mut self, node: N) -> Self {
        self.children.push(node.into());
        self
    }

    pub fn push<N: Into<Node>>(&mut self, node: N) -> &mut Self {
        self.children.push(node.into());
        self
    }

    pub fn text<S: ToString>(mut self, text: S) -> Self {
        self.children.push(Node::Text(text.to_string()));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get_attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn attrs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Child elements, skipping text nodes.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    /// Concatenated text of every descendant text node.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            match child {
                Node::Text(t) => out.push_str(t),
                Node::Element(e) => out.push_str(&e.text_content()),
            }
        }
        out
    }

    /// Every descendant element (depth first, document order) named `name`.
    pub fn find_all<'a>(&'a self, name: &str) -> Vec<&'a Element> {
        let mut found = Vec::new();
        let mut stack: Vec<&Element> = self.elements().collect();
        stack.reverse();
        while let Some(e) = stack.pop() {
            if e.name == name {
                found.push(e);
            }
            stack.extend(e.elements().collect::<Vec<_>>().into_iter().rev());
        }
        found
    }

    fn write_to<W: Write>(&self, out: &mut W) -> fmt::Result {
        write!(out, "<{}", self.name)?;
        for (k, v) in &self.attrs {
            write!(out, " {}=\"{}\"", k, escape(v, true))?;
        }
        out.write_char('>')?;
        if self.children.is_empty() && VOID_ELEMENTS.contains(&self.name.as_str()) {
            return Ok(());
        }
        for child in &self.children {
            match child {
                Node::Text(t) => out.write_str(&escape(t, false))?,
                Node::Element(e) => e.write_to(out)?,
            }
        }
        write!(out, "</{}>", self.name)
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_to(f)
    }
}

fn escape(s: &str, attribute: bool) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_in_insertion_order() {
        let g = Element::new("g")
            .attr("fill", "none")
            .attr("font-size", 10)
            .child(Element::new("line").attr("x2", -6))
            .child(Element::new("text").text("a < b"));
        assert_eq!(
            g.to_string(),
            r#"<g fill="none" font-size="10"><line x2="-6"></line><text>a &lt; b</text></g>"#
        );
    }

    #[test]
    fn set_attr_overwrites_in_place() {
        let mut e = Element::new("line").attr("stroke", "currentColor").attr("x2", 1);
        e.set_attr("x2", 600).set_attr("stroke-opacity", 0.1);
        assert_eq!(
            e.to_string(),
            r#"<line stroke="currentColor" x2="600" stroke-opacity="0.1"></line>"#
        );
    }

    #[test]
    fn void_elements_have_no_closing_tag() {
        let input = Element::new("input").attr("type", "range");
        assert_eq!(input.to_string(), r#"<input type="range">"#);
    }

    #[test]
    fn find_all_walks_in_document_order() {
        let root = Element::new("svg")
            .child(Element::new("g").child(Element::new("rect").attr("id", 1)))
            .child(Element::new("rect").attr("id", 2));
        let ids: Vec<_> = root
            .find_all("rect")
            .iter()
            .filter_map(|e| e.get_attr("id"))
            .collect();
        assert_eq!(ids, vec!["1", "2"]);
    }
}
