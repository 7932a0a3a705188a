//! In-memory XML document tree.
//!
//! The codec does not stream: a representer walks its attribute definitions and
//! needs random access to child elements by tag, so documents are read into a
//! small [`Element`] tree with quick-xml and written back out with its writer.
//!
//! Whitespace-only text between child elements is formatting and is dropped
//! while parsing; text inside leaf elements is kept verbatim.

use std::io::Write;
use std::str::FromStr;

use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesDecl, BytesEnd, BytesRef, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::error::{RepresenterError, Result};
use crate::options::XmlOptions;
use crate::xml::utils;

/// A node inside an [`Element`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An XML element with ordered attributes and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    /// Creates an element without attributes or children.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(key, value);
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.push_text(text);
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.push_child(child);
        self
    }

    /// Sets an attribute, replacing an existing one with the same key.
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some(existing) => existing.1 = value,
            None => self.attributes.push((key, value)),
        }
    }

    pub fn push_child(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    /// Appends text, merging with a directly preceding text node.
    pub fn push_text(&mut self, text: &str) {
        if let Some(Node::Text(existing)) = self.children.last_mut() {
            existing.push_str(text);
        } else {
            self.children.push(Node::Text(text.to_string()));
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the value of the attribute `key`, if present.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Child elements in document order, skipping text.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    /// First child element named `name`.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|e| e.name == name)
    }

    /// Every child element named `name`, in document order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.elements().filter(move |e| e.name == name)
    }

    /// Concatenated direct text content.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(text) => Some(text.as_str()),
                Node::Element(_) => None,
            })
            .collect()
    }

    /// True when the element has neither attributes nor children.
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.children.is_empty()
    }

    /// Parses a document and returns its root element.
    pub fn parse(xml: &str) -> Result<Element> {
        let mut reader = Reader::from_str(xml);
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            match reader.read_event()? {
                Event::Start(start) => stack.push(element_from_start(&start)?),
                Event::Empty(start) => {
                    let element = element_from_start(&start)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let mut element = stack.pop().ok_or_else(|| {
                        RepresenterError::Parse("unexpected closing tag".to_string())
                    })?;
                    element.drop_formatting_whitespace();
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Text(text) => {
                    if stack.is_empty() && utils::is_whitespace_text(&text) {
                        continue;
                    }
                    let decoded = text.decode()?;
                    push_text(&mut stack, &decoded)?;
                }
                Event::CData(cdata) => {
                    let decoded = cdata.decode()?;
                    push_text(&mut stack, &decoded)?;
                }
                Event::GeneralRef(reference) => {
                    let resolved = resolve_reference(&reference)?;
                    push_text(&mut stack, &resolved)?;
                }
                Event::Decl(_) | Event::PI(_) | Event::Comment(_) | Event::DocType(_) => {}
                Event::Eof => break,
            }
        }

        if let Some(open) = stack.last() {
            return Err(RepresenterError::Parse(format!(
                "unclosed element <{}>",
                open.name
            )));
        }

        root.ok_or_else(|| RepresenterError::Parse("document has no root element".to_string()))
    }

    /// Renders the element as compact XML.
    pub fn render(&self) -> Result<String> {
        self.render_with(&XmlOptions::default())
    }

    /// Renders the element honoring indentation and declaration options.
    ///
    /// The root name override in `options` is not applied here; it is consumed
    /// when the tree is built.
    pub fn render_with(&self, options: &XmlOptions) -> Result<String> {
        let mut writer = match options.indent {
            Some(width) if width > 0 => Writer::new_with_indent(Vec::new(), b' ', width),
            _ => Writer::new(Vec::new()),
        };

        if options.declaration {
            writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        }
        self.write_to(&mut writer)?;

        String::from_utf8(writer.into_inner())
            .map_err(|e| RepresenterError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
    }

    /// Writes the element and its subtree to a quick-xml writer.
    pub fn write_to<W: Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if self.children.is_empty() {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }

        writer.write_event(Event::Start(start))?;
        for child in &self.children {
            match child {
                Node::Element(element) => element.write_to(writer)?,
                Node::Text(text) => writer.write_event(Event::Text(BytesText::new(text)))?,
            }
        }
        writer.write_event(Event::End(BytesEnd::new(self.name.as_str())))?;
        Ok(())
    }

    fn drop_formatting_whitespace(&mut self) {
        let has_elements = self.children.iter().any(|n| matches!(n, Node::Element(_)));
        if has_elements {
            self.children.retain(|node| match node {
                Node::Text(text) => !utils::is_whitespace(text.as_bytes()),
                Node::Element(_) => true,
            });
        }
    }
}

impl FromStr for Element {
    type Err = RepresenterError;

    fn from_str(s: &str) -> Result<Self> {
        Element::parse(s)
    }
}

fn element_from_start(start: &BytesStart) -> Result<Element> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut element = Element::new(name);

    for attr in start.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        element.attributes.push((key, value));
    }

    Ok(element)
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.push_child(element);
        return Ok(());
    }

    if root.is_some() {
        return Err(RepresenterError::Parse(format!(
            "unexpected second root element <{}>",
            element.name
        )));
    }
    *root = Some(element);
    Ok(())
}

fn push_text(stack: &mut [Element], text: &str) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => {
            parent.push_text(text);
            Ok(())
        }
        None if utils::is_whitespace(text.as_bytes()) => Ok(()),
        None => Err(RepresenterError::Parse(format!(
            "text outside of the root element: {:?}",
            text
        ))),
    }
}

fn resolve_reference(reference: &BytesRef) -> Result<String> {
    if let Some(ch) = reference.resolve_char_ref()? {
        return Ok(ch.to_string());
    }

    let name = reference.decode()?;
    resolve_predefined_entity(&name)
        .map(str::to_string)
        .ok_or_else(|| RepresenterError::Parse(format!("unknown entity &{};", name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_elements() -> Result<()> {
        let root = Element::parse("<order><id>1</id><item><value>beer</value></item>\n</order>")?;

        assert_eq!(root.name(), "order");
        assert_eq!(root.elements().count(), 2);
        assert_eq!(root.child("id").map(Element::text), Some("1".to_string()));

        let item = root.child("item").expect("item element");
        assert_eq!(item.child("value").map(Element::text), Some("beer".to_string()));
        Ok(())
    }

    #[test]
    fn test_parse_drops_formatting_whitespace() -> Result<()> {
        let root = Element::parse("<wuff>\n  <id>1</id>\n  <link rel=\"self\" href=\"http://self\"/>\n</wuff>")?;
        assert_eq!(root.children().len(), 2);
        assert_eq!(root.text(), "");
        Ok(())
    }

    #[test]
    fn test_parse_keeps_leaf_text_verbatim() -> Result<()> {
        let root = Element::parse("<value> Fish &amp; Chips </value>")?;
        assert_eq!(root.text(), " Fish & Chips ");
        Ok(())
    }

    #[test]
    fn test_parse_character_references_and_cdata() -> Result<()> {
        let root = Element::parse("<value>&#65;<![CDATA[<b>]]></value>")?;
        assert_eq!(root.text(), "A<b>");
        Ok(())
    }

    #[test]
    fn test_parse_attributes_unescaped() -> Result<()> {
        let link = Element::parse(r#"<link rel="self" href="http://x/?a=1&amp;b=2"/>"#)?;
        assert_eq!(link.attribute("rel"), Some("self"));
        assert_eq!(link.attribute("href"), Some("http://x/?a=1&b=2"));
        assert_eq!(link.attribute("type"), None);
        Ok(())
    }

    #[test]
    fn test_parse_skips_declaration_and_comments() -> Result<()> {
        let root = Element::parse("<?xml version=\"1.0\"?>\n<!-- c --><order/>")?;
        assert_eq!(root.name(), "order");
        assert!(root.is_empty());
        Ok(())
    }

    #[test]
    fn test_parse_rejects_mismatched_tags() {
        let result = Element::parse("<order><id>1</order>");
        assert!(result.is_err());
        assert!(result.unwrap_err().is_parse_error());
    }

    #[test]
    fn test_parse_rejects_unclosed_root() {
        assert!(Element::parse("<order><id>1</id>").is_err());
    }

    #[test]
    fn test_parse_rejects_multiple_roots() {
        assert!(Element::parse("<a/><b/>").is_err());
    }

    #[test]
    fn test_parse_rejects_empty_document() {
        assert!(Element::parse("   ").is_err());
    }

    #[test]
    fn test_render_compact() -> Result<()> {
        let order = Element::new("order")
            .with_child(Element::new("id").with_text("1"))
            .with_child(
                Element::new("link")
                    .with_attribute("rel", "self")
                    .with_attribute("href", "http://self"),
            );

        assert_eq!(
            order.render()?,
            r#"<order><id>1</id><link rel="self" href="http://self"/></order>"#
        );
        Ok(())
    }

    #[test]
    fn test_render_empty_element_self_closes() -> Result<()> {
        assert_eq!(Element::new("order").render()?, "<order/>");
        Ok(())
    }

    #[test]
    fn test_render_escapes_text_and_attributes() -> Result<()> {
        let element = Element::new("value")
            .with_attribute("note", "\"quoted\"")
            .with_text("a < b & c");
        let xml = element.render()?;
        assert!(xml.contains("a &lt; b &amp; c"));
        assert_eq!(Element::parse(&xml)?, element);
        Ok(())
    }

    #[test]
    fn test_render_with_indent_and_declaration() -> Result<()> {
        let order = Element::new("order").with_child(Element::new("id").with_text("1"));
        let options = XmlOptions::default().with_indent(2).with_declaration(true);
        let xml = order.render_with(&options)?;

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("\n  <id>1</id>\n"));
        assert_eq!(Element::parse(&xml)?, order);
        Ok(())
    }
}
