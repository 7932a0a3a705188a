//! Hypermedia links.
//!
//! A [`Link`] is a relation/target pair rendered as
//! `<link rel="self" href="http://example.org/orders/1"/>`. A
//! [`LinkCollection`] keeps links in document order and answers lookups by
//! relation name.
//!
//! Relation names are compared after normalization: surrounding whitespace and
//! a leading `:` are ignored, so `"self"`, `" self"` and `":self"` name the
//! same relation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{RepresenterError, Result};
use crate::xml::document::Element;
use crate::xml::utils::{HREF_ATTRIBUTE, LINK_ELEMENT, REL_ATTRIBUTE};

/// Normalizes a relation name for comparison.
pub fn normalize_rel(rel: &str) -> &str {
    let rel = rel.trim();
    rel.strip_prefix(':').unwrap_or(rel)
}

/// A single relation/target pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rel: Option<String>,
    pub href: String,
}

impl Link {
    pub fn new(rel: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            rel: Some(rel.into()),
            href: href.into(),
        }
    }

    pub fn rel(&self) -> Option<&str> {
        self.rel.as_deref()
    }

    pub fn href(&self) -> &str {
        &self.href
    }

    /// True if the link's relation matches `rel` after normalization.
    pub fn has_rel(&self, rel: &str) -> bool {
        self.rel
            .as_deref()
            .is_some_and(|own| normalize_rel(own) == normalize_rel(rel))
    }

    /// Attribute form, `{"rel": ..., "href": ...}`.
    pub fn to_attributes(&self) -> Map<String, Value> {
        let mut attributes = Map::new();
        if let Some(rel) = &self.rel {
            attributes.insert(REL_ATTRIBUTE.to_string(), Value::String(rel.clone()));
        }
        attributes.insert(HREF_ATTRIBUTE.to_string(), Value::String(self.href.clone()));
        attributes
    }

    /// Builds the `<link/>` element.
    pub fn to_xml(&self) -> Element {
        let mut element = Element::new(LINK_ELEMENT);
        if let Some(rel) = &self.rel {
            element.set_attribute(REL_ATTRIBUTE, rel.as_str());
        }
        element.set_attribute(HREF_ATTRIBUTE, self.href.as_str());
        element
    }

    /// Reads a link from a parsed `<link/>` element. A missing `href` reads
    /// as an empty target.
    pub fn from_element(element: &Element) -> Result<Link> {
        if element.name() != LINK_ELEMENT {
            return Err(RepresenterError::Parse(format!(
                "expected <{}>, found <{}>",
                LINK_ELEMENT,
                element.name()
            )));
        }

        Ok(Link {
            rel: element.attribute(REL_ATTRIBUTE).map(str::to_string),
            href: element.attribute(HREF_ATTRIBUTE).unwrap_or_default().to_string(),
        })
    }

    /// Parses a standalone `<link/>` fragment.
    pub fn from_xml(xml: &str) -> Result<Link> {
        Link::from_element(&Element::parse(xml)?)
    }
}

/// Ordered links with lookup by relation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkCollection {
    links: Vec<Link>,
}

impl LinkCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a link built from `rel` and `href`.
    pub fn add(&mut self, rel: impl Into<String>, href: impl Into<String>) {
        self.links.push(Link::new(rel, href));
    }

    pub fn push(&mut self, link: Link) {
        self.links.push(link);
    }

    /// Target of the first link with relation `rel`.
    pub fn get(&self, rel: &str) -> Option<&str> {
        self.find(rel).map(Link::href)
    }

    /// First link with relation `rel`.
    pub fn find(&self, rel: &str) -> Option<&Link> {
        self.links.iter().find(|link| link.has_rel(rel))
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Link> {
        self.links.iter()
    }

    pub fn first(&self) -> Option<&Link> {
        self.links.first()
    }

    pub fn last(&self) -> Option<&Link> {
        self.links.last()
    }

    pub fn as_slice(&self) -> &[Link] {
        &self.links
    }

    /// Relation names in order, links without a relation skipped.
    pub fn rels(&self) -> Vec<&str> {
        self.links.iter().filter_map(Link::rel).collect()
    }

    /// Builds a collection from a JSON array of `{"rel", "href"}` objects.
    pub fn from_attributes(value: &Value) -> Result<Self> {
        serde_json::from_value(value.clone()).map_err(|e| RepresenterError::TypeMismatch {
            attribute: "links".to_string(),
            expected: "an array of {rel, href} objects",
            found: e.to_string(),
        })
    }

    /// JSON array of `{"rel", "href"}` objects.
    pub fn to_attributes(&self) -> Value {
        Value::Array(
            self.links
                .iter()
                .map(|link| Value::Object(link.to_attributes()))
                .collect(),
        )
    }
}

impl From<Vec<Link>> for LinkCollection {
    fn from(links: Vec<Link>) -> Self {
        Self { links }
    }
}

impl FromIterator<Link> for LinkCollection {
    fn from_iter<I: IntoIterator<Item = Link>>(iter: I) -> Self {
        Self {
            links: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for LinkCollection {
    type Item = Link;
    type IntoIter = std::vec::IntoIter<Link>;

    fn into_iter(self) -> Self::IntoIter {
        self.links.into_iter()
    }
}

impl<'a> IntoIterator for &'a LinkCollection {
    type Item = &'a Link;
    type IntoIter = std::slice::Iter<'a, Link>;

    fn into_iter(self) -> Self::IntoIter {
        self.links.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_link_from_xml() -> Result<()> {
        let link = Link::from_xml(r#"<link rel="self" href="http://roar.apotomo.de"/>"#)?;
        assert_eq!(link.rel(), Some("self"));
        assert_eq!(link.href(), "http://roar.apotomo.de");
        Ok(())
    }

    #[test]
    fn test_link_xml_round_trip() -> Result<()> {
        let link = Link::new("next", "http://next/1?page=2&size=10");
        let xml = link.to_xml().render()?;
        assert_eq!(
            xml,
            r#"<link rel="next" href="http://next/1?page=2&amp;size=10"/>"#
        );
        assert_eq!(Link::from_xml(&xml)?, link);
        Ok(())
    }

    #[test]
    fn test_link_without_rel() -> Result<()> {
        let link = Link::from_xml(r#"<link href="http://anywhere"/>"#)?;
        assert_eq!(link.rel(), None);
        assert_eq!(link.to_xml().render()?, r#"<link href="http://anywhere"/>"#);
        assert_eq!(Value::Object(link.to_attributes()), json!({"href": "http://anywhere"}));
        Ok(())
    }

    #[test]
    fn test_link_from_xml_rejects_other_elements() {
        assert!(Link::from_xml(r#"<a rel="self" href="http://self"/>"#).is_err());
    }

    #[test]
    fn test_link_from_xml_without_href() -> Result<()> {
        let link = Link::from_xml(r#"<link rel="self"/>"#)?;
        assert_eq!(link.rel(), Some("self"));
        assert_eq!(link.href(), "");
        Ok(())
    }

    #[test]
    fn test_link_to_attributes() {
        let link = Link::new("self", "http://self");
        assert_eq!(
            Value::Object(link.to_attributes()),
            json!({"rel": "self", "href": "http://self"})
        );
    }

    #[test]
    fn test_collection_lookup_normalizes_relation() -> Result<()> {
        let links = LinkCollection::from_attributes(&json!([
            {"rel": "self", "href": "http://self"},
            {"rel": "next", "href": "http://next"}
        ]))?;

        assert_eq!(links.len(), 2);
        assert_eq!(links.get("self"), Some("http://self"));
        assert_eq!(links.get(":self"), Some("http://self"));
        assert_eq!(links.get(":next"), Some("http://next"));
        assert_eq!(links.get("prev"), None);
        Ok(())
    }

    #[test]
    fn test_collection_first_match_wins() {
        let mut links = LinkCollection::new();
        links.add("alternate", "http://a");
        links.add("alternate", "http://b");

        assert_eq!(links.get("alternate"), Some("http://a"));
        assert_eq!(links.rels(), vec!["alternate", "alternate"]);
    }

    #[test]
    fn test_collection_from_attributes_rejects_bad_shape() {
        let result = LinkCollection::from_attributes(&json!({"rel": "self"}));
        assert!(matches!(
            result,
            Err(RepresenterError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_collection_to_attributes() {
        let links: LinkCollection = vec![Link::new("self", "http://self")].into();
        assert_eq!(
            links.to_attributes(),
            json!([{"rel": "self", "href": "http://self"}])
        );
    }
}
