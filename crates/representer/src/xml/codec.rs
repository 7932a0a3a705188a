//! XML form of representer instances.
//!
//! ```xml
//! <order>
//!   <id>1</id>
//!   <item><value>Beer</value></item>
//!   <link rel="self" href="http://orders/1"/>
//! </order>
//! ```
//!
//! Attributes are emitted in the representer's effective order, followed by
//! one `<link/>` per link. Unset scalars, unset or empty nested instances and
//! empty lists produce no element. On the way back in, unknown elements are
//! ignored and `<link/>` children are always collected.

use std::sync::Arc;

use hyperxml_model::Model;
use tracing::trace;

use crate::definition::Kind;
use crate::error::{RepresenterError, Result};
use crate::instance::{AttributeValue, Instance, bound};
use crate::links::{Link, LinkCollection};
use crate::options::XmlOptions;
use crate::registry::Representer;
use crate::xml::document::Element;
use crate::xml::utils::{LINK_ELEMENT, scalar_text};

impl Instance {
    /// Root element name: the explicit override, then the declared XML name,
    /// then the source model's type name, then the representer name.
    pub fn root_name<'a>(&'a self, options: &'a XmlOptions) -> &'a str {
        options
            .name
            .as_deref()
            .or(self.representer().xml_name())
            .or(self.model_name())
            .unwrap_or(self.representer().name())
    }

    /// Builds the document tree for this instance.
    pub fn to_xml(&self, options: &XmlOptions) -> Element {
        self.to_element(self.root_name(options))
    }

    /// Renders this instance as XML text.
    pub fn serialize(&self, options: &XmlOptions) -> Result<String> {
        self.to_xml(options).render_with(options)
    }

    fn to_element(&self, name: &str) -> Element {
        let mut element = Element::new(name);

        for (attribute, value) in self.iter() {
            match value {
                AttributeValue::Scalar(value) => {
                    if let Some(text) = scalar_text(value) {
                        element.push_child(Element::new(attribute.tag()).with_text(&text));
                    }
                }
                AttributeValue::Nested(nested) => {
                    if nested.is_empty() {
                        trace!(attribute = attribute.name(), "skipping empty nested instance");
                        continue;
                    }
                    element.push_child(nested.to_element(attribute.tag()));
                }
                AttributeValue::List(items) => {
                    for item in items {
                        element.push_child(item.to_element(attribute.tag()));
                    }
                }
            }
        }

        if let Some(links) = self.links() {
            for link in links {
                element.push_child(link.to_xml());
            }
        }
        element
    }
}

impl Representer {
    /// Parses XML text into an instance.
    ///
    /// `None` and blank input yield an empty instance.
    pub fn from_xml(self: &Arc<Self>, xml: Option<&str>) -> Result<Instance> {
        match xml {
            Some(xml) if !xml.trim().is_empty() => self.from_element(&Element::parse(xml)?),
            _ => Ok(self.new_instance()),
        }
    }

    /// Reads an instance from a parsed element; the element name is not checked.
    pub fn from_element(self: &Arc<Self>, element: &Element) -> Result<Instance> {
        let mut instance = self.new_instance();

        for attribute in self.attributes() {
            let tag = attribute.tag();
            let value = match attribute.kind() {
                Kind::Scalar(scalar_type) => {
                    let Some(child) = element.child(tag) else {
                        continue;
                    };
                    let text = child.text();
                    let value = scalar_type.coerce(&text).ok_or_else(|| {
                        RepresenterError::Coercion {
                            attribute: attribute.name().to_string(),
                            value: text.clone(),
                            expected: scalar_type.name(),
                        }
                    })?;
                    AttributeValue::Scalar(value)
                }
                Kind::Nested(type_ref) => {
                    let Some(child) = element.child(tag) else {
                        continue;
                    };
                    AttributeValue::Nested(Box::new(bound(type_ref)?.from_element(child)?))
                }
                Kind::List(type_ref) => {
                    let nested = bound(type_ref)?;
                    let items = element
                        .children_named(tag)
                        .map(|child| nested.from_element(child))
                        .collect::<Result<Vec<_>>>()?;
                    if items.is_empty() {
                        continue;
                    }
                    AttributeValue::List(items)
                }
            };
            trace!(representer = self.name(), attribute = attribute.name(), "read element");
            instance.values.insert(attribute.name().to_string(), value);
        }

        let links = element
            .children_named(LINK_ELEMENT)
            .map(Link::from_element)
            .collect::<Result<LinkCollection>>()?;
        if !links.is_empty() {
            instance.links = Some(links);
        }

        Ok(instance)
    }

    /// Populates an instance from `source` and renders it.
    pub fn serialize_model(self: &Arc<Self>, source: &dyn Model, options: &XmlOptions) -> Result<String> {
        self.populate_from_source(source)?.serialize(options)
    }
}
