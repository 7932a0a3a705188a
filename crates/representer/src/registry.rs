//! Representer types and the registry that builds them.
//!
//! A representer type is declared once with a [`RepresenterDef`] and built into
//! an immutable [`Representer`], either standalone with
//! [`RepresenterDef::build`] or through a [`RepresenterRegistry`] that also
//! resolves nested types by name.
//!
//! Building composes the full registry of the type: the parent's definitions
//! (furthest ancestor first) followed by the type's own. The result is cached
//! in the `Representer` and shared by every instance.
//!
//! # Example
//!
//! ```
//! use hyperxml_representer::{AttributeDefinition, Kind, RepresenterDef, RepresenterRegistry};
//!
//! let mut registry = RepresenterRegistry::new();
//! registry.register(RepresenterDef::new("item").accessor("value"))?;
//! let order = registry.register(
//!     RepresenterDef::new("order")
//!         .accessor("id")
//!         .attribute(AttributeDefinition::new("items").with_kind(Kind::list("item")).with_tag("item"))
//!         .link_with("self", |order| order.text("id").map(|id| format!("http://orders/{id}"))),
//! )?;
//!
//! assert_eq!(order.attributes().len(), 2);
//! # Ok::<(), hyperxml_representer::ConfigurationError>(())
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::definition::{AttributeDefinition, Definition, LinksDefinition, TypeRef};
use crate::error::ConfigurationError;
use crate::instance::Instance;
use crate::xml::utils::{LINK_ELEMENT, is_valid_name};

/// Declaration of a representer type.
#[derive(Debug, Clone)]
pub struct RepresenterDef {
    name: String,
    xml_name: Option<String>,
    parent: Option<TypeRef>,
    attributes: Vec<AttributeDefinition>,
    links: Option<(usize, LinksDefinition)>,
}

impl RepresenterDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            xml_name: None,
            parent: None,
            attributes: Vec::new(),
            links: None,
        }
    }

    /// Root element name used when rendering.
    pub fn xml_name(mut self, xml_name: impl Into<String>) -> Self {
        self.xml_name = Some(xml_name.into());
        self
    }

    /// Inherits every definition of `parent`.
    pub fn extends(mut self, parent: impl Into<TypeRef>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn attribute(mut self, attribute: AttributeDefinition) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Shorthand for a scalar text attribute.
    pub fn accessor(self, name: &str) -> Self {
        self.attribute(AttributeDefinition::new(name))
    }

    /// Registers link relations on the type's single links definition.
    ///
    /// The definition is created on first use; later calls append to it.
    pub fn define_links<F>(mut self, block: F) -> Self
    where
        F: FnOnce(&mut LinksDefinition),
    {
        block(self.links_mut());
        self
    }

    /// Declares a relation without a renderer.
    pub fn link(self, rel: &str) -> Self {
        self.define_links(|links| {
            links.link(rel);
        })
    }

    /// Declares a relation computed from the populated instance.
    pub fn link_with<F>(self, rel: &str, computation: F) -> Self
    where
        F: Fn(&Instance) -> Option<String> + Send + Sync + 'static,
    {
        self.define_links(|links| {
            links.link_with(rel, computation);
        })
    }

    /// Builds the type, accepting only bound nested and parent references.
    pub fn build(self) -> Result<Arc<Representer>, ConfigurationError> {
        Representer::compose(self, |_| None)
    }

    fn links_mut(&mut self) -> &mut LinksDefinition {
        let position = self.attributes.len();
        &mut self
            .links
            .get_or_insert_with(|| (position, LinksDefinition::default()))
            .1
    }
}

/// A built representer type.
#[derive(Debug)]
pub struct Representer {
    name: String,
    xml_name: Option<String>,
    ancestors: Vec<String>,
    definitions: Vec<Definition>,
    attributes: Vec<AttributeDefinition>,
    links: Option<LinksDefinition>,
}

impl Representer {
    fn compose<F>(def: RepresenterDef, lookup: F) -> Result<Arc<Representer>, ConfigurationError>
    where
        F: Fn(&str) -> Option<Arc<Representer>>,
    {
        let RepresenterDef {
            name,
            xml_name,
            parent,
            attributes: own_attributes,
            links: own_links,
        } = def;

        let mut own: Vec<Definition> = own_attributes
            .into_iter()
            .map(Definition::Attribute)
            .collect();
        if let Some((position, links)) = own_links {
            own.insert(position, Definition::Links(links));
        }

        validate_name(&name)?;
        if let Some(xml_name) = &xml_name {
            validate_name(xml_name)?;
        }

        let parent = parent.map(|p| resolve(p, &lookup)).transpose()?;

        let (mut definitions, ancestors) = match &parent {
            Some(parent) => {
                let mut ancestors = vec![parent.name.clone()];
                ancestors.extend(parent.ancestors.iter().cloned());
                (parent.definitions.clone(), ancestors)
            }
            None => (Vec::new(), Vec::new()),
        };

        for definition in own {
            match definition {
                Definition::Attribute(mut attribute) => {
                    validate_attribute(&attribute)?;
                    if let Some(type_ref) = attribute.kind_mut().type_ref_mut() {
                        let bound = resolve(type_ref.clone(), &lookup)?;
                        *type_ref = TypeRef::Bound(bound);
                    }
                    definitions.push(Definition::Attribute(attribute));
                }
                Definition::Links(links) => {
                    let inherited = definitions.iter_mut().find_map(|d| match d {
                        Definition::Links(inherited) => Some(inherited),
                        Definition::Attribute(_) => None,
                    });
                    match inherited {
                        Some(inherited) => inherited.append(&links),
                        None => definitions.push(Definition::Links(links)),
                    }
                }
            }
        }

        // One effective attribute per name: first position, last options.
        let mut attributes: Vec<AttributeDefinition> = Vec::new();
        for attribute in definitions.iter().filter_map(Definition::as_attribute) {
            match attributes.iter().position(|a| a.name() == attribute.name()) {
                Some(index) => attributes[index] = attribute.clone(),
                None => attributes.push(attribute.clone()),
            }
        }

        let links = definitions
            .iter()
            .find_map(Definition::as_links)
            .cloned();

        debug!(
            representer = %name,
            definitions = definitions.len(),
            attributes = attributes.len(),
            links = links.as_ref().map_or(0, LinksDefinition::len),
            "Built representer type"
        );

        Ok(Arc::new(Representer {
            name,
            xml_name,
            ancestors,
            definitions,
            attributes,
            links,
        }))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn xml_name(&self) -> Option<&str> {
        self.xml_name.as_deref()
    }

    /// Declared root name, falling back to the type name.
    pub fn root_name(&self) -> &str {
        self.xml_name.as_deref().unwrap_or(&self.name)
    }

    /// True if this type is `name` or inherits from it.
    pub fn is_a(&self, name: &str) -> bool {
        self.name == name || self.ancestors.iter().any(|a| a == name)
    }

    /// Every registry entry, ancestors first.
    ///
    /// Redeclared attributes appear once per declaration; all link relations
    /// share one links definition.
    pub fn definitions(&self) -> &[Definition] {
        &self.definitions
    }

    /// Attributes the codec walks, one per name, in emission order.
    pub fn attributes(&self) -> &[AttributeDefinition] {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeDefinition> {
        self.attributes.iter().find(|a| a.name() == name)
    }

    pub fn links_definition(&self) -> Option<&LinksDefinition> {
        self.links.as_ref()
    }

    /// Creates an instance with every attribute unset.
    pub fn new_instance(self: &Arc<Self>) -> Instance {
        Instance::new(Arc::clone(self))
    }
}

fn resolve<F>(type_ref: TypeRef, lookup: &F) -> Result<Arc<Representer>, ConfigurationError>
where
    F: Fn(&str) -> Option<Arc<Representer>>,
{
    match type_ref {
        TypeRef::Bound(representer) => Ok(representer),
        TypeRef::Named(name) => {
            if !is_valid_name(&name) {
                return Err(ConfigurationError::MalformedTypeReference { reference: name });
            }
            lookup(&name).ok_or(ConfigurationError::UnknownType { name })
        }
    }
}

fn validate_name(name: &str) -> Result<(), ConfigurationError> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(ConfigurationError::InvalidName {
            name: name.to_string(),
        })
    }
}

fn validate_attribute(attribute: &AttributeDefinition) -> Result<(), ConfigurationError> {
    validate_name(attribute.name())?;
    validate_name(attribute.tag())?;
    if attribute.source().is_empty() {
        return Err(ConfigurationError::InvalidName {
            name: String::new(),
        });
    }
    if attribute.tag() == LINK_ELEMENT {
        return Err(ConfigurationError::ReservedTag {
            attribute: attribute.name().to_string(),
            tag: LINK_ELEMENT.to_string(),
        });
    }
    Ok(())
}

/// Named catalog of representer types.
#[derive(Debug, Default)]
pub struct RepresenterRegistry {
    types: HashMap<String, Arc<Representer>>,
}

impl RepresenterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds `def`, resolving named references against registered types,
    /// and registers the result.
    pub fn register(&mut self, def: RepresenterDef) -> Result<Arc<Representer>, ConfigurationError> {
        if self.types.contains_key(&def.name) {
            return Err(ConfigurationError::DuplicateType { name: def.name });
        }

        let representer = Representer::compose(def, |name| self.types.get(name).cloned())?;
        self.types
            .insert(representer.name().to_string(), Arc::clone(&representer));
        Ok(representer)
    }

    pub fn get(&self, name: &str) -> Option<Arc<Representer>> {
        self.types.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Registered type names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::Kind;

    #[test]
    fn test_link_declarations_share_one_definition() {
        let rapper = RepresenterDef::new("rapper")
            .link("self")
            .link("next")
            .build()
            .unwrap();

        assert_eq!(rapper.definitions().len(), 1);
        let links = rapper.definitions()[0].as_links().expect("links definition");
        assert_eq!(links.rels(), vec!["self", "next"]);
        assert!(links.relations().iter().all(|r| !r.has_computation()));
    }

    #[test]
    fn test_define_links_block() {
        let rapper = RepresenterDef::new("rapper")
            .define_links(|links| {
                links.link("self").link_with("next", |_| Some("http://next".to_string()));
            })
            .build()
            .unwrap();

        let links = rapper.links_definition().unwrap();
        assert_eq!(links.rels(), vec!["self", "next"]);
        assert!(links.relations()[1].has_computation());
    }

    #[test]
    fn test_inheritance_is_additive() {
        let mut registry = RepresenterRegistry::new();
        registry
            .register(RepresenterDef::new("base").accessor("id").link("self"))
            .unwrap();
        let child = registry
            .register(
                RepresenterDef::new("child")
                    .extends("base")
                    .accessor("name")
                    .link("next"),
            )
            .unwrap();

        let names: Vec<&str> = child.definitions().iter().map(Definition::name).collect();
        assert_eq!(names, vec!["id", "links", "name"]);
        assert_eq!(child.links_definition().unwrap().rels(), vec!["self", "next"]);
        assert!(child.is_a("base"));
        assert!(child.is_a("child"));
        assert!(!child.is_a("other"));

        // the parent keeps only its own relation
        let base = registry.get("base").unwrap();
        assert_eq!(base.links_definition().unwrap().rels(), vec!["self"]);
    }

    #[test]
    fn test_redeclared_attribute_keeps_position_and_last_options() {
        let base = RepresenterDef::new("base")
            .accessor("id")
            .accessor("name")
            .build()
            .unwrap();
        let child = RepresenterDef::new("child")
            .extends(&base)
            .attribute(AttributeDefinition::new("id").with_tag("identifier"))
            .build()
            .unwrap();

        assert_eq!(child.definitions().len(), 3);
        let tags: Vec<&str> = child.attributes().iter().map(|a| a.tag()).collect();
        assert_eq!(tags, vec!["identifier", "name"]);
    }

    #[test]
    fn test_root_name() {
        let plain = RepresenterDef::new("order_xml").build().unwrap();
        assert_eq!(plain.root_name(), "order_xml");

        let named = RepresenterDef::new("order_xml").xml_name("order").build().unwrap();
        assert_eq!(named.root_name(), "order");
    }

    #[test]
    fn test_named_references_resolve_through_registry() {
        let mut registry = RepresenterRegistry::new();
        registry
            .register(RepresenterDef::new("item").accessor("value"))
            .unwrap();
        let order = registry
            .register(
                RepresenterDef::new("order")
                    .attribute(AttributeDefinition::new("item").with_kind("item".parse().unwrap())),
            )
            .unwrap();

        let kind = order.attribute("item").unwrap().kind();
        assert!(kind.type_ref().unwrap().representer().is_some());
        assert_eq!(registry.names(), vec!["item", "order"]);
    }

    #[test]
    fn test_unknown_type_reference_fails() {
        let result = RepresenterDef::new("order")
            .attribute(AttributeDefinition::new("item").with_kind(Kind::nested("item")))
            .build();
        assert_eq!(
            result.unwrap_err(),
            ConfigurationError::UnknownType {
                name: "item".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_parent_fails() {
        let mut registry = RepresenterRegistry::new();
        let result = registry.register(RepresenterDef::new("child").extends("base"));
        assert!(matches!(result, Err(ConfigurationError::UnknownType { .. })));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_duplicate_type_fails() {
        let mut registry = RepresenterRegistry::new();
        registry.register(RepresenterDef::new("item")).unwrap();
        let result = registry.register(RepresenterDef::new("item"));
        assert!(matches!(result, Err(ConfigurationError::DuplicateType { .. })));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_reserved_link_tag_fails() {
        let result = RepresenterDef::new("order")
            .attribute(AttributeDefinition::new("links").with_tag("link"))
            .build();
        assert!(matches!(result, Err(ConfigurationError::ReservedTag { .. })));
    }

    #[test]
    fn test_invalid_names_fail() {
        assert!(matches!(
            RepresenterDef::new("").build(),
            Err(ConfigurationError::InvalidName { .. })
        ));
        assert!(matches!(
            RepresenterDef::new("order").accessor("line item").build(),
            Err(ConfigurationError::InvalidName { .. })
        ));
        assert!(matches!(
            RepresenterDef::new("order").xml_name("<order>").build(),
            Err(ConfigurationError::InvalidName { .. })
        ));
    }
}
