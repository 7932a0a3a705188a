//! Attribute and links definitions.
//!
//! An [`AttributeDefinition`] describes one mapped field of a representer; a
//! [`LinksDefinition`] describes the hypermedia links field as an ordered list
//! of relation/computation pairs. Both are plain data: the codec lives in
//! [`crate::instance`] and [`crate::xml::codec`].

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use hyperxml_model::{AccessorError, Model};
use serde_json::{Map, Number, Value};
use tracing::trace;

use crate::error::ConfigurationError;
use crate::instance::Instance;
use crate::links::{Link, LinkCollection};
use crate::registry::Representer;
use crate::xml::utils::is_valid_name;

/// Type hint for scalar attributes.
///
/// Only affects reading element text; values set from attribute maps or
/// source models are stored as given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScalarType {
    /// Opaque text.
    #[default]
    Text,
    Integer,
    Float,
    Boolean,
}

impl ScalarType {
    /// Parse from a kind spec name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "text" | "string" => Some(ScalarType::Text),
            "integer" | "int" => Some(ScalarType::Integer),
            "float" | "decimal" => Some(ScalarType::Float),
            "boolean" | "bool" => Some(ScalarType::Boolean),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ScalarType::Text => "text",
            ScalarType::Integer => "integer",
            ScalarType::Float => "float",
            ScalarType::Boolean => "boolean",
        }
    }

    /// Converts element text to a value of this type.
    ///
    /// Returns `None` when the text does not fit the type.
    pub fn coerce(&self, text: &str) -> Option<Value> {
        match self {
            ScalarType::Text => Some(Value::String(text.to_string())),
            ScalarType::Integer => text.trim().parse::<i64>().ok().map(Value::from),
            ScalarType::Float => text
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number),
            ScalarType::Boolean => match text.trim() {
                "true" | "1" => Some(Value::Bool(true)),
                "false" | "0" => Some(Value::Bool(false)),
                _ => None,
            },
        }
    }
}

/// Reference to the representer type of a nested or list attribute.
///
/// Named references are resolved against a
/// [`RepresenterRegistry`](crate::RepresenterRegistry) when the owning type is
/// registered; bound references already carry the representer.
#[derive(Clone)]
pub enum TypeRef {
    Named(String),
    Bound(Arc<Representer>),
}

impl TypeRef {
    pub fn name(&self) -> &str {
        match self {
            TypeRef::Named(name) => name,
            TypeRef::Bound(representer) => representer.name(),
        }
    }

    /// The bound representer, `None` while the reference is unresolved.
    pub fn representer(&self) -> Option<&Arc<Representer>> {
        match self {
            TypeRef::Bound(representer) => Some(representer),
            TypeRef::Named(_) => None,
        }
    }
}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Named(name) => f.debug_tuple("Named").field(name).finish(),
            TypeRef::Bound(representer) => {
                f.debug_tuple("Bound").field(&representer.name()).finish()
            }
        }
    }
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
    }
}

impl From<&str> for TypeRef {
    fn from(name: &str) -> Self {
        TypeRef::Named(name.to_string())
    }
}

impl From<String> for TypeRef {
    fn from(name: String) -> Self {
        TypeRef::Named(name)
    }
}

impl From<Arc<Representer>> for TypeRef {
    fn from(representer: Arc<Representer>) -> Self {
        TypeRef::Bound(representer)
    }
}

impl From<&Arc<Representer>> for TypeRef {
    fn from(representer: &Arc<Representer>) -> Self {
        TypeRef::Bound(Arc::clone(representer))
    }
}

/// Kind of a mapped attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum Kind {
    Scalar(ScalarType),
    /// Converted through another representer type.
    Nested(TypeRef),
    /// Sequence of values converted through another representer type, each
    /// rendered under the attribute's tag.
    List(TypeRef),
}

impl Kind {
    pub fn scalar(scalar_type: ScalarType) -> Self {
        Kind::Scalar(scalar_type)
    }

    pub fn nested(type_ref: impl Into<TypeRef>) -> Self {
        Kind::Nested(type_ref.into())
    }

    pub fn list(type_ref: impl Into<TypeRef>) -> Self {
        Kind::List(type_ref.into())
    }

    pub fn type_ref(&self) -> Option<&TypeRef> {
        match self {
            Kind::Scalar(_) => None,
            Kind::Nested(type_ref) | Kind::List(type_ref) => Some(type_ref),
        }
    }

    pub(crate) fn type_ref_mut(&mut self) -> Option<&mut TypeRef> {
        match self {
            Kind::Scalar(_) => None,
            Kind::Nested(type_ref) | Kind::List(type_ref) => Some(type_ref),
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Kind::Scalar(_) => "a scalar",
            Kind::Nested(_) => "an object",
            Kind::List(_) => "a list of objects",
        }
    }
}

impl Default for Kind {
    fn default() -> Self {
        Kind::Scalar(ScalarType::Text)
    }
}

/// Parses a textual kind spec.
///
/// | Spec | Kind |
/// |------|------|
/// | `text`, `string`, `integer`, `float`, `boolean` | scalar |
/// | `item` | nested `item` |
/// | `[item]` | list of `item` |
impl FromStr for Kind {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let spec = s.trim();
        let unsupported = || ConfigurationError::UnsupportedKind {
            spec: s.to_string(),
        };
        let malformed = || ConfigurationError::MalformedTypeReference {
            reference: s.to_string(),
        };

        if let Some(inner) = spec.strip_prefix('[') {
            let inner = inner.strip_suffix(']').ok_or_else(malformed)?.trim();
            if inner.is_empty() || ScalarType::from_name(inner).is_some() {
                return Err(unsupported());
            }
            if !is_valid_name(inner) {
                return Err(malformed());
            }
            return Ok(Kind::List(TypeRef::from(inner)));
        }

        if spec.ends_with(']') {
            return Err(malformed());
        }
        if let Some(scalar_type) = ScalarType::from_name(spec) {
            return Ok(Kind::Scalar(scalar_type));
        }
        if is_valid_name(spec) {
            return Ok(Kind::Nested(TypeRef::from(spec)));
        }
        Err(unsupported())
    }
}

/// Metadata for one mapped field.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeDefinition {
    name: String,
    tag: Option<String>,
    kind: Kind,
    source: Option<String>,
}

impl AttributeDefinition {
    /// Scalar text attribute named `name`, tagged `name`, read from `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tag: None,
            kind: Kind::default(),
            source: None,
        }
    }

    /// Element name used in XML.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_kind(mut self, kind: Kind) -> Self {
        self.kind = kind;
        self
    }

    /// Shorthand for a scalar kind with a type hint.
    pub fn with_type(self, scalar_type: ScalarType) -> Self {
        self.with_kind(Kind::Scalar(scalar_type))
    }

    /// Accessor read on source models instead of the attribute name.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tag(&self) -> &str {
        self.tag.as_deref().unwrap_or(&self.name)
    }

    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    pub(crate) fn kind_mut(&mut self) -> &mut Kind {
        &mut self.kind
    }

    pub fn source(&self) -> &str {
        self.source.as_deref().unwrap_or(&self.name)
    }

    /// Writes this attribute's entry from `attributes` into `target`.
    ///
    /// Does nothing when `attributes` has no entry for the attribute name.
    pub fn populate(
        &self,
        target: &mut dyn Model,
        attributes: &Map<String, Value>,
    ) -> Result<(), AccessorError> {
        match attributes.get(&self.name) {
            Some(value) => target.write(&self.name, value.clone()),
            None => Ok(()),
        }
    }
}

/// Computes a link target from a populated instance.
///
/// Returning `None` leaves the relation out of the link collection.
pub type LinkComputation = Arc<dyn Fn(&Instance) -> Option<String> + Send + Sync>;

/// One declared relation of a [`LinksDefinition`].
#[derive(Clone)]
pub struct LinkRelation {
    rel: String,
    computation: Option<LinkComputation>,
}

impl LinkRelation {
    pub fn rel(&self) -> &str {
        &self.rel
    }

    /// False for relations declared without a renderer.
    pub fn has_computation(&self) -> bool {
        self.computation.is_some()
    }

    /// Evaluates the computation against `instance`.
    pub fn evaluate(&self, instance: &Instance) -> Option<Link> {
        let computation = self.computation.as_ref()?;
        computation(instance).map(|href| Link::new(self.rel.clone(), href))
    }
}

impl fmt::Debug for LinkRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkRelation")
            .field("rel", &self.rel)
            .field("computation", &self.computation.as_ref().map(|_| "Fn"))
            .finish()
    }
}

/// The hypermedia links field of a representer.
#[derive(Debug, Clone)]
pub struct LinksDefinition {
    name: String,
    relations: Vec<LinkRelation>,
}

impl Default for LinksDefinition {
    fn default() -> Self {
        Self::new("links")
    }
}

impl LinksDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            relations: Vec::new(),
        }
    }

    /// Declares a relation without a renderer.
    pub fn link(&mut self, rel: impl Into<String>) -> &mut Self {
        self.relations.push(LinkRelation {
            rel: rel.into(),
            computation: None,
        });
        self
    }

    /// Declares a relation whose target is computed from the instance.
    pub fn link_with<F>(&mut self, rel: impl Into<String>, computation: F) -> &mut Self
    where
        F: Fn(&Instance) -> Option<String> + Send + Sync + 'static,
    {
        self.relations.push(LinkRelation {
            rel: rel.into(),
            computation: Some(Arc::new(computation)),
        });
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn relations(&self) -> &[LinkRelation] {
        &self.relations
    }

    /// Declared relation names in order, duplicates included.
    pub fn rels(&self) -> Vec<&str> {
        self.relations.iter().map(LinkRelation::rel).collect()
    }

    pub fn len(&self) -> usize {
        self.relations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }

    pub(crate) fn append(&mut self, other: &LinksDefinition) {
        self.relations.extend(other.relations.iter().cloned());
    }

    /// Evaluates every relation against `instance`, in declaration order.
    pub fn evaluate(&self, instance: &Instance) -> LinkCollection {
        let mut links = LinkCollection::new();
        for relation in &self.relations {
            match relation.evaluate(instance) {
                Some(link) => links.push(link),
                None => trace!(rel = %relation.rel, "link relation produced no target"),
            }
        }
        links
    }
}

/// Entry of a representer's registry.
#[derive(Debug, Clone)]
pub enum Definition {
    Attribute(AttributeDefinition),
    Links(LinksDefinition),
}

impl Definition {
    pub fn name(&self) -> &str {
        match self {
            Definition::Attribute(attribute) => attribute.name(),
            Definition::Links(links) => links.name(),
        }
    }

    pub fn as_attribute(&self) -> Option<&AttributeDefinition> {
        match self {
            Definition::Attribute(attribute) => Some(attribute),
            Definition::Links(_) => None,
        }
    }

    pub fn as_links(&self) -> Option<&LinksDefinition> {
        match self {
            Definition::Links(links) => Some(links),
            Definition::Attribute(_) => None,
        }
    }
}
