//! Error types for representer definition and conversion.
//!
//! Definition-time problems are reported as [`ConfigurationError`]; everything
//! that can go wrong while converting a value is a [`RepresenterError`].

use hyperxml_model::AccessorError;
use thiserror::Error;

/// Errors raised while declaring or registering a representer type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// The textual kind spec does not name a supported kind.
    #[error("unsupported attribute kind `{spec}`")]
    UnsupportedKind { spec: String },

    /// A nested or list type reference is not a valid type name.
    #[error("malformed type reference `{reference}`")]
    MalformedTypeReference { reference: String },

    /// A nested, list or parent type reference names an unregistered type.
    #[error("unknown representer type `{name}`")]
    UnknownType { name: String },

    /// A type with this name is already registered.
    #[error("representer type `{name}` is already registered")]
    DuplicateType { name: String },

    /// An attribute, tag or type name is empty or contains invalid characters.
    #[error("invalid name `{name}`")]
    InvalidName { name: String },

    /// The attribute tag collides with the element reserved for links.
    #[error("attribute `{attribute}` uses reserved tag `{tag}`")]
    ReservedTag { attribute: String, tag: String },
}

/// Errors raised while converting between instances, models and XML.
#[derive(Error, Debug)]
pub enum RepresenterError {
    /// Definition-time error surfacing through a conversion entry point
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// The source model does not match the representer
    #[error("cannot populate {representer}: {source}")]
    Accessor {
        representer: String,
        source: AccessorError,
    },

    /// Malformed XML reported by the reader
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// IO error while rendering
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Well-formed XML that still cannot be read as a document
    #[error("XML parse error: {0}")]
    Parse(String),

    /// Element text that does not fit the declared scalar type
    #[error("cannot read `{value}` as {expected} for attribute `{attribute}`")]
    Coercion {
        attribute: String,
        value: String,
        expected: &'static str,
    },

    /// A value of the wrong shape for the attribute kind
    #[error("attribute `{attribute}` expects {expected}, got {found}")]
    TypeMismatch {
        attribute: String,
        expected: &'static str,
        found: String,
    },

    /// The attribute is not declared on the representer
    #[error("{representer} has no attribute `{attribute}`")]
    UnknownAttribute {
        representer: String,
        attribute: String,
    },
}

impl RepresenterError {
    /// Returns true for errors caused by malformed XML input.
    pub fn is_parse_error(&self) -> bool {
        matches!(self, RepresenterError::Xml(_) | RepresenterError::Parse(_))
    }
}

impl From<quick_xml::events::attributes::AttrError> for RepresenterError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        RepresenterError::Xml(err.into())
    }
}

impl From<quick_xml::encoding::EncodingError> for RepresenterError {
    fn from(err: quick_xml::encoding::EncodingError) -> Self {
        RepresenterError::Xml(err.into())
    }
}

/// Result type alias for representer operations
pub type Result<T> = std::result::Result<T, RepresenterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessor_error_names_representer() {
        let err = RepresenterError::Accessor {
            representer: "order_xml".to_string(),
            source: AccessorError::missing("order", "total"),
        };
        assert_eq!(
            err.to_string(),
            "cannot populate order_xml: order has no accessor `total`"
        );
    }

    #[test]
    fn test_configuration_error_is_transparent() {
        let err: RepresenterError = ConfigurationError::UnknownType {
            name: "widget".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "unknown representer type `widget`");
        assert!(!err.is_parse_error());
    }
}
