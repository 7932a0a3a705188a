//! Rendering options for the XML codec.
//!
//! Options can be built programmatically or read from the environment.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `HYPERXML_INDENT` | unset | Indentation width; unset renders compact XML |
//! | `HYPERXML_DECLARATION` | false | Emit `<?xml version="1.0" encoding="UTF-8"?>` |
//!
//! # Example
//!
//! ```rust
//! use hyperxml_representer::XmlOptions;
//!
//! // Create from environment
//! let options = XmlOptions::from_env();
//!
//! // Or create programmatically
//! let options = XmlOptions {
//!     name: Some("rap".to_string()),
//!     indent: Some(2),
//!     ..Default::default()
//! };
//! ```

use clap::Parser;
use serde::{Deserialize, Serialize};

/// Options for [`Instance::to_xml`](crate::Instance::to_xml) and rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Parser, Serialize, Deserialize)]
#[command(name = "hyperxml")]
#[serde(default)]
pub struct XmlOptions {
    /// Root element name, overriding the representer's declared name.
    #[arg(skip)]
    pub name: Option<String>,

    /// Indentation width for pretty printing.
    #[arg(long, env = "HYPERXML_INDENT")]
    pub indent: Option<usize>,

    /// Emit an XML declaration before the root element.
    #[arg(long, env = "HYPERXML_DECLARATION", default_value = "false")]
    pub declaration: bool,
}

impl XmlOptions {
    /// Creates options from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::try_parse_from([env!("CARGO_PKG_NAME")]).unwrap_or_default()
    }

    /// Options overriding only the root element name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = Some(indent);
        self
    }

    pub fn with_declaration(mut self, declaration: bool) -> Self {
        self.declaration = declaration;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_render_compact() {
        let options = XmlOptions::default();
        assert_eq!(options.name, None);
        assert_eq!(options.indent, None);
        assert!(!options.declaration);
    }

    #[test]
    fn test_builder() {
        let options = XmlOptions::named("rap").with_indent(2).with_declaration(true);
        assert_eq!(options.name.as_deref(), Some("rap"));
        assert_eq!(options.indent, Some(2));
        assert!(options.declaration);
    }

    #[test]
    fn test_deserialize_partial_json() {
        let options: XmlOptions = serde_json::from_str(r#"{"indent": 4}"#).unwrap();
        assert_eq!(options.indent, Some(4));
        assert_eq!(options.name, None);
    }
}
