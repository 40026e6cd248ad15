//! XML codec
//!
//! Composed documents are parsed into an ordered key/value tree
//! ([`XmlObject`]) and serialized back with the metadata namespace on the
//! outermost element.

mod parse;
mod value;
mod write;

pub use parse::{parse_xml, XmlError};
pub use value::{has_real_values, push_value, with_namespace, XmlObject, XmlValue};
pub use write::{to_xml_bytes, to_xml_string};

/// Key under which the namespace attribute is stored
pub const XML_NS_KEY: &str = "@_xmlns";

/// Namespace injected on every composed document
pub const XML_NS_URL: &str = "http://soap.sforce.com/2006/04/metadata";

/// Prefix marking attribute keys in an [`XmlObject`]
pub const ATTRIBUTE_PREFIX: &str = "@_";

/// Key holding element text when the element also has attributes
pub const TEXT_KEY: &str = "#text";

pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;
