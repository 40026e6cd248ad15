//! Ordered key/value tree produced by the XML codec.
//!
//! Elements with only text become [`XmlValue::Text`], repeated sibling
//! elements collapse into [`XmlValue::Array`], and attributes are stored on the
//! owning object under keys prefixed with [`ATTRIBUTE_PREFIX`].

use indexmap::IndexMap;

use super::{ATTRIBUTE_PREFIX, TEXT_KEY, XML_NS_KEY, XML_NS_URL};

/// An ordered map of element names to values
pub type XmlObject = IndexMap<String, XmlValue>;

/// A single node of a parsed document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlValue {
    Text(String),
    Object(XmlObject),
    Array(Vec<XmlValue>),
}

impl XmlValue {
    pub fn text(value: impl Into<String>) -> Self {
        XmlValue::Text(value.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            XmlValue::Text(s) => Some(s),
            XmlValue::Object(obj) => obj.get(TEXT_KEY).and_then(XmlValue::as_text),
            XmlValue::Array(_) => None,
        }
    }

    pub fn as_object(&self) -> Option<&XmlObject> {
        match self {
            XmlValue::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut XmlObject> {
        match self {
            XmlValue::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// View this value as a list, treating a single value as a one-element list.
    pub fn as_list(&self) -> Vec<&XmlValue> {
        match self {
            XmlValue::Array(items) => items.iter().collect(),
            other => vec![other],
        }
    }

    /// Consume this value as a list, treating a single value as a one-element list.
    pub fn into_list(self) -> Vec<XmlValue> {
        match self {
            XmlValue::Array(items) => items,
            other => vec![other],
        }
    }

    /// Coerce into an object. Text becomes an object holding only `#text`,
    /// except the empty string which becomes an empty object.
    pub fn into_object(self) -> XmlObject {
        match self {
            XmlValue::Object(obj) => obj,
            XmlValue::Text(s) if s.is_empty() => XmlObject::new(),
            XmlValue::Text(s) => {
                let mut obj = XmlObject::new();
                obj.insert(TEXT_KEY.to_string(), XmlValue::Text(s));
                obj
            }
            XmlValue::Array(items) => items
                .into_iter()
                .next()
                .map(XmlValue::into_object)
                .unwrap_or_default(),
        }
    }
}

/// Build the root document `{ root_tag: { @_xmlns: url, ...body } }`.
///
/// The namespace marker is always the first key of the root body.
pub fn with_namespace(root_tag: &str, body: XmlObject) -> XmlObject {
    let mut inner = XmlObject::new();
    inner.insert(XML_NS_KEY.to_string(), XmlValue::text(XML_NS_URL));
    for (key, value) in body {
        if key != XML_NS_KEY {
            inner.insert(key, value);
        }
    }
    let mut root = XmlObject::new();
    root.insert(root_tag.to_string(), XmlValue::Object(inner));
    root
}

/// Append `value` under `key`, turning an existing single value into an array.
pub fn push_value(obj: &mut XmlObject, key: &str, value: XmlValue) {
    match obj.get_mut(key) {
        None => {
            obj.insert(key.to_string(), value);
        }
        Some(XmlValue::Array(items)) => items.push(value),
        Some(existing) => {
            let previous = std::mem::replace(existing, XmlValue::Array(Vec::new()));
            if let XmlValue::Array(items) = existing {
                items.push(previous);
                items.push(value);
            }
        }
    }
}

/// Whether a composed object carries anything besides its namespace marker
/// (and other attributes).
pub fn has_real_values(body: &XmlObject) -> bool {
    body.keys().any(|k| !k.starts_with(ATTRIBUTE_PREFIX))
}
