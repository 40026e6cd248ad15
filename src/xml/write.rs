//! [`XmlObject`] → XML serialization.
//!
//! Output is stable: declaration line, four-space indentation, one element per
//! line, trailing newline.

use quick_xml::escape::{escape, partial_escape};

use super::value::{XmlObject, XmlValue};
use super::{ATTRIBUTE_PREFIX, TEXT_KEY, XML_DECLARATION};

const INDENT: &str = "    ";

/// Serialize a `{ rootTag: value }` document.
pub fn to_xml_string(doc: &XmlObject) -> String {
    let mut out = String::with_capacity(256);
    out.push_str(XML_DECLARATION);
    out.push('\n');
    for (name, value) in doc {
        write_element(&mut out, name, value, 0);
    }
    out
}

/// Serialize a document to bytes.
pub fn to_xml_bytes(doc: &XmlObject) -> Vec<u8> {
    to_xml_string(doc).into_bytes()
}

fn write_element(out: &mut String, name: &str, value: &XmlValue, depth: usize) {
    match value {
        XmlValue::Array(items) => {
            for item in items {
                write_element(out, name, item, depth);
            }
        }
        XmlValue::Text(text) => {
            push_indent(out, depth);
            out.push('<');
            out.push_str(name);
            out.push('>');
            out.push_str(&partial_escape(text.as_str()));
            out.push_str("</");
            out.push_str(name);
            out.push_str(">\n");
        }
        XmlValue::Object(obj) => write_object(out, name, obj, depth),
    }
}

fn write_object(out: &mut String, name: &str, obj: &XmlObject, depth: usize) {
    push_indent(out, depth);
    out.push('<');
    out.push_str(name);

    let mut text: Option<&str> = None;
    let mut has_children = false;
    for (key, value) in obj {
        if let Some(attr) = key.strip_prefix(ATTRIBUTE_PREFIX) {
            out.push(' ');
            out.push_str(attr);
            out.push_str("=\"");
            out.push_str(&escape(value.as_text().unwrap_or_default()));
            out.push('"');
        } else if key == TEXT_KEY {
            text = value.as_text();
        } else {
            has_children = true;
        }
    }

    if !has_children {
        match text {
            Some(text) => {
                out.push('>');
                out.push_str(&partial_escape(text));
                out.push_str("</");
                out.push_str(name);
                out.push_str(">\n");
            }
            None => out.push_str("/>\n"),
        }
        return;
    }

    out.push_str(">\n");
    if let Some(text) = text {
        push_indent(out, depth + 1);
        out.push_str(&partial_escape(text));
        out.push('\n');
    }
    for (key, value) in obj {
        if key.starts_with(ATTRIBUTE_PREFIX) || key == TEXT_KEY {
            continue;
        }
        write_element(out, key, value, depth + 1);
    }
    push_indent(out, depth);
    out.push_str("</");
    out.push_str(name);
    out.push_str(">\n");
}

fn push_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}
