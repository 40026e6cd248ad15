//! XML → [`XmlObject`] parsing on top of `quick-xml`.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::value::{push_value, XmlObject, XmlValue};
use super::{ATTRIBUTE_PREFIX, TEXT_KEY};

/// Parse failure with a human readable message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlError {
    pub message: String,
    pub position: u64,
}

impl std::fmt::Display for XmlError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (at byte {})", self.message, self.position)
    }
}

impl std::error::Error for XmlError {}

struct Frame {
    name: String,
    object: XmlObject,
    text: String,
}

impl Frame {
    fn open(start: &BytesStart<'_>) -> Result<Self, String> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut object = XmlObject::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| e.to_string())?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value().map_err(|e| e.to_string())?;
            object.insert(
                format!("{}{}", ATTRIBUTE_PREFIX, key),
                XmlValue::Text(value.into_owned()),
            );
        }
        Ok(Self {
            name,
            object,
            text: String::new(),
        })
    }

    fn close(self) -> (String, XmlValue) {
        let Frame {
            name,
            mut object,
            text,
        } = self;
        if object.is_empty() {
            return (name, XmlValue::Text(text));
        }
        if !text.is_empty() {
            object.insert(TEXT_KEY.to_string(), XmlValue::Text(text));
        }
        (name, XmlValue::Object(object))
    }
}

/// Parse a document into `{ rootTag: value }`.
///
/// Whitespace-only text between elements is dropped; declarations,
/// comments and processing instructions are ignored.
pub fn parse_xml(bytes: &[u8]) -> Result<XmlObject, XmlError> {
    let mut reader = Reader::from_reader(bytes);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<(String, XmlValue)> = None;
    let mut buf = Vec::new();

    loop {
        let position = reader.buffer_position();
        let err = |message: String| XmlError {
            message,
            position: position as u64,
        };
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(start)) => {
                if root.is_some() {
                    return Err(err("multiple root elements".to_string()));
                }
                stack.push(Frame::open(&start).map_err(err)?);
            }
            Ok(Event::Empty(start)) => {
                if root.is_some() {
                    return Err(err("multiple root elements".to_string()));
                }
                let frame = Frame::open(&start).map_err(err)?;
                attach(&mut stack, &mut root, frame.close());
            }
            Ok(Event::End(_)) => {
                let frame = stack
                    .pop()
                    .ok_or_else(|| err("unexpected closing tag".to_string()))?;
                attach(&mut stack, &mut root, frame.close());
            }
            Ok(Event::Text(text)) => {
                let value = text.unescape().map_err(|e| err(e.to_string()))?;
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&value);
                }
            }
            Ok(Event::CData(cdata)) => {
                if let Some(frame) = stack.last_mut() {
                    frame
                        .text
                        .push_str(&String::from_utf8_lossy(&cdata.into_inner()));
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(err(e.to_string())),
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(XmlError {
            message: format!("unclosed element <{}>", stack[stack.len() - 1].name),
            position: reader.buffer_position() as u64,
        });
    }

    let (name, value) = root.ok_or_else(|| XmlError {
        message: "document has no root element".to_string(),
        position: 0,
    })?;
    let mut doc = XmlObject::new();
    doc.insert(name, value);
    Ok(doc)
}

fn attach(stack: &mut [Frame], root: &mut Option<(String, XmlValue)>, node: (String, XmlValue)) {
    let (name, value) = node;
    match stack.last_mut() {
        Some(parent) => push_value(&mut parent.object, &name, value),
        None => *root = Some((name, value)),
    }
}
