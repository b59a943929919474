//! XML → nested mapping conversion.
//!
//! Every action answers with a small XML document such as
//!
//! ```xml
//! <results>
//!   <status code="ok"/>
//!   <sco sco-id="2006" folder-id="11002" type="meeting">
//!     <name>Weekly sync</name>
//!     <url-path>/weekly/</url-path>
//!   </sco>
//! </results>
//! ```
//!
//! which becomes
//!
//! ```json
//! { "status": { "code": "ok" },
//!   "sco": { "sco-id": "2006", "folder-id": "11002", "type": "meeting",
//!            "name": "Weekly sync", "url-path": "/weekly/" } }
//! ```
//!
//! Rules:
//! - the root element's content is the top-level mapping,
//! - attributes are flattened next to child keys (an attribute wins a clash),
//! - a repeated child name becomes a list,
//! - a leaf element is its text, or an empty mapping when it has none,
//! - text beside attributes or children is kept under [`TEXT_KEY`].

use crate::error::{ConnectError, ConnectResult};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde_json::{Map, Value};

/// Key holding the text of an element that also has attributes or children.
pub const TEXT_KEY: &str = "#text";

/// An element being assembled while its end tag is pending.
struct Frame {
    name: String,
    attributes: Map<String, Value>,
    children: Map<String, Value>,
    text: String,
}

impl Frame {
    fn open(e: &BytesStart) -> ConnectResult<Self> {
        let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
        let mut attributes = Map::new();
        for attr in e.attributes() {
            let attr = attr?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            attributes.insert(key, Value::String(value));
        }
        Ok(Frame {
            name,
            attributes,
            children: Map::new(),
            text: String::new(),
        })
    }

    fn add_child(&mut self, name: String, value: Value) {
        match self.children.get_mut(&name) {
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                self.children.insert(name, value);
            }
        }
    }

    fn into_value(self) -> Value {
        let text = self.text.trim().to_string();
        if self.attributes.is_empty() && self.children.is_empty() {
            return if text.is_empty() {
                Value::Object(Map::new())
            } else {
                Value::String(text)
            };
        }
        let mut merged = self.attributes;
        for (key, value) in self.children {
            merged.entry(key).or_insert(value);
        }
        if !text.is_empty() {
            merged.insert(TEXT_KEY.to_string(), Value::String(text));
        }
        Value::Object(merged)
    }
}

/// Convert an XML document into a nested mapping.
pub fn xml_to_value(xml: &str) -> ConnectResult<Value> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<Value> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                stack.push(Frame::open(e)?);
            }
            Ok(Event::Empty(ref e)) => {
                let frame = Frame::open(e)?;
                close(frame, &mut stack, &mut root);
            }
            Ok(Event::Text(ref e)) => {
                if let Some(frame) = stack.last_mut() {
                    let text = e
                        .unescape()
                        .map_err(|err| ConnectError::Parse(format!("XML text error: {}", err)))?;
                    frame.text.push_str(&text);
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Ok(Event::End(ref e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                let frame = stack.pop().ok_or_else(|| {
                    ConnectError::Parse(format!("Unexpected closing tag </{}>", name))
                })?;
                close(frame, &mut stack, &mut root);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ConnectError::Parse(format!(
                    "XML error at position {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
            _ => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        return Err(ConnectError::Parse(format!("Unclosed element <{}>", open.name)));
    }
    root.ok_or_else(|| ConnectError::Parse("Empty XML document".into()))
}

/// Attach a finished element to its parent, or make it the root.
fn close(frame: Frame, stack: &mut [Frame], root: &mut Option<Value>) {
    let name = frame.name.clone();
    let value = frame.into_value();
    match stack.last_mut() {
        Some(parent) => parent.add_child(name, value),
        None => {
            if root.is_none() {
                *root = Some(value);
            }
        }
    }
}

/// Whether a node carries no data: null, `""`, `{}` or `[]`.
pub fn is_empty_node(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Object(m) => m.is_empty(),
        Value::Array(a) => a.is_empty(),
        _ => false,
    }
}

/// View a node that may be a single element or a list of elements as a list.
pub fn node_list(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().collect(),
        v if is_empty_node(v) => Vec::new(),
        v => vec![v],
    }
}
