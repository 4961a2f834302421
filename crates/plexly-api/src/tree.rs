// Response tree
//
// Plex answers with XML where nearly all data lives in attributes and
// nesting carries structure. `RawTree` is that shape with the wire format
// stripped off: element name, ordered string attributes, nested elements.

use indexmap::IndexMap;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde::Serialize;

use crate::error::Error;

/// One parsed XML element and everything nested below it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RawTree {
    /// Element tag name, e.g. `MediaContainer`, `Directory`, `Video`.
    pub name: String,
    pub attributes: IndexMap<String, String>,
    pub children: Vec<RawTree>,
    /// Non-whitespace character data. Only error bodies carry any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl RawTree {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: RawTree) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// First direct child with the given element name.
    pub fn first_child(&self, name: &str) -> Option<&RawTree> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All direct children with the given element name.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a RawTree> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Depth-first search for the first element with the given name,
    /// including `self`.
    pub fn find(&self, name: &str) -> Option<&RawTree> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(name))
    }

    /// Parse a complete XML document into its root element.
    pub fn parse(xml: &str) -> Result<Self, Error> {
        let xml_error = |message: String| Error::Xml {
            message,
            body: xml.to_owned(),
        };

        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<RawTree> = Vec::new();
        let mut root: Option<RawTree> = None;

        loop {
            let event = reader
                .read_event()
                .map_err(|e| xml_error(format!("at byte {}: {e}", reader.buffer_position())))?;

            match event {
                Event::Start(start) => {
                    stack.push(element_from(&start).map_err(xml_error)?);
                }
                Event::Empty(start) => {
                    let element = element_from(&start).map_err(xml_error)?;
                    attach(&mut stack, &mut root, element).map_err(xml_error)?;
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| xml_error("unbalanced closing tag".into()))?;
                    attach(&mut stack, &mut root, element).map_err(xml_error)?;
                }
                Event::Text(text) => {
                    let text = text.unescape().map_err(|e| xml_error(e.to_string()))?;
                    if let Some(current) = stack.last_mut() {
                        if !text.is_empty() {
                            current.text.get_or_insert_with(String::new).push_str(&text);
                        }
                    }
                }
                Event::CData(data) => {
                    if let Some(current) = stack.last_mut() {
                        let data = String::from_utf8_lossy(&data);
                        current.text.get_or_insert_with(String::new).push_str(&data);
                    }
                }
                Event::Eof => break,
                // Declarations, comments, processing instructions, doctypes.
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(xml_error("unexpected end of document".into()));
        }
        root.ok_or_else(|| xml_error("document has no root element".into()))
    }
}

fn element_from(start: &BytesStart<'_>) -> Result<RawTree, String> {
    let name = std::str::from_utf8(start.name().as_ref())
        .map_err(|e| format!("element name is not UTF-8: {e}"))?
        .to_owned();

    let mut attributes = IndexMap::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| format!("bad attribute on <{name}>: {e}"))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| format!("bad attribute value {key} on <{name}>: {e}"))?
            .into_owned();
        attributes.insert(key, value);
    }

    Ok(RawTree {
        name,
        attributes,
        children: Vec::new(),
        text: None,
    })
}

fn attach(
    stack: &mut [RawTree],
    root: &mut Option<RawTree>,
    element: RawTree,
) -> Result<(), String> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
        return Ok(());
    }
    if root.is_some() {
        return Err(format!("second root element <{}>", element.name));
    }
    *root = Some(element);
    Ok(())
}
