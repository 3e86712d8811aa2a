//! Structured-markup codec.
//!
//! Decoding reads the payload as a quick-xml event stream and folds it into
//! a [`Node`] tree until end-of-stream. Encoding walks a tree and emits
//! events; attribute-flagged children become XML attributes and array nodes
//! carry `type="array"`.

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::error::{deserialization, serialization, RedmineResult};
use crate::serialization::node::{Node, Scalar};

pub(crate) fn parse(payload: &str) -> RedmineResult<Node> {
    let mut reader = Reader::from_str(payload);

    let mut stack: Vec<Node> = Vec::new();
    let mut root: Option<Node> = None;

    loop {
        match reader.read_event().map_err(deserialization)? {
            Event::Start(start) => stack.push(open(&start)?),
            Event::Empty(start) => {
                let node = open(&start)?;
                attach(&mut stack, &mut root, node);
            }
            Event::Text(text) => {
                let text = text.unescape().map_err(deserialization)?;
                if let Some(current) = stack.last_mut() {
                    append_text(current, &text);
                }
            }
            Event::CData(data) => {
                let text = String::from_utf8_lossy(&data.into_inner()).into_owned();
                if let Some(current) = stack.last_mut() {
                    append_text(current, &text);
                }
            }
            Event::End(_) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| deserialization("unbalanced closing tag"))?;
                attach(&mut stack, &mut root, node);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(deserialization(format!("unclosed element `{}`", open.name)));
    }
    root.ok_or_else(|| deserialization("payload contains no XML element"))
}

fn open(start: &BytesStart<'_>) -> RedmineResult<Node> {
    let mut node = Node::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
    for attribute in start.attributes() {
        let attribute = attribute.map_err(deserialization)?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute.unescape_value().map_err(deserialization)?.into_owned();
        if key == "type" {
            node.is_array = value == "array";
            continue;
        }
        // `delay=""` and friends carry no value.
        if value.is_empty() {
            continue;
        }
        let mut child = Node::scalar(key, value);
        child.is_attribute = true;
        node.children.push(child);
    }
    Ok(node)
}

fn append_text(node: &mut Node, text: &str) {
    match &mut node.value {
        Some(Scalar::Text(existing)) => existing.push_str(text),
        _ => node.value = Some(Scalar::Text(text.to_string())),
    }
}

fn attach(stack: &mut [Node], root: &mut Option<Node>, mut node: Node) {
    drop_layout_text(&mut node);
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None if root.is_none() => *root = Some(node),
        None => {}
    }
}

/// Whitespace between child elements is indentation, not content. Text of a
/// leaf element is kept verbatim.
fn drop_layout_text(node: &mut Node) {
    let blank = matches!(&node.value, Some(Scalar::Text(text)) if text.trim().is_empty());
    if blank && (node.is_array || node.elements().next().is_some()) {
        node.value = None;
    }
}

pub(crate) fn render(node: &Node) -> RedmineResult<String> {
    let mut writer = Writer::new(Vec::new());
    write_node(&mut writer, node)?;
    String::from_utf8(writer.into_inner()).map_err(serialization)
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &Node) -> RedmineResult<()> {
    let mut start = BytesStart::new(node.name.as_str());
    if node.is_array {
        start.push_attribute(("type", "array"));
    }
    for attribute in node.children.iter().filter(|c| c.is_attribute) {
        let value = attribute.value.as_ref().map(Scalar::to_string).unwrap_or_default();
        start.push_attribute((attribute.name.as_str(), value.as_str()));
    }

    let has_elements = node.elements().next().is_some();
    if !has_elements && node.value.is_none() {
        return writer.write_event(Event::Empty(start)).map_err(serialization);
    }

    writer.write_event(Event::Start(start.borrow())).map_err(serialization)?;
    if let Some(value) = &node.value {
        let text = value.to_string();
        writer
            .write_event(Event::Text(BytesText::new(&text)))
            .map_err(serialization)?;
    }
    for child in node.elements() {
        write_node(writer, child)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(node.name.as_str())))
        .map_err(serialization)
}
