//! Format-neutral node tree shared by both codecs.
//!
//! # Design
//! The XML codec folds its event stream into [`Node`]s and the JSON codec
//! converts its value tree into the same shape, so each entity kind needs a
//! single field dispatch table. XML attributes become children flagged
//! `is_attribute`; the `type="array"` marker becomes `is_array`.
//!
//! [`NodeWriter`] is the encode-side mirror: entities push their fields into
//! it and the codec renders the resulting tree.

use std::fmt;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

use crate::error::{deserialization, RedmineResult};
use crate::serialization::{Decode, Encode, WriteMode};
use crate::types::IdentifiableName;

/// A leaf value. XML only ever produces `Text`; JSON keeps its runtime type.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Text(String),
    Integer(i64),
    Decimal(f64),
    Boolean(bool),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Text(s) => f.write_str(s),
            Scalar::Integer(n) => write!(f, "{n}"),
            Scalar::Decimal(n) => write!(f, "{n}"),
            Scalar::Boolean(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Scalar::Integer(value.into())
    }
}

impl From<u32> for Scalar {
    fn from(value: u32) -> Self {
        Scalar::Integer(value.into())
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Integer(value)
    }
}

impl From<f32> for Scalar {
    fn from(value: f32) -> Self {
        Scalar::Decimal(value.into())
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Boolean(value)
    }
}

/// One named element (XML) or member (JSON).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Node {
    pub name: String,
    pub value: Option<Scalar>,
    pub children: Vec<Node>,
    pub is_array: bool,
    pub is_attribute: bool,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn scalar(name: impl Into<String>, value: impl Into<Scalar>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
            ..Self::default()
        }
    }

    /// No value, no children, no attributes and no array marker: a
    /// self-closed placeholder or a JSON `null`. Decoders skip these.
    pub fn is_empty(&self) -> bool {
        !self.is_array && self.children.is_empty() && self.value.is_none()
    }

    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Children that are elements rather than attributes.
    pub fn elements(&self) -> impl Iterator<Item = &Node> {
        self.children.iter().filter(|c| !c.is_attribute)
    }

    fn raw(&self) -> RedmineResult<&Scalar> {
        self.value
            .as_ref()
            .ok_or_else(|| deserialization(format!("field `{}` has no value", self.name)))
    }

    pub fn to_text(&self) -> RedmineResult<String> {
        Ok(self.raw()?.to_string())
    }

    pub fn to_i64(&self) -> RedmineResult<i64> {
        match self.raw()? {
            Scalar::Integer(n) => Ok(*n),
            Scalar::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| deserialization(format!("field `{}`: invalid integer `{s}`", self.name))),
            other => Err(deserialization(format!(
                "field `{}`: expected an integer, found `{other}`",
                self.name
            ))),
        }
    }

    pub fn to_i32(&self) -> RedmineResult<i32> {
        let n = self.to_i64()?;
        i32::try_from(n).map_err(|_| deserialization(format!("field `{}`: {n} out of range", self.name)))
    }

    pub fn to_u32(&self) -> RedmineResult<u32> {
        let n = self.to_i64()?;
        u32::try_from(n).map_err(|_| deserialization(format!("field `{}`: {n} out of range", self.name)))
    }

    pub fn to_f32(&self) -> RedmineResult<f32> {
        match self.raw()? {
            Scalar::Decimal(n) => Ok(*n as f32),
            Scalar::Integer(n) => Ok(*n as f32),
            Scalar::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| deserialization(format!("field `{}`: invalid number `{s}`", self.name))),
            Scalar::Boolean(b) => Err(deserialization(format!(
                "field `{}`: expected a number, found `{b}`",
                self.name
            ))),
        }
    }

    pub fn to_bool(&self) -> RedmineResult<bool> {
        match self.raw()? {
            Scalar::Boolean(b) => Ok(*b),
            Scalar::Integer(n) => Ok(*n != 0),
            Scalar::Text(s) => match s.trim() {
                "true" | "1" => Ok(true),
                "false" | "0" => Ok(false),
                other => Err(deserialization(format!(
                    "field `{}`: invalid boolean `{other}`",
                    self.name
                ))),
            },
            Scalar::Decimal(n) => Err(deserialization(format!(
                "field `{}`: expected a boolean, found `{n}`",
                self.name
            ))),
        }
    }

    pub fn to_date(&self) -> RedmineResult<NaiveDate> {
        let text = self.to_text()?;
        NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
            .map_err(|e| deserialization(format!("field `{}`: invalid date `{text}`: {e}", self.name)))
    }

    pub fn to_datetime(&self) -> RedmineResult<DateTime<Utc>> {
        let text = self.to_text()?;
        DateTime::parse_from_rfc3339(text.trim())
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| deserialization(format!("field `{}`: invalid timestamp `{text}`: {e}", self.name)))
    }

    /// Leaf values of an array node, e.g. a role's permissions. Positions
    /// are kept: an empty item (`<value></value>`) reads as `""`.
    pub fn to_strings(&self) -> RedmineResult<Vec<String>> {
        self.elements()
            .map(|item| if item.is_empty() { Ok(String::new()) } else { item.to_text() })
            .collect()
    }

    /// Decodes this node as one entity.
    pub fn decode<T: Decode>(&self) -> RedmineResult<T> {
        super::read_entity(self)
    }

    /// Decodes every element of this collection node. Empty items are
    /// dropped; the collection itself is never `None` once present.
    pub fn collection<T: Decode>(&self) -> RedmineResult<Vec<T>> {
        self.elements()
            .filter(|item| !item.is_empty())
            .map(|item| super::read_entity::<T>(item))
            .collect()
    }
}

/// Collects the fields of one entity during encode.
#[derive(Debug)]
pub struct NodeWriter {
    mode: WriteMode,
    value: Option<Scalar>,
    nodes: Vec<Node>,
}

impl NodeWriter {
    pub fn new(mode: WriteMode) -> Self {
        Self {
            mode,
            value: None,
            nodes: Vec::new(),
        }
    }

    pub fn mode(&self) -> WriteMode {
        self.mode
    }

    pub fn is_full(&self) -> bool {
        self.mode == WriteMode::Full
    }

    /// Finishes into a node named `name`.
    pub fn into_node(self, name: &str) -> Node {
        Node {
            name: name.to_string(),
            value: self.value,
            children: self.nodes,
            is_array: false,
            is_attribute: false,
        }
    }

    /// Sets the node's own text content (`<error>text</error>`).
    pub fn text(&mut self, value: impl Into<Scalar>) {
        self.value = Some(value.into());
    }

    pub fn value(&mut self, name: &str, value: impl Into<Scalar>) {
        self.nodes.push(Node::scalar(name, value));
    }

    pub fn optional<V: Into<Scalar>>(&mut self, name: &str, value: Option<V>) {
        if let Some(value) = value {
            self.value(name, value);
        }
    }

    /// Rendered as an XML attribute; a plain member in JSON.
    pub fn attribute(&mut self, name: &str, value: impl Into<Scalar>) {
        let mut node = Node::scalar(name, value);
        node.is_attribute = true;
        self.nodes.push(node);
    }

    pub fn optional_attribute<V: Into<Scalar>>(&mut self, name: &str, value: Option<V>) {
        if let Some(value) = value {
            self.attribute(name, value);
        }
    }

    pub fn date(&mut self, name: &str, value: Option<NaiveDate>) {
        self.optional(name, value.map(|d| d.format("%Y-%m-%d").to_string()));
    }

    pub fn datetime(&mut self, name: &str, value: Option<DateTime<Utc>>) {
        self.optional(name, value.map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true)));
    }

    /// A foreign reference: nested `{id, name}` in full mode, `{name}_id` in
    /// request bodies.
    pub fn reference(&mut self, name: &str, reference: Option<&IdentifiableName>) {
        self.reference_as(name, &format!("{name}_id"), reference);
    }

    /// Like [`reference`](Self::reference) with an irregular request key.
    pub fn reference_as(&mut self, name: &str, request_key: &str, reference: Option<&IdentifiableName>) {
        let Some(reference) = reference else { return };
        if self.is_full() {
            self.nested(name, Some(reference));
        } else {
            self.value(request_key, reference.id);
        }
    }

    pub fn nested<T: Encode>(&mut self, name: &str, entity: Option<&T>) {
        if let Some(entity) = entity {
            let node = self.encode_child(name, entity);
            self.nodes.push(node);
        }
    }

    /// An explicit array; `Some(&[])` yields an empty array, `None` nothing.
    pub fn collection<T: Encode>(&mut self, name: &str, item: &str, entities: Option<&[T]>) {
        let Some(entities) = entities else { return };
        let children = entities.iter().map(|e| self.encode_child(item, e)).collect();
        self.push_array(name, children);
    }

    /// Ids of a reference list, e.g. `tracker_ids`.
    pub fn ids(&mut self, name: &str, item: &str, references: Option<&[IdentifiableName]>) {
        let Some(references) = references else { return };
        let children = references.iter().map(|r| Node::scalar(item, r.id)).collect();
        self.push_array(name, children);
    }

    /// An array of leaf values, e.g. a role's permissions.
    pub fn strings(&mut self, name: &str, item: &str, values: Option<&[String]>) {
        let Some(values) = values else { return };
        let children = values.iter().map(|v| Node::scalar(item, v.as_str())).collect();
        self.push_array(name, children);
    }

    /// An ad-hoc nested element built in place.
    pub fn group(&mut self, name: &str, build: impl FnOnce(&mut NodeWriter)) {
        let mut writer = NodeWriter::new(self.mode);
        build(&mut writer);
        self.nodes.push(writer.into_node(name));
    }

    pub(crate) fn push(&mut self, node: Node) {
        self.nodes.push(node);
    }

    fn push_array(&mut self, name: &str, children: Vec<Node>) {
        self.nodes.push(Node {
            name: name.to_string(),
            children,
            is_array: true,
            ..Node::default()
        });
    }

    fn encode_child<T: Encode>(&self, name: &str, entity: &T) -> Node {
        let mut writer = NodeWriter::new(self.mode);
        entity.write_fields(&mut writer);
        writer.into_node(name)
    }
}
