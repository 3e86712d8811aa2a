//! Object-notation codec.
//!
//! The payload is parsed into a `serde_json::Value` and converted into the
//! shared [`Node`] tree: object members become named children, arrays become
//! array nodes whose items carry the member's name, and scalars keep their
//! runtime type so custom field values can be told apart by shape.

use serde_json::{Map, Number, Value};

use crate::error::{deserialization, serialization, RedmineResult};
use crate::serialization::node::{Node, Scalar};

/// Parses a payload. The returned root is unnamed; for the usual
/// `{"version": {...}}` envelope the entity is its `version` child.
pub(crate) fn parse(payload: &str) -> RedmineResult<Node> {
    let value: Value = serde_json::from_str(payload).map_err(deserialization)?;
    Ok(to_node(String::new(), value))
}

fn to_node(name: String, value: Value) -> Node {
    let mut node = Node::new(name);
    match value {
        Value::Null => {}
        Value::Bool(b) => node.value = Some(Scalar::Boolean(b)),
        Value::Number(n) => {
            node.value = Some(match n.as_i64() {
                Some(i) => Scalar::Integer(i),
                None => Scalar::Decimal(n.as_f64().unwrap_or_default()),
            })
        }
        Value::String(s) => node.value = Some(Scalar::Text(s)),
        Value::Array(items) => {
            node.is_array = true;
            node.children = items
                .into_iter()
                .map(|item| to_node(node.name.clone(), item))
                .collect();
        }
        Value::Object(members) => {
            node.children = members
                .into_iter()
                .map(|(key, member)| to_node(key, member))
                .collect();
        }
    }
    node
}

/// Renders `{"<root name>": <root>}`.
pub(crate) fn render(node: &Node) -> RedmineResult<String> {
    let mut envelope = Map::new();
    envelope.insert(node.name.clone(), to_value(node)?);
    serde_json::to_string(&Value::Object(envelope)).map_err(serialization)
}

fn to_value(node: &Node) -> RedmineResult<Value> {
    if node.is_array {
        return node
            .children
            .iter()
            .map(to_value)
            .collect::<RedmineResult<Vec<_>>>()
            .map(Value::Array);
    }
    if node.children.is_empty() {
        return match &node.value {
            Some(scalar) => scalar_value(scalar),
            None => Ok(Value::Object(Map::new())),
        };
    }
    let mut members = Map::new();
    for child in &node.children {
        members.insert(child.name.clone(), to_value(child)?);
    }
    Ok(Value::Object(members))
}

fn scalar_value(scalar: &Scalar) -> RedmineResult<Value> {
    Ok(match scalar {
        Scalar::Text(s) => Value::String(s.clone()),
        Scalar::Integer(n) => Value::Number((*n).into()),
        Scalar::Boolean(b) => Value::Bool(*b),
        Scalar::Decimal(n) => Number::from_f64(*n)
            .map(Value::Number)
            .ok_or_else(|| serialization(format!("{n} cannot be represented in JSON")))?,
    })
}
