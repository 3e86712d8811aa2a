use crate::error::RedmineResult;
use crate::registry::EntityKind;
use crate::serialization::{Decode, Encode, Entity, Node, NodeWriter, Scalar};

/// A lightweight `{id, name}` reference to another entity, e.g. a version's
/// project or an issue's tracker.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdentifiableName {
    pub id: i32,
    pub name: Option<String>,
}

impl IdentifiableName {
    pub fn new(id: i32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: Some(name.into()),
        }
    }

    /// A reference carrying only the id, as used in request bodies.
    pub fn from_id(id: i32) -> Self {
        Self { id, name: None }
    }
}

impl Decode for IdentifiableName {
    fn read_field(&mut self, field: &Node) -> RedmineResult<bool> {
        match field.name.as_str() {
            "id" => self.id = field.to_i32()?,
            "name" => self.name = Some(field.to_text()?),
            _ => return Ok(false),
        }
        Ok(true)
    }
}

impl Encode for IdentifiableName {
    fn write_fields(&self, out: &mut NodeWriter) {
        out.attribute("id", self.id);
        out.optional_attribute("name", self.name.as_deref());
    }
}

/// One itemized message from a 422 response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorRecord {
    pub info: String,
}

impl Decode for ErrorRecord {
    fn read_field(&mut self, field: &Node) -> RedmineResult<bool> {
        match field.name.as_str() {
            "message" => self.info = field.to_text()?,
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn read_text(&mut self, text: &Scalar) -> RedmineResult<()> {
        self.info = text.to_string();
        Ok(())
    }
}

impl Encode for ErrorRecord {
    fn write_fields(&self, out: &mut NodeWriter) {
        out.text(self.info.as_str());
    }
}

impl Entity for ErrorRecord {
    const KIND: EntityKind = EntityKind::ErrorRecord;
    const ROOT: &'static str = "error";
    const COLLECTION: &'static str = "errors";
}
