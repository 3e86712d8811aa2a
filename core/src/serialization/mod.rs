//! Bidirectional entity serialization for both wire formats.
//!
//! # Design
//! Each codec only translates between its wire format and the shared
//! [`Node`] tree. Entity kinds implement [`Decode`] (a field-name dispatch
//! table) and [`Encode`] (which fields to emit for a [`WriteMode`]) once,
//! and both codecs reuse them, so XML and JSON cannot drift apart per kind.

pub mod json;
pub mod node;
pub mod xml;

pub use node::{Node, NodeWriter, Scalar};

use crate::error::{deserialization, RedmineResult};
use crate::format::MimeFormat;
use crate::registry::EntityKind;

/// Which representation of an entity to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Request body for a create.
    Create,
    /// Request body for an update.
    Update,
    /// The complete representation as the server sends it, read-only
    /// fields included. `decode(encode(e, Full)) == e`.
    Full,
}

/// Field dispatch for one kind.
pub trait Decode: Default {
    /// Applies one field. Returns `Ok(false)` for names this kind does not
    /// know; those are skipped so new server fields do not break decoding.
    fn read_field(&mut self, field: &Node) -> RedmineResult<bool>;

    /// Applies a node's own text content (`<error>text</error>`).
    fn read_text(&mut self, _text: &Scalar) -> RedmineResult<()> {
        Ok(())
    }

    /// Runs once all fields have been read.
    fn finish(&mut self) {}
}

/// Field emission for one kind.
pub trait Encode {
    fn write_fields(&self, out: &mut NodeWriter);
}

/// A kind that travels as a top-level payload.
pub trait Entity: Decode + Encode {
    const KIND: EntityKind;
    /// Element/member name of a single instance.
    const ROOT: &'static str;
    /// Element/member name of a list of instances.
    const COLLECTION: &'static str;
}

/// One page of a list response.
#[derive(Debug, Clone, PartialEq)]
pub struct PagedList<T> {
    pub items: Vec<T>,
    pub total_count: Option<u32>,
    pub offset: Option<u32>,
    pub limit: Option<u32>,
}

impl<T> Default for PagedList<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total_count: None,
            offset: None,
            limit: None,
        }
    }
}

pub(crate) fn read_entity<T: Decode>(node: &Node) -> RedmineResult<T> {
    let mut entity = T::default();
    if let Some(text) = &node.value {
        entity.read_text(text)?;
    }
    for field in &node.children {
        if field.is_empty() {
            continue;
        }
        if !entity.read_field(field)? {
            tracing::trace!(
                entity = std::any::type_name::<T>(),
                field = %field.name,
                "skipping unknown field"
            );
        }
    }
    entity.finish();
    Ok(entity)
}

fn parse(payload: &str, format: MimeFormat) -> RedmineResult<Node> {
    match format {
        MimeFormat::Xml => xml::parse(payload),
        MimeFormat::Json => json::parse(payload),
    }
}

/// Renders a finished tree, root included.
pub fn render(node: &Node, format: MimeFormat) -> RedmineResult<String> {
    match format {
        MimeFormat::Xml => xml::render(node),
        MimeFormat::Json => json::render(node),
    }
}

/// The node called `name`: the document root (XML) or a member of the
/// top-level object (JSON). Any other shape is an error.
fn locate<'a>(document: &'a Node, name: &str, format: MimeFormat) -> RedmineResult<&'a Node> {
    let found = match format {
        MimeFormat::Xml => Some(document).filter(|root| root.name == name),
        MimeFormat::Json => Some(document)
            .filter(|root| !root.is_array)
            .and_then(|root| root.child(name)),
    };
    found.ok_or_else(|| deserialization(format!("expected `{name}` in {format} payload")))
}

pub fn encode<T: Entity>(entity: &T, mode: WriteMode, format: MimeFormat) -> RedmineResult<String> {
    render(&to_node(entity, T::ROOT, mode), format)
}

/// Runs `Encode` into a node without rendering it.
pub fn to_node<T: Encode>(entity: &T, name: &str, mode: WriteMode) -> Node {
    let mut writer = NodeWriter::new(mode);
    entity.write_fields(&mut writer);
    writer.into_node(name)
}

pub fn decode<T: Entity>(payload: &str, format: MimeFormat) -> RedmineResult<T> {
    let document = parse(payload, format)?;
    read_entity(locate(&document, T::ROOT, format)?)
}

pub fn decode_list<T: Entity>(payload: &str, format: MimeFormat) -> RedmineResult<PagedList<T>> {
    let document = parse(payload, format)?;
    // Validation errors may also arrive as a bare `[{"message": ...}]`.
    let bare_errors =
        format == MimeFormat::Json && T::KIND == EntityKind::ErrorRecord && document.is_array;
    let list = if bare_errors {
        &document
    } else {
        locate(&document, T::COLLECTION, format)?
    };
    let paging = |name: &str| -> RedmineResult<Option<u32>> {
        list.child(name)
            .or_else(|| document.child(name))
            .filter(|n| !n.is_empty())
            .map(Node::to_u32)
            .transpose()
    };
    Ok(PagedList {
        items: list.collection()?,
        total_count: paging("total_count")?,
        offset: paging("offset")?,
        limit: paging("limit")?,
    })
}
