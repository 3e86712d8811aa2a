use chrono::{DateTime, Utc};

use crate::error::RedmineResult;
use crate::registry::EntityKind;
use crate::serialization::{Decode, Encode, Entity, Node, NodeWriter};
use crate::types::{Attachment, IdentifiableName, Upload};

/// A project wiki page, addressed by title rather than id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WikiPage {
    pub title: Option<String>,
    pub parent_title: Option<String>,
    pub text: Option<String>,
    pub version: Option<u32>,
    pub author: Option<IdentifiableName>,
    pub comments: Option<String>,
    pub created_on: Option<DateTime<Utc>>,
    pub updated_on: Option<DateTime<Utc>>,
    pub attachments: Option<Vec<Attachment>>,
    pub uploads: Option<Vec<Upload>>,
}

impl Decode for WikiPage {
    fn read_field(&mut self, field: &Node) -> RedmineResult<bool> {
        match field.name.as_str() {
            "title" => self.title = Some(field.to_text()?),
            // `<parent title="..."/>` on reads, `parent_title` in request bodies.
            "parent" => self.parent_title = field.child("title").map(Node::to_text).transpose()?,
            "parent_title" => self.parent_title = Some(field.to_text()?),
            "text" => self.text = Some(field.to_text()?),
            "version" => self.version = Some(field.to_u32()?),
            "author" => self.author = Some(field.decode()?),
            "comments" => self.comments = Some(field.to_text()?),
            "created_on" => self.created_on = Some(field.to_datetime()?),
            "updated_on" => self.updated_on = Some(field.to_datetime()?),
            "attachments" => self.attachments = Some(field.collection()?),
            "uploads" => self.uploads = Some(field.collection()?),
            _ => return Ok(false),
        }
        Ok(true)
    }
}

impl Encode for WikiPage {
    fn write_fields(&self, out: &mut NodeWriter) {
        let full = out.is_full();
        if full {
            out.optional("title", self.title.as_deref());
            if let Some(parent) = self.parent_title.as_deref() {
                out.group("parent", |p| p.attribute("title", parent));
            }
        } else {
            out.optional("parent_title", self.parent_title.as_deref());
        }
        out.optional("text", self.text.as_deref());
        out.optional("version", self.version);
        out.optional("comments", self.comments.as_deref());
        if full {
            out.nested("author", self.author.as_ref());
            out.datetime("created_on", self.created_on);
            out.datetime("updated_on", self.updated_on);
            out.collection("attachments", "attachment", self.attachments.as_deref());
        }
        out.collection("uploads", "upload", self.uploads.as_deref());
    }
}

impl Entity for WikiPage {
    const KIND: EntityKind = EntityKind::WikiPage;
    const ROOT: &'static str = "wiki_page";
    const COLLECTION: &'static str = "wiki_pages";
}
