use chrono::{DateTime, Utc};

use crate::error::RedmineResult;
use crate::registry::EntityKind;
use crate::serialization::{Decode, Encode, Entity, Node, NodeWriter};
use crate::types::IdentifiableName;

/// A file attached to an issue, wiki page, document or project.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attachment {
    pub id: i32,
    pub filename: Option<String>,
    pub filesize: Option<i64>,
    pub content_type: Option<String>,
    pub description: Option<String>,
    pub content_url: Option<String>,
    pub author: Option<IdentifiableName>,
    pub created_on: Option<DateTime<Utc>>,
}

impl Decode for Attachment {
    fn read_field(&mut self, field: &Node) -> RedmineResult<bool> {
        match field.name.as_str() {
            "id" => self.id = field.to_i32()?,
            "filename" => self.filename = Some(field.to_text()?),
            "filesize" => self.filesize = Some(field.to_i64()?),
            "content_type" => self.content_type = Some(field.to_text()?),
            "description" => self.description = Some(field.to_text()?),
            "content_url" => self.content_url = Some(field.to_text()?),
            "author" => self.author = Some(field.decode()?),
            "created_on" => self.created_on = Some(field.to_datetime()?),
            _ => return Ok(false),
        }
        Ok(true)
    }
}

impl Encode for Attachment {
    fn write_fields(&self, out: &mut NodeWriter) {
        if !out.is_full() {
            // Only these two can be changed after upload.
            out.optional("filename", self.filename.as_deref());
            out.optional("description", self.description.as_deref());
            return;
        }
        out.value("id", self.id);
        out.optional("filename", self.filename.as_deref());
        out.optional("filesize", self.filesize);
        out.optional("content_type", self.content_type.as_deref());
        out.optional("description", self.description.as_deref());
        out.optional("content_url", self.content_url.as_deref());
        out.nested("author", self.author.as_ref());
        out.datetime("created_on", self.created_on);
    }
}

impl Entity for Attachment {
    const KIND: EntityKind = EntityKind::Attachment;
    const ROOT: &'static str = "attachment";
    const COLLECTION: &'static str = "attachments";
}

/// The token returned by `POST /uploads`, referenced from an issue or wiki
/// page's `uploads` to attach the file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Upload {
    pub id: Option<i32>,
    pub token: Option<String>,
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub description: Option<String>,
}

impl Upload {
    pub fn new(token: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            filename: Some(filename.into()),
            ..Self::default()
        }
    }
}

impl Decode for Upload {
    fn read_field(&mut self, field: &Node) -> RedmineResult<bool> {
        match field.name.as_str() {
            "id" => self.id = Some(field.to_i32()?),
            "token" => self.token = Some(field.to_text()?),
            "filename" => self.filename = Some(field.to_text()?),
            "content_type" => self.content_type = Some(field.to_text()?),
            "description" => self.description = Some(field.to_text()?),
            _ => return Ok(false),
        }
        Ok(true)
    }
}

impl Encode for Upload {
    fn write_fields(&self, out: &mut NodeWriter) {
        if out.is_full() {
            out.optional("id", self.id);
        }
        out.optional("token", self.token.as_deref());
        out.optional("filename", self.filename.as_deref());
        out.optional("content_type", self.content_type.as_deref());
        out.optional("description", self.description.as_deref());
    }
}

impl Entity for Upload {
    const KIND: EntityKind = EntityKind::Upload;
    const ROOT: &'static str = "upload";
    const COLLECTION: &'static str = "uploads";
}
