//! Read-mostly administrative lists: statuses, trackers, roles and the
//! `/enumerations/*` resources.

use crate::error::RedmineResult;
use crate::registry::EntityKind;
use crate::serialization::{Decode, Encode, Entity, Node, NodeWriter};
use crate::types::IdentifiableName;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IssueStatus {
    pub id: i32,
    pub name: Option<String>,
    pub is_default: Option<bool>,
    pub is_closed: Option<bool>,
}

impl Decode for IssueStatus {
    fn read_field(&mut self, field: &Node) -> RedmineResult<bool> {
        match field.name.as_str() {
            "id" => self.id = field.to_i32()?,
            "name" => self.name = Some(field.to_text()?),
            "is_default" => self.is_default = Some(field.to_bool()?),
            "is_closed" => self.is_closed = Some(field.to_bool()?),
            _ => return Ok(false),
        }
        Ok(true)
    }
}

impl Encode for IssueStatus {
    fn write_fields(&self, out: &mut NodeWriter) {
        if out.is_full() {
            out.value("id", self.id);
        }
        out.optional("name", self.name.as_deref());
        out.optional("is_default", self.is_default);
        out.optional("is_closed", self.is_closed);
    }
}

impl Entity for IssueStatus {
    const KIND: EntityKind = EntityKind::IssueStatus;
    const ROOT: &'static str = "issue_status";
    const COLLECTION: &'static str = "issue_statuses";
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tracker {
    pub id: i32,
    pub name: Option<String>,
    pub default_status: Option<IdentifiableName>,
    pub description: Option<String>,
}

impl Decode for Tracker {
    fn read_field(&mut self, field: &Node) -> RedmineResult<bool> {
        match field.name.as_str() {
            "id" => self.id = field.to_i32()?,
            "name" => self.name = Some(field.to_text()?),
            "default_status" => self.default_status = Some(field.decode()?),
            "description" => self.description = Some(field.to_text()?),
            _ => return Ok(false),
        }
        Ok(true)
    }
}

impl Encode for Tracker {
    fn write_fields(&self, out: &mut NodeWriter) {
        if out.is_full() {
            out.value("id", self.id);
        }
        out.optional("name", self.name.as_deref());
        out.reference("default_status", self.default_status.as_ref());
        out.optional("description", self.description.as_deref());
    }
}

impl Entity for Tracker {
    const KIND: EntityKind = EntityKind::Tracker;
    const ROOT: &'static str = "tracker";
    const COLLECTION: &'static str = "trackers";
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Role {
    pub id: i32,
    pub name: Option<String>,
    pub assignable: Option<bool>,
    pub permissions: Option<Vec<String>>,
}

impl Decode for Role {
    fn read_field(&mut self, field: &Node) -> RedmineResult<bool> {
        match field.name.as_str() {
            "id" => self.id = field.to_i32()?,
            "name" => self.name = Some(field.to_text()?),
            "assignable" => self.assignable = Some(field.to_bool()?),
            "permissions" => self.permissions = Some(field.to_strings()?),
            _ => return Ok(false),
        }
        Ok(true)
    }
}

impl Encode for Role {
    fn write_fields(&self, out: &mut NodeWriter) {
        if out.is_full() {
            out.value("id", self.id);
        }
        out.optional("name", self.name.as_deref());
        out.optional("assignable", self.assignable);
        out.strings("permissions", "permission", self.permissions.as_deref());
    }
}

impl Entity for Role {
    const KIND: EntityKind = EntityKind::Role;
    const ROOT: &'static str = "role";
    const COLLECTION: &'static str = "roles";
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeEntryActivity {
    pub id: i32,
    pub name: Option<String>,
    pub is_default: Option<bool>,
}

impl Decode for TimeEntryActivity {
    fn read_field(&mut self, field: &Node) -> RedmineResult<bool> {
        match field.name.as_str() {
            "id" => self.id = field.to_i32()?,
            "name" => self.name = Some(field.to_text()?),
            "is_default" => self.is_default = Some(field.to_bool()?),
            _ => return Ok(false),
        }
        Ok(true)
    }
}

impl Encode for TimeEntryActivity {
    fn write_fields(&self, out: &mut NodeWriter) {
        if out.is_full() {
            out.value("id", self.id);
        }
        out.optional("name", self.name.as_deref());
        out.optional("is_default", self.is_default);
    }
}

impl Entity for TimeEntryActivity {
    const KIND: EntityKind = EntityKind::TimeEntryActivity;
    const ROOT: &'static str = "time_entry_activity";
    const COLLECTION: &'static str = "time_entry_activities";
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IssuePriority {
    pub id: i32,
    pub name: Option<String>,
    pub is_default: Option<bool>,
}

impl Decode for IssuePriority {
    fn read_field(&mut self, field: &Node) -> RedmineResult<bool> {
        match field.name.as_str() {
            "id" => self.id = field.to_i32()?,
            "name" => self.name = Some(field.to_text()?),
            "is_default" => self.is_default = Some(field.to_bool()?),
            _ => return Ok(false),
        }
        Ok(true)
    }
}

impl Encode for IssuePriority {
    fn write_fields(&self, out: &mut NodeWriter) {
        if out.is_full() {
            out.value("id", self.id);
        }
        out.optional("name", self.name.as_deref());
        out.optional("is_default", self.is_default);
    }
}

impl Entity for IssuePriority {
    const KIND: EntityKind = EntityKind::IssuePriority;
    const ROOT: &'static str = "issue_priority";
    const COLLECTION: &'static str = "issue_priorities";
}
