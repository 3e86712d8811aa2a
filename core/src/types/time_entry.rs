use chrono::{DateTime, NaiveDate, Utc};

use crate::error::RedmineResult;
use crate::registry::EntityKind;
use crate::serialization::{Decode, Encode, Entity, Node, NodeWriter};
use crate::types::{IdentifiableName, IssueCustomField};

/// Hours logged against a project or issue.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeEntry {
    pub id: i32,
    pub project: Option<IdentifiableName>,
    pub issue: Option<IdentifiableName>,
    pub user: Option<IdentifiableName>,
    pub activity: Option<IdentifiableName>,
    pub hours: Option<f32>,
    pub comments: Option<String>,
    pub spent_on: Option<NaiveDate>,
    pub created_on: Option<DateTime<Utc>>,
    pub updated_on: Option<DateTime<Utc>>,
    pub custom_fields: Option<Vec<IssueCustomField>>,
}

impl Decode for TimeEntry {
    fn read_field(&mut self, field: &Node) -> RedmineResult<bool> {
        match field.name.as_str() {
            "id" => self.id = field.to_i32()?,
            "project" => self.project = Some(field.decode()?),
            "issue" => self.issue = Some(field.decode()?),
            "user" => self.user = Some(field.decode()?),
            "activity" => self.activity = Some(field.decode()?),
            "hours" => self.hours = Some(field.to_f32()?),
            "comments" => self.comments = Some(field.to_text()?),
            "spent_on" => self.spent_on = Some(field.to_date()?),
            "created_on" => self.created_on = Some(field.to_datetime()?),
            "updated_on" => self.updated_on = Some(field.to_datetime()?),
            "custom_fields" => self.custom_fields = Some(field.collection()?),
            _ => return Ok(false),
        }
        Ok(true)
    }
}

impl Encode for TimeEntry {
    fn write_fields(&self, out: &mut NodeWriter) {
        if out.is_full() {
            out.value("id", self.id);
        }
        out.reference("project", self.project.as_ref());
        out.reference("issue", self.issue.as_ref());
        out.reference("user", self.user.as_ref());
        out.reference("activity", self.activity.as_ref());
        out.optional("hours", self.hours);
        out.optional("comments", self.comments.as_deref());
        out.date("spent_on", self.spent_on);
        if out.is_full() {
            out.datetime("created_on", self.created_on);
            out.datetime("updated_on", self.updated_on);
        }
        out.collection("custom_fields", "custom_field", self.custom_fields.as_deref());
    }
}

impl Entity for TimeEntry {
    const KIND: EntityKind = EntityKind::TimeEntry;
    const ROOT: &'static str = "time_entry";
    const COLLECTION: &'static str = "time_entries";
}
