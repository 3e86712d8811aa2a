use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::{deserialization, RedmineError, RedmineResult};
use crate::registry::EntityKind;
use crate::serialization::{Decode, Encode, Entity, Node, NodeWriter, WriteMode};
use crate::types::{Attachment, IdentifiableName, IssueCustomField, Upload};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Issue {
    pub id: i32,
    pub project: Option<IdentifiableName>,
    pub tracker: Option<IdentifiableName>,
    pub status: Option<IdentifiableName>,
    pub priority: Option<IdentifiableName>,
    pub author: Option<IdentifiableName>,
    pub assigned_to: Option<IdentifiableName>,
    pub category: Option<IdentifiableName>,
    pub fixed_version: Option<IdentifiableName>,
    pub parent: Option<IdentifiableName>,
    pub subject: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub done_ratio: Option<i32>,
    pub estimated_hours: Option<f32>,
    pub spent_hours: Option<f32>,
    pub is_private: Option<bool>,
    /// Journal note added by an update.
    pub notes: Option<String>,
    pub private_notes: Option<bool>,
    pub created_on: Option<DateTime<Utc>>,
    pub updated_on: Option<DateTime<Utc>>,
    pub closed_on: Option<DateTime<Utc>>,
    pub custom_fields: Option<Vec<IssueCustomField>>,
    pub journals: Option<Vec<Journal>>,
    pub attachments: Option<Vec<Attachment>>,
    pub relations: Option<Vec<IssueRelation>>,
    pub watchers: Option<Vec<IdentifiableName>>,
    /// Upload tokens to attach on create/update.
    pub uploads: Option<Vec<Upload>>,
}

impl Decode for Issue {
    fn read_field(&mut self, field: &Node) -> RedmineResult<bool> {
        match field.name.as_str() {
            "id" => self.id = field.to_i32()?,
            "project" => self.project = Some(field.decode()?),
            "tracker" => self.tracker = Some(field.decode()?),
            "status" => self.status = Some(field.decode()?),
            "priority" => self.priority = Some(field.decode()?),
            "author" => self.author = Some(field.decode()?),
            "assigned_to" => self.assigned_to = Some(field.decode()?),
            "category" => self.category = Some(field.decode()?),
            "fixed_version" => self.fixed_version = Some(field.decode()?),
            "parent" => self.parent = Some(field.decode()?),
            "subject" => self.subject = Some(field.to_text()?),
            "description" => self.description = Some(field.to_text()?),
            "start_date" => self.start_date = Some(field.to_date()?),
            "due_date" => self.due_date = Some(field.to_date()?),
            "done_ratio" => self.done_ratio = Some(field.to_i32()?),
            "estimated_hours" => self.estimated_hours = Some(field.to_f32()?),
            "spent_hours" => self.spent_hours = Some(field.to_f32()?),
            "is_private" => self.is_private = Some(field.to_bool()?),
            "notes" => self.notes = Some(field.to_text()?),
            "private_notes" => self.private_notes = Some(field.to_bool()?),
            "created_on" => self.created_on = Some(field.to_datetime()?),
            "updated_on" => self.updated_on = Some(field.to_datetime()?),
            "closed_on" => self.closed_on = Some(field.to_datetime()?),
            "custom_fields" => self.custom_fields = Some(field.collection()?),
            "journals" => self.journals = Some(field.collection()?),
            "attachments" => self.attachments = Some(field.collection()?),
            "relations" => self.relations = Some(field.collection()?),
            "watchers" => self.watchers = Some(field.collection()?),
            "uploads" => self.uploads = Some(field.collection()?),
            _ => return Ok(false),
        }
        Ok(true)
    }
}

impl Encode for Issue {
    fn write_fields(&self, out: &mut NodeWriter) {
        let full = out.is_full();
        if full {
            out.value("id", self.id);
        }
        out.reference("project", self.project.as_ref());
        out.reference("tracker", self.tracker.as_ref());
        out.reference("status", self.status.as_ref());
        out.reference("priority", self.priority.as_ref());
        if full {
            out.nested("author", self.author.as_ref());
        }
        out.reference("assigned_to", self.assigned_to.as_ref());
        out.reference("category", self.category.as_ref());
        out.reference("fixed_version", self.fixed_version.as_ref());
        out.reference_as("parent", "parent_issue_id", self.parent.as_ref());
        out.optional("subject", self.subject.as_deref());
        out.optional("description", self.description.as_deref());
        out.date("start_date", self.start_date);
        out.date("due_date", self.due_date);
        out.optional("done_ratio", self.done_ratio);
        out.optional("estimated_hours", self.estimated_hours);
        out.optional("is_private", self.is_private);
        if out.mode() != WriteMode::Create {
            out.optional("notes", self.notes.as_deref());
            out.optional("private_notes", self.private_notes);
        }
        out.collection("custom_fields", "custom_field", self.custom_fields.as_deref());
        match out.mode() {
            WriteMode::Create => out.ids("watcher_user_ids", "watcher_user_id", self.watchers.as_deref()),
            WriteMode::Update => {}
            WriteMode::Full => {
                out.optional("spent_hours", self.spent_hours);
                out.datetime("created_on", self.created_on);
                out.datetime("updated_on", self.updated_on);
                out.datetime("closed_on", self.closed_on);
                out.collection("journals", "journal", self.journals.as_deref());
                out.collection("attachments", "attachment", self.attachments.as_deref());
                out.collection("relations", "relation", self.relations.as_deref());
                out.collection("watchers", "user", self.watchers.as_deref());
            }
        }
        out.collection("uploads", "upload", self.uploads.as_deref());
    }
}

impl Entity for Issue {
    const KIND: EntityKind = EntityKind::Issue;
    const ROOT: &'static str = "issue";
    const COLLECTION: &'static str = "issues";
}

/// One entry of an issue's history (`include=journals`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Journal {
    pub id: i32,
    pub user: Option<IdentifiableName>,
    pub notes: Option<String>,
    pub private_notes: Option<bool>,
    pub created_on: Option<DateTime<Utc>>,
    pub details: Option<Vec<Detail>>,
}

impl Decode for Journal {
    fn read_field(&mut self, field: &Node) -> RedmineResult<bool> {
        match field.name.as_str() {
            "id" => self.id = field.to_i32()?,
            "user" => self.user = Some(field.decode()?),
            "notes" => self.notes = Some(field.to_text()?),
            "private_notes" => self.private_notes = Some(field.to_bool()?),
            "created_on" => self.created_on = Some(field.to_datetime()?),
            "details" => self.details = Some(field.collection()?),
            _ => return Ok(false),
        }
        Ok(true)
    }
}

impl Encode for Journal {
    fn write_fields(&self, out: &mut NodeWriter) {
        out.attribute("id", self.id);
        out.nested("user", self.user.as_ref());
        out.optional("notes", self.notes.as_deref());
        out.optional("private_notes", self.private_notes);
        out.datetime("created_on", self.created_on);
        out.collection("details", "detail", self.details.as_deref());
    }
}

/// A single attribute change within a [`Journal`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Detail {
    pub property: Option<String>,
    pub name: Option<String>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
}

impl Decode for Detail {
    fn read_field(&mut self, field: &Node) -> RedmineResult<bool> {
        match field.name.as_str() {
            "property" => self.property = Some(field.to_text()?),
            "name" => self.name = Some(field.to_text()?),
            "old_value" => self.old_value = Some(field.to_text()?),
            "new_value" => self.new_value = Some(field.to_text()?),
            _ => return Ok(false),
        }
        Ok(true)
    }
}

impl Encode for Detail {
    fn write_fields(&self, out: &mut NodeWriter) {
        out.optional_attribute("property", self.property.as_deref());
        out.optional_attribute("name", self.name.as_deref());
        out.optional("old_value", self.old_value.as_deref());
        out.optional("new_value", self.new_value.as_deref());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueRelationType {
    Relates,
    Duplicates,
    Duplicated,
    Blocks,
    Blocked,
    Precedes,
    Follows,
    CopiedTo,
    CopiedFrom,
}

impl IssueRelationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueRelationType::Relates => "relates",
            IssueRelationType::Duplicates => "duplicates",
            IssueRelationType::Duplicated => "duplicated",
            IssueRelationType::Blocks => "blocks",
            IssueRelationType::Blocked => "blocked",
            IssueRelationType::Precedes => "precedes",
            IssueRelationType::Follows => "follows",
            IssueRelationType::CopiedTo => "copied_to",
            IssueRelationType::CopiedFrom => "copied_from",
        }
    }
}

impl fmt::Display for IssueRelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IssueRelationType {
    type Err = RedmineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "relates" => IssueRelationType::Relates,
            "duplicates" => IssueRelationType::Duplicates,
            "duplicated" => IssueRelationType::Duplicated,
            "blocks" => IssueRelationType::Blocks,
            "blocked" => IssueRelationType::Blocked,
            "precedes" => IssueRelationType::Precedes,
            "follows" => IssueRelationType::Follows,
            "copied_to" => IssueRelationType::CopiedTo,
            "copied_from" => IssueRelationType::CopiedFrom,
            other => return Err(deserialization(format!("unknown relation type `{other}`"))),
        })
    }
}

/// A link between two issues, listed under `/issues/{id}/relations`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IssueRelation {
    pub id: i32,
    pub issue_id: Option<i32>,
    pub issue_to_id: Option<i32>,
    pub relation_type: Option<IssueRelationType>,
    /// Days between the two issues; only meaningful for precedes/follows.
    pub delay: Option<i32>,
}

impl Decode for IssueRelation {
    fn read_field(&mut self, field: &Node) -> RedmineResult<bool> {
        match field.name.as_str() {
            "id" => self.id = field.to_i32()?,
            "issue_id" => self.issue_id = Some(field.to_i32()?),
            "issue_to_id" => self.issue_to_id = Some(field.to_i32()?),
            "relation_type" => self.relation_type = Some(field.to_text()?.parse()?),
            "delay" => self.delay = Some(field.to_i32()?),
            _ => return Ok(false),
        }
        Ok(true)
    }
}

impl Encode for IssueRelation {
    fn write_fields(&self, out: &mut NodeWriter) {
        if out.is_full() {
            out.value("id", self.id);
            out.optional("issue_id", self.issue_id);
        }
        out.optional("issue_to_id", self.issue_to_id);
        out.optional("relation_type", self.relation_type.map(|t| t.as_str()));
        out.optional("delay", self.delay);
    }
}

impl Entity for IssueRelation {
    const KIND: EntityKind = EntityKind::IssueRelation;
    const ROOT: &'static str = "relation";
    const COLLECTION: &'static str = "relations";
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IssueCategory {
    pub id: i32,
    pub project: Option<IdentifiableName>,
    pub name: Option<String>,
    pub assigned_to: Option<IdentifiableName>,
}

impl Decode for IssueCategory {
    fn read_field(&mut self, field: &Node) -> RedmineResult<bool> {
        match field.name.as_str() {
            "id" => self.id = field.to_i32()?,
            "project" => self.project = Some(field.decode()?),
            "name" => self.name = Some(field.to_text()?),
            "assigned_to" => self.assigned_to = Some(field.decode()?),
            _ => return Ok(false),
        }
        Ok(true)
    }
}

impl Encode for IssueCategory {
    fn write_fields(&self, out: &mut NodeWriter) {
        if out.is_full() {
            out.value("id", self.id);
            out.nested("project", self.project.as_ref());
        }
        out.optional("name", self.name.as_deref());
        out.reference("assigned_to", self.assigned_to.as_ref());
    }
}

impl Entity for IssueCategory {
    const KIND: EntityKind = EntityKind::IssueCategory;
    const ROOT: &'static str = "issue_category";
    const COLLECTION: &'static str = "issue_categories";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::MimeFormat;
    use crate::serialization::{decode, encode};

    const ISSUE_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<issue>
  <id>12</id>
  <project id="1" name="Alpha"/>
  <tracker id="1" name="Bug"/>
  <status id="2" name="In Progress"/>
  <author id="3" name="Ann Admin"/>
  <parent id="9"/>
  <subject>Crash on save</subject>
  <description/>
  <start_date>2024-03-01</start_date>
  <due_date/>
  <done_ratio>30</done_ratio>
  <estimated_hours>4.5</estimated_hours>
  <created_on>2024-03-01T10:00:00Z</created_on>
  <journals type="array">
    <journal id="40">
      <user id="3" name="Ann Admin"/>
      <notes>Looking into it</notes>
      <created_on>2024-03-02T08:30:00Z</created_on>
      <details type="array">
        <detail property="attr" name="status_id"><old_value>1</old_value><new_value>2</new_value></detail>
      </details>
    </journal>
  </journals>
  <relations type="array">
    <relation id="7" issue_id="12" issue_to_id="13" relation_type="blocks" delay=""/>
  </relations>
  <watchers type="array"/>
</issue>"#;

    #[test]
    fn decodes_nested_issue() {
        let issue: Issue = decode(ISSUE_XML, MimeFormat::Xml).unwrap();
        assert_eq!(issue.id, 12);
        assert_eq!(issue.project, Some(IdentifiableName::new(1, "Alpha")));
        assert_eq!(issue.parent, Some(IdentifiableName::from_id(9)));
        assert_eq!(issue.description, None);
        assert_eq!(issue.due_date, None);
        assert_eq!(issue.estimated_hours, Some(4.5));
        assert_eq!(issue.watchers, Some(vec![]));

        let journal = &issue.journals.as_ref().unwrap()[0];
        assert_eq!(journal.id, 40);
        let detail = &journal.details.as_ref().unwrap()[0];
        assert_eq!(detail.name.as_deref(), Some("status_id"));
        assert_eq!(detail.new_value.as_deref(), Some("2"));

        let relation = &issue.relations.as_ref().unwrap()[0];
        assert_eq!(relation.relation_type, Some(IssueRelationType::Blocks));
        assert_eq!(relation.issue_to_id, Some(13));
    }

    #[test]
    fn create_body_uses_ids_and_watchers() {
        let issue = Issue {
            project: Some(IdentifiableName::new(1, "Alpha")),
            tracker: Some(IdentifiableName::from_id(2)),
            parent: Some(IdentifiableName::from_id(9)),
            author: Some(IdentifiableName::from_id(3)),
            subject: Some("New".into()),
            notes: Some("ignored on create".into()),
            watchers: Some(vec![IdentifiableName::from_id(5), IdentifiableName::from_id(6)]),
            ..Issue::default()
        };
        let json: serde_json::Value =
            serde_json::from_str(&encode(&issue, WriteMode::Create, MimeFormat::Json).unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"issue": {
                "project_id": 1,
                "tracker_id": 2,
                "parent_issue_id": 9,
                "subject": "New",
                "watcher_user_ids": [5, 6]
            }})
        );
    }

    #[test]
    fn update_body_carries_notes_but_not_watchers() {
        let issue = Issue {
            id: 12,
            notes: Some("Fixed".into()),
            private_notes: Some(true),
            watchers: Some(vec![IdentifiableName::from_id(5)]),
            ..Issue::default()
        };
        let xml = encode(&issue, WriteMode::Update, MimeFormat::Xml).unwrap();
        assert_eq!(xml, "<issue><notes>Fixed</notes><private_notes>true</private_notes></issue>");
    }

    #[test]
    fn unknown_relation_type_is_rejected() {
        let err = decode::<IssueRelation>(r#"{"relation":{"id":1,"relation_type":"sibling"}}"#, MimeFormat::Json)
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Serialization);
    }

    #[test]
    fn category_request_body() {
        let category = IssueCategory {
            id: 4,
            project: Some(IdentifiableName::new(1, "Alpha")),
            name: Some("UI".into()),
            assigned_to: Some(IdentifiableName::new(3, "Ann")),
        };
        let xml = encode(&category, WriteMode::Create, MimeFormat::Xml).unwrap();
        assert_eq!(xml, "<issue_category><name>UI</name><assigned_to_id>3</assigned_to_id></issue_category>");
    }
}
