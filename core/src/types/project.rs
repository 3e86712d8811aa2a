use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::{deserialization, RedmineError, RedmineResult};
use crate::registry::EntityKind;
use crate::serialization::{Decode, Encode, Entity, Node, NodeWriter, WriteMode};
use crate::types::{IdentifiableName, IssueCustomField};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Project {
    pub id: i32,
    pub name: Option<String>,
    /// URL slug; can only be set on create.
    pub identifier: Option<String>,
    pub description: Option<String>,
    pub parent: Option<IdentifiableName>,
    pub homepage: Option<String>,
    pub is_public: Option<bool>,
    pub inherit_members: Option<bool>,
    pub status: Option<i32>,
    pub created_on: Option<DateTime<Utc>>,
    pub updated_on: Option<DateTime<Utc>>,
    pub trackers: Option<Vec<IdentifiableName>>,
    pub issue_categories: Option<Vec<IdentifiableName>>,
    pub enabled_modules: Option<Vec<IdentifiableName>>,
    pub custom_fields: Option<Vec<IssueCustomField>>,
}

impl Decode for Project {
    fn read_field(&mut self, field: &Node) -> RedmineResult<bool> {
        match field.name.as_str() {
            "id" => self.id = field.to_i32()?,
            "name" => self.name = Some(field.to_text()?),
            "identifier" => self.identifier = Some(field.to_text()?),
            "description" => self.description = Some(field.to_text()?),
            "parent" => self.parent = Some(field.decode()?),
            "homepage" => self.homepage = Some(field.to_text()?),
            "is_public" => self.is_public = Some(field.to_bool()?),
            "inherit_members" => self.inherit_members = Some(field.to_bool()?),
            "status" => self.status = Some(field.to_i32()?),
            "created_on" => self.created_on = Some(field.to_datetime()?),
            "updated_on" => self.updated_on = Some(field.to_datetime()?),
            "trackers" => self.trackers = Some(field.collection()?),
            "issue_categories" => self.issue_categories = Some(field.collection()?),
            "enabled_modules" => self.enabled_modules = Some(field.collection()?),
            "custom_fields" => self.custom_fields = Some(field.collection()?),
            _ => return Ok(false),
        }
        Ok(true)
    }
}

impl Encode for Project {
    fn write_fields(&self, out: &mut NodeWriter) {
        let mode = out.mode();
        if mode == WriteMode::Full {
            out.value("id", self.id);
        }
        out.optional("name", self.name.as_deref());
        if mode != WriteMode::Update {
            out.optional("identifier", self.identifier.as_deref());
        }
        out.optional("description", self.description.as_deref());
        out.reference("parent", self.parent.as_ref());
        out.optional("homepage", self.homepage.as_deref());
        out.optional("is_public", self.is_public);
        out.optional("inherit_members", self.inherit_members);
        if mode == WriteMode::Full {
            out.optional("status", self.status);
            out.datetime("created_on", self.created_on);
            out.datetime("updated_on", self.updated_on);
            out.collection("trackers", "tracker", self.trackers.as_deref());
            out.collection("issue_categories", "issue_category", self.issue_categories.as_deref());
            out.collection("enabled_modules", "enabled_module", self.enabled_modules.as_deref());
        } else {
            out.ids("tracker_ids", "tracker_id", self.trackers.as_deref());
            let module_names: Option<Vec<String>> = self
                .enabled_modules
                .as_ref()
                .map(|modules| modules.iter().filter_map(|m| m.name.clone()).collect());
            out.strings("enabled_module_names", "enabled_module_name", module_names.as_deref());
        }
        out.collection("custom_fields", "custom_field", self.custom_fields.as_deref());
    }
}

impl Entity for Project {
    const KIND: EntityKind = EntityKind::Project;
    const ROOT: &'static str = "project";
    const COLLECTION: &'static str = "projects";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionStatus {
    Open,
    Locked,
    Closed,
}

impl VersionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VersionStatus::Open => "open",
            VersionStatus::Locked => "locked",
            VersionStatus::Closed => "closed",
        }
    }
}

impl fmt::Display for VersionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VersionStatus {
    type Err = RedmineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(VersionStatus::Open),
            "locked" => Ok(VersionStatus::Locked),
            "closed" => Ok(VersionStatus::Closed),
            other => Err(deserialization(format!("unknown version status `{other}`"))),
        }
    }
}

/// Which projects may target a version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionSharing {
    None,
    Descendants,
    Hierarchy,
    Tree,
    System,
}

impl VersionSharing {
    pub fn as_str(&self) -> &'static str {
        match self {
            VersionSharing::None => "none",
            VersionSharing::Descendants => "descendants",
            VersionSharing::Hierarchy => "hierarchy",
            VersionSharing::Tree => "tree",
            VersionSharing::System => "system",
        }
    }
}

impl fmt::Display for VersionSharing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VersionSharing {
    type Err = RedmineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(VersionSharing::None),
            "descendants" => Ok(VersionSharing::Descendants),
            "hierarchy" => Ok(VersionSharing::Hierarchy),
            "tree" => Ok(VersionSharing::Tree),
            "system" => Ok(VersionSharing::System),
            other => Err(deserialization(format!("unknown version sharing `{other}`"))),
        }
    }
}

/// A project milestone, nested under `/projects/{id}/versions`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Version {
    pub id: i32,
    pub project: Option<IdentifiableName>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<VersionStatus>,
    pub sharing: Option<VersionSharing>,
    pub due_date: Option<NaiveDate>,
    pub created_on: Option<DateTime<Utc>>,
    pub updated_on: Option<DateTime<Utc>>,
    pub custom_fields: Option<Vec<IssueCustomField>>,
}

impl Decode for Version {
    fn read_field(&mut self, field: &Node) -> RedmineResult<bool> {
        match field.name.as_str() {
            "id" => self.id = field.to_i32()?,
            "project" => self.project = Some(field.decode()?),
            "name" => self.name = Some(field.to_text()?),
            "description" => self.description = Some(field.to_text()?),
            "status" => self.status = Some(field.to_text()?.parse()?),
            "sharing" => self.sharing = Some(field.to_text()?.parse()?),
            "due_date" => self.due_date = Some(field.to_date()?),
            "created_on" => self.created_on = Some(field.to_datetime()?),
            "updated_on" => self.updated_on = Some(field.to_datetime()?),
            "custom_fields" => self.custom_fields = Some(field.collection()?),
            _ => return Ok(false),
        }
        Ok(true)
    }
}

impl Encode for Version {
    fn write_fields(&self, out: &mut NodeWriter) {
        if out.is_full() {
            out.value("id", self.id);
            out.nested("project", self.project.as_ref());
        }
        out.optional("name", self.name.as_deref());
        out.optional("description", self.description.as_deref());
        out.optional("status", self.status.map(|s| s.as_str()));
        out.optional("sharing", self.sharing.map(|s| s.as_str()));
        out.date("due_date", self.due_date);
        if out.is_full() {
            out.datetime("created_on", self.created_on);
            out.datetime("updated_on", self.updated_on);
        }
        out.collection("custom_fields", "custom_field", self.custom_fields.as_deref());
    }
}

impl Entity for Version {
    const KIND: EntityKind = EntityKind::Version;
    const ROOT: &'static str = "version";
    const COLLECTION: &'static str = "versions";
}

/// A role held through a membership; `inherited` when it comes from a group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MembershipRole {
    pub id: i32,
    pub name: Option<String>,
    pub inherited: Option<bool>,
}

impl MembershipRole {
    pub fn from_id(id: i32) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }
}

impl Decode for MembershipRole {
    fn read_field(&mut self, field: &Node) -> RedmineResult<bool> {
        match field.name.as_str() {
            "id" => self.id = field.to_i32()?,
            "name" => self.name = Some(field.to_text()?),
            "inherited" => self.inherited = Some(field.to_bool()?),
            _ => return Ok(false),
        }
        Ok(true)
    }
}

impl Encode for MembershipRole {
    fn write_fields(&self, out: &mut NodeWriter) {
        out.attribute("id", self.id);
        out.optional_attribute("name", self.name.as_deref());
        out.optional_attribute("inherited", self.inherited);
    }
}

pub(crate) fn role_ids(roles: Option<&[MembershipRole]>) -> Option<Vec<IdentifiableName>> {
    roles.map(|roles| roles.iter().map(|r| IdentifiableName::from_id(r.id)).collect())
}

/// A user's or group's membership of a project (`/projects/{id}/memberships`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectMembership {
    pub id: i32,
    pub project: Option<IdentifiableName>,
    pub user: Option<IdentifiableName>,
    pub group: Option<IdentifiableName>,
    pub roles: Option<Vec<MembershipRole>>,
}

impl Decode for ProjectMembership {
    fn read_field(&mut self, field: &Node) -> RedmineResult<bool> {
        match field.name.as_str() {
            "id" => self.id = field.to_i32()?,
            "project" => self.project = Some(field.decode()?),
            "user" => self.user = Some(field.decode()?),
            "group" => self.group = Some(field.decode()?),
            "roles" => self.roles = Some(field.collection()?),
            _ => return Ok(false),
        }
        Ok(true)
    }
}

impl Encode for ProjectMembership {
    fn write_fields(&self, out: &mut NodeWriter) {
        match out.mode() {
            WriteMode::Full => {
                out.value("id", self.id);
                out.nested("project", self.project.as_ref());
                out.nested("user", self.user.as_ref());
                out.nested("group", self.group.as_ref());
                out.collection("roles", "role", self.roles.as_deref());
            }
            mode => {
                // A group membership is created through the same `user_id` key.
                if mode == WriteMode::Create {
                    let principal = self.user.as_ref().or(self.group.as_ref());
                    out.optional("user_id", principal.map(|p| p.id));
                }
                out.ids("role_ids", "role_id", role_ids(self.roles.as_deref()).as_deref());
            }
        }
    }
}

impl Entity for ProjectMembership {
    const KIND: EntityKind = EntityKind::ProjectMembership;
    const ROOT: &'static str = "membership";
    const COLLECTION: &'static str = "memberships";
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct News {
    pub id: i32,
    pub project: Option<IdentifiableName>,
    pub author: Option<IdentifiableName>,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub created_on: Option<DateTime<Utc>>,
}

impl Decode for News {
    fn read_field(&mut self, field: &Node) -> RedmineResult<bool> {
        match field.name.as_str() {
            "id" => self.id = field.to_i32()?,
            "project" => self.project = Some(field.decode()?),
            "author" => self.author = Some(field.decode()?),
            "title" => self.title = Some(field.to_text()?),
            "summary" => self.summary = Some(field.to_text()?),
            "description" => self.description = Some(field.to_text()?),
            "created_on" => self.created_on = Some(field.to_datetime()?),
            _ => return Ok(false),
        }
        Ok(true)
    }
}

impl Encode for News {
    fn write_fields(&self, out: &mut NodeWriter) {
        if out.is_full() {
            out.value("id", self.id);
            out.nested("project", self.project.as_ref());
            out.nested("author", self.author.as_ref());
        }
        out.optional("title", self.title.as_deref());
        out.optional("summary", self.summary.as_deref());
        out.optional("description", self.description.as_deref());
        if out.is_full() {
            out.datetime("created_on", self.created_on);
        }
    }
}

impl Entity for News {
    const KIND: EntityKind = EntityKind::News;
    const ROOT: &'static str = "news";
    const COLLECTION: &'static str = "news";
}

/// A saved issue query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub id: i32,
    pub name: Option<String>,
    pub is_public: Option<bool>,
    pub project_id: Option<i32>,
}

impl Decode for Query {
    fn read_field(&mut self, field: &Node) -> RedmineResult<bool> {
        match field.name.as_str() {
            "id" => self.id = field.to_i32()?,
            "name" => self.name = Some(field.to_text()?),
            "is_public" => self.is_public = Some(field.to_bool()?),
            "project_id" => self.project_id = Some(field.to_i32()?),
            _ => return Ok(false),
        }
        Ok(true)
    }
}

impl Encode for Query {
    fn write_fields(&self, out: &mut NodeWriter) {
        if out.is_full() {
            out.value("id", self.id);
        }
        out.optional("name", self.name.as_deref());
        out.optional("is_public", self.is_public);
        out.optional("project_id", self.project_id);
    }
}

impl Entity for Query {
    const KIND: EntityKind = EntityKind::Query;
    const ROOT: &'static str = "query";
    const COLLECTION: &'static str = "queries";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::MimeFormat;
    use crate::serialization::{decode, decode_list, encode};

    #[test]
    fn version_decodes_from_json() {
        let payload = r#"{"version":{"id":3,"project":{"id":1,"name":"Alpha"},"name":"1.0",
            "status":"locked","sharing":"system","due_date":"2024-06-30","description":null,
            "created_on":"2024-01-01T00:00:00Z"}}"#;
        let version: Version = decode(payload, MimeFormat::Json).unwrap();
        assert_eq!(version.status, Some(VersionStatus::Locked));
        assert_eq!(version.sharing, Some(VersionSharing::System));
        assert_eq!(version.due_date, NaiveDate::from_ymd_opt(2024, 6, 30));
        assert_eq!(version.description, None);
    }

    #[test]
    fn version_create_body_omits_server_fields() {
        let version = Version {
            id: 3,
            project: Some(IdentifiableName::new(1, "Alpha")),
            name: Some("1.0".into()),
            status: Some(VersionStatus::Open),
            ..Version::default()
        };
        let xml = encode(&version, WriteMode::Create, MimeFormat::Xml).unwrap();
        assert_eq!(xml, "<version><name>1.0</name><status>open</status></version>");
    }

    #[test]
    fn project_identifier_only_on_create() {
        let project = Project {
            name: Some("Alpha".into()),
            identifier: Some("alpha".into()),
            trackers: Some(vec![IdentifiableName::new(1, "Bug")]),
            enabled_modules: Some(vec![IdentifiableName::new(4, "wiki")]),
            ..Project::default()
        };
        let create: serde_json::Value =
            serde_json::from_str(&encode(&project, WriteMode::Create, MimeFormat::Json).unwrap()).unwrap();
        assert_eq!(
            create,
            serde_json::json!({"project": {
                "name": "Alpha",
                "identifier": "alpha",
                "tracker_ids": [1],
                "enabled_module_names": ["wiki"]
            }})
        );
        let update = encode(&project, WriteMode::Update, MimeFormat::Xml).unwrap();
        assert!(!update.contains("identifier"), "{update}");
    }

    #[test]
    fn membership_roles_keep_inherited_flag() {
        let payload = r#"<memberships type="array" total_count="1" offset="0" limit="25">
          <membership>
            <id>8</id>
            <project id="1" name="Alpha"/>
            <group id="20" name="Devs"/>
            <roles type="array"><role id="3" name="Developer" inherited="true"/></roles>
          </membership>
        </memberships>"#;
        let page = decode_list::<ProjectMembership>(payload, MimeFormat::Xml).unwrap();
        let membership = &page.items[0];
        assert_eq!(membership.group, Some(IdentifiableName::new(20, "Devs")));
        assert_eq!(membership.user, None);
        assert_eq!(membership.roles.as_ref().unwrap()[0].inherited, Some(true));
    }

    #[test]
    fn membership_request_bodies() {
        let membership = ProjectMembership {
            user: Some(IdentifiableName::from_id(5)),
            roles: Some(vec![MembershipRole::from_id(3), MembershipRole::from_id(4)]),
            ..ProjectMembership::default()
        };
        let create = encode(&membership, WriteMode::Create, MimeFormat::Xml).unwrap();
        assert_eq!(
            create,
            r#"<membership><user_id>5</user_id><role_ids type="array"><role_id>3</role_id><role_id>4</role_id></role_ids></membership>"#
        );
        let update: serde_json::Value =
            serde_json::from_str(&encode(&membership, WriteMode::Update, MimeFormat::Json).unwrap()).unwrap();
        assert_eq!(update, serde_json::json!({"membership": {"role_ids": [3, 4]}}));
    }
}
