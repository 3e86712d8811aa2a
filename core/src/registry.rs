//! Static mapping from entity kind to endpoint.
//!
//! # Design
//! Every kind the client can send or receive is an [`EntityKind`] variant.
//! Kinds that own an endpoint appear exactly once in [`REGISTRY`]; kinds
//! that are only ever reached through special endpoints (wiki pages,
//! uploads) or only appear inside other payloads (error records) are left
//! out on purpose, so resolving them through the generic templates fails
//! with [`RedmineError::UnregisteredKind`].

use std::fmt;
use std::str::FromStr;

use crate::error::RedmineError;

/// A statically known category of domain object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Issue,
    Project,
    User,
    Group,
    Version,
    IssueCategory,
    ProjectMembership,
    IssueRelation,
    TimeEntry,
    News,
    Query,
    IssueStatus,
    Tracker,
    Role,
    CustomField,
    TimeEntryActivity,
    IssuePriority,
    Attachment,
    WikiPage,
    Upload,
    ErrorRecord,
}

impl EntityKind {
    pub const ALL: [EntityKind; 21] = [
        EntityKind::Issue,
        EntityKind::Project,
        EntityKind::User,
        EntityKind::Group,
        EntityKind::Version,
        EntityKind::IssueCategory,
        EntityKind::ProjectMembership,
        EntityKind::IssueRelation,
        EntityKind::TimeEntry,
        EntityKind::News,
        EntityKind::Query,
        EntityKind::IssueStatus,
        EntityKind::Tracker,
        EntityKind::Role,
        EntityKind::CustomField,
        EntityKind::TimeEntryActivity,
        EntityKind::IssuePriority,
        EntityKind::Attachment,
        EntityKind::WikiPage,
        EntityKind::Upload,
        EntityKind::ErrorRecord,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EntityKind::Issue => "issue",
            EntityKind::Project => "project",
            EntityKind::User => "user",
            EntityKind::Group => "group",
            EntityKind::Version => "version",
            EntityKind::IssueCategory => "issue_category",
            EntityKind::ProjectMembership => "project_membership",
            EntityKind::IssueRelation => "issue_relation",
            EntityKind::TimeEntry => "time_entry",
            EntityKind::News => "news",
            EntityKind::Query => "query",
            EntityKind::IssueStatus => "issue_status",
            EntityKind::Tracker => "tracker",
            EntityKind::Role => "role",
            EntityKind::CustomField => "custom_field",
            EntityKind::TimeEntryActivity => "time_entry_activity",
            EntityKind::IssuePriority => "issue_priority",
            EntityKind::Attachment => "attachment",
            EntityKind::WikiPage => "wiki_page",
            EntityKind::Upload => "upload",
            EntityKind::ErrorRecord => "error",
        }
    }

    /// Registry entry for this kind.
    pub fn descriptor(self) -> Result<&'static EntityDescriptor, RedmineError> {
        REGISTRY
            .iter()
            .find(|d| d.kind == self)
            .ok_or(RedmineError::UnregisteredKind(self))
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EntityKind {
    type Err = RedmineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| RedmineError::InvalidConfig(format!("unknown entity kind `{s}`")))
    }
}

/// The resource a parent-scoped kind is nested under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentScope {
    Project,
    Issue,
}

impl ParentScope {
    /// Path segment of the parent collection.
    pub fn collection(self) -> &'static str {
        match self {
            ParentScope::Project => "projects",
            ParentScope::Issue => "issues",
        }
    }

    /// Name of the parameter that carries the owner id.
    pub fn parameter(self) -> &'static str {
        match self {
            ParentScope::Project => "project_id",
            ParentScope::Issue => "issue_id",
        }
    }
}

/// Endpoint facts for one registered kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityDescriptor {
    pub kind: EntityKind,
    pub segment: &'static str,
    /// Parent whose id creates must be nested under.
    pub parent: Option<ParentScope>,
    /// Whether listing also needs the parent id.
    pub list_requires_parent: bool,
}

impl EntityDescriptor {
    const fn flat(kind: EntityKind, segment: &'static str) -> Self {
        Self {
            kind,
            segment,
            parent: None,
            list_requires_parent: false,
        }
    }

    const fn nested(kind: EntityKind, segment: &'static str, parent: ParentScope) -> Self {
        Self {
            kind,
            segment,
            parent: Some(parent),
            list_requires_parent: true,
        }
    }
}

pub static REGISTRY: &[EntityDescriptor] = &[
    EntityDescriptor::flat(EntityKind::Issue, "issues"),
    EntityDescriptor::flat(EntityKind::Project, "projects"),
    EntityDescriptor::flat(EntityKind::User, "users"),
    EntityDescriptor::flat(EntityKind::Group, "groups"),
    EntityDescriptor::nested(EntityKind::Version, "versions", ParentScope::Project),
    EntityDescriptor::nested(EntityKind::IssueCategory, "issue_categories", ParentScope::Project),
    EntityDescriptor::nested(EntityKind::ProjectMembership, "memberships", ParentScope::Project),
    EntityDescriptor::nested(EntityKind::IssueRelation, "relations", ParentScope::Issue),
    EntityDescriptor::flat(EntityKind::TimeEntry, "time_entries"),
    EntityDescriptor::flat(EntityKind::News, "news"),
    EntityDescriptor::flat(EntityKind::Query, "queries"),
    EntityDescriptor::flat(EntityKind::IssueStatus, "issue_statuses"),
    EntityDescriptor::flat(EntityKind::Tracker, "trackers"),
    EntityDescriptor::flat(EntityKind::Role, "roles"),
    EntityDescriptor::flat(EntityKind::CustomField, "custom_fields"),
    EntityDescriptor::flat(EntityKind::TimeEntryActivity, "enumerations/time_entry_activities"),
    EntityDescriptor::flat(EntityKind::IssuePriority, "enumerations/issue_priorities"),
    EntityDescriptor::flat(EntityKind::Attachment, "attachments"),
];
