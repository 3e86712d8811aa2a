//! The Redmine entity model.
//!
//! Plain data. Every field the server may omit is an `Option`; collections
//! distinguish absent (`None`) from present-but-empty (`Some(vec![])`).

mod attachment;
mod common;
mod custom_field;
mod enumerations;
mod issue;
mod project;
mod time_entry;
mod user;
mod wiki;

pub use attachment::{Attachment, Upload};
pub use common::{ErrorRecord, IdentifiableName};
pub use custom_field::{CustomField, CustomFieldPossibleValue, CustomFieldValue, IssueCustomField};
pub use enumerations::{IssuePriority, IssueStatus, Role, TimeEntryActivity, Tracker};
pub use issue::{Detail, Issue, IssueCategory, IssueRelation, IssueRelationType, Journal};
pub use project::{
    MembershipRole, News, Project, ProjectMembership, Query, Version, VersionSharing, VersionStatus,
};
pub use time_entry::TimeEntry;
pub use user::{Group, Membership, User, UserStatus};
pub use wiki::WikiPage;
