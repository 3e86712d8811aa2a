//! URL resolution for generic operations and special endpoints.
//!
//! # Design
//! Generic operations go through the registry: a kind's descriptor decides
//! between the flat template `{host}/{segment}.{format}` and the
//! parent-scoped template `{host}/{parent}/{owner}/{segment}.{format}`.
//! Single-resource operations always use `{host}/{segment}/{id}.{format}`.
//! Endpoints with a fixed shape of their own are [`Endpoint`] variants and
//! never fall through the generic rule.
//!
//! Caller-supplied ids, identifiers and wiki titles are percent-encoded as
//! single path segments.

use std::borrow::Cow;

use crate::error::{RedmineError, RedmineResult};
use crate::format::MimeFormat;
use crate::registry::EntityKind;

/// A generic operation on an entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation<'a> {
    Create { owner_id: Option<&'a str> },
    List { owner_id: Option<&'a str> },
    Read { id: &'a str },
    Update { id: &'a str },
    Delete { id: &'a str },
}

/// Endpoints with a bespoke path shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint<'a> {
    CurrentUser,
    Uploads,
    WikiIndex { project_id: &'a str },
    WikiPage { project_id: &'a str, page: &'a str, version: Option<u32> },
    GroupUsers { group_id: i32 },
    GroupUser { group_id: i32, user_id: i32 },
    Watchers { issue_id: i32 },
    Watcher { issue_id: i32, user_id: i32 },
    AttachmentUpdate { issue_id: i32 },
}

/// Builds request URLs for one host and wire format.
#[derive(Debug, Clone, Copy)]
pub struct UrlResolver<'a> {
    host: &'a str,
    format: MimeFormat,
}

impl<'a> UrlResolver<'a> {
    /// `host` must already be normalized (scheme present, no trailing slash).
    pub fn new(host: &'a str, format: MimeFormat) -> Self {
        Self { host, format }
    }

    pub fn resolve(&self, kind: EntityKind, operation: Operation<'_>) -> RedmineResult<String> {
        let descriptor = kind.descriptor()?;
        let (host, segment, format) = (self.host, descriptor.segment, self.format);

        match operation {
            Operation::Create { owner_id } | Operation::List { owner_id } => {
                let needs_parent = match operation {
                    Operation::List { .. } => descriptor.list_requires_parent,
                    _ => descriptor.parent.is_some(),
                };
                match descriptor.parent.filter(|_| needs_parent) {
                    Some(parent) => {
                        let owner = owner_id
                            .map(str::trim)
                            .filter(|id| !id.is_empty())
                            .ok_or(RedmineError::MissingParameter(parent.parameter()))?;
                        let owner = encode(owner);
                        Ok(format!("{host}/{}/{owner}/{segment}.{format}", parent.collection()))
                    }
                    None => Ok(format!("{host}/{segment}.{format}")),
                }
            }
            Operation::Read { id } | Operation::Update { id } | Operation::Delete { id } => {
                let id = encode(id);
                Ok(format!("{host}/{segment}/{id}.{format}"))
            }
        }
    }

    pub fn endpoint(&self, endpoint: Endpoint<'_>) -> String {
        let (host, format) = (self.host, self.format);
        match endpoint {
            Endpoint::CurrentUser => format!("{host}/users/current.{format}"),
            Endpoint::Uploads => format!("{host}/uploads.{format}"),
            Endpoint::WikiIndex { project_id } => {
                format!("{host}/projects/{}/wiki/index.{format}", encode(project_id))
            }
            Endpoint::WikiPage { project_id, page, version } => {
                let (project_id, page) = (encode(project_id), encode(page));
                match version {
                    Some(version) => format!("{host}/projects/{project_id}/wiki/{page}/{version}.{format}"),
                    None => format!("{host}/projects/{project_id}/wiki/{page}.{format}"),
                }
            }
            Endpoint::GroupUsers { group_id } => format!("{host}/groups/{group_id}/users.{format}"),
            Endpoint::GroupUser { group_id, user_id } => {
                format!("{host}/groups/{group_id}/users/{user_id}.{format}")
            }
            Endpoint::Watchers { issue_id } => format!("{host}/issues/{issue_id}/watchers.{format}"),
            Endpoint::Watcher { issue_id, user_id } => {
                format!("{host}/issues/{issue_id}/watchers/{user_id}.{format}")
            }
            Endpoint::AttachmentUpdate { issue_id } => {
                format!("{host}/attachments/issues/{issue_id}.{format}")
            }
        }
    }
}

fn encode(segment: &str) -> Cow<'_, str> {
    urlencoding::encode(segment)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xml() -> UrlResolver<'static> {
        UrlResolver::new("http://x", MimeFormat::Xml)
    }

    #[test]
    fn version_create_is_nested_under_project() {
        let url = xml()
            .resolve(EntityKind::Version, Operation::Create { owner_id: Some("42") })
            .unwrap();
        assert_eq!(url, "http://x/projects/42/versions.xml");
    }

    #[test]
    fn relation_list_is_nested_under_issue() {
        let url = UrlResolver::new("http://x", MimeFormat::Json)
            .resolve(EntityKind::IssueRelation, Operation::List { owner_id: Some("7") })
            .unwrap();
        assert_eq!(url, "http://x/issues/7/relations.json");
    }

    #[test]
    fn parent_scoped_kinds_require_owner() {
        let cases = [
            (EntityKind::Version, "project_id"),
            (EntityKind::IssueCategory, "project_id"),
            (EntityKind::ProjectMembership, "project_id"),
            (EntityKind::IssueRelation, "issue_id"),
        ];
        for (kind, parameter) in cases {
            for owner_id in [None, Some(""), Some("  ")] {
                for op in [Operation::Create { owner_id }, Operation::List { owner_id }] {
                    let err = xml().resolve(kind, op).unwrap_err();
                    assert!(
                        matches!(err, RedmineError::MissingParameter(p) if p == parameter),
                        "{kind} {op:?}: {err}"
                    );
                }
            }
        }
    }

    #[test]
    fn flat_kinds_ignore_owner() {
        let url = xml()
            .resolve(EntityKind::Issue, Operation::Create { owner_id: Some("9") })
            .unwrap();
        assert_eq!(url, "http://x/issues.xml");
        let url = xml().resolve(EntityKind::TimeEntryActivity, Operation::List { owner_id: None }).unwrap();
        assert_eq!(url, "http://x/enumerations/time_entry_activities.xml");
    }

    #[test]
    fn single_resource_operations_append_id() {
        for op in [
            Operation::Read { id: "5" },
            Operation::Update { id: "5" },
            Operation::Delete { id: "5" },
        ] {
            assert_eq!(xml().resolve(EntityKind::Version, op).unwrap(), "http://x/versions/5.xml");
        }
    }

    #[test]
    fn unregistered_kind_is_rejected() {
        let err = xml()
            .resolve(EntityKind::WikiPage, Operation::List { owner_id: None })
            .unwrap_err();
        assert!(matches!(err, RedmineError::UnregisteredKind(EntityKind::WikiPage)));
    }

    #[test]
    fn special_endpoints() {
        let r = xml();
        assert_eq!(r.endpoint(Endpoint::CurrentUser), "http://x/users/current.xml");
        assert_eq!(r.endpoint(Endpoint::Uploads), "http://x/uploads.xml");
        assert_eq!(
            r.endpoint(Endpoint::WikiIndex { project_id: "p" }),
            "http://x/projects/p/wiki/index.xml"
        );
        assert_eq!(
            r.endpoint(Endpoint::WikiPage { project_id: "p", page: "Home", version: None }),
            "http://x/projects/p/wiki/Home.xml"
        );
        assert_eq!(
            r.endpoint(Endpoint::WikiPage { project_id: "p", page: "Home", version: Some(3) }),
            "http://x/projects/p/wiki/Home/3.xml"
        );
        assert_eq!(r.endpoint(Endpoint::GroupUsers { group_id: 2 }), "http://x/groups/2/users.xml");
        assert_eq!(
            r.endpoint(Endpoint::GroupUser { group_id: 2, user_id: 8 }),
            "http://x/groups/2/users/8.xml"
        );
        assert_eq!(r.endpoint(Endpoint::Watchers { issue_id: 4 }), "http://x/issues/4/watchers.xml");
        assert_eq!(
            r.endpoint(Endpoint::Watcher { issue_id: 4, user_id: 8 }),
            "http://x/issues/4/watchers/8.xml"
        );
        assert_eq!(
            r.endpoint(Endpoint::AttachmentUpdate { issue_id: 4 }),
            "http://x/attachments/issues/4.xml"
        );
    }

    #[test]
    fn path_segments_are_percent_encoded() {
        let json = UrlResolver::new("http://x", MimeFormat::Json);
        let url = json.endpoint(Endpoint::WikiPage {
            project_id: "my project",
            page: "Release Notes/2.0",
            version: None,
        });
        assert_eq!(url, "http://x/projects/my%20project/wiki/Release%20Notes%2F2.0.json");
        let url = json
            .resolve(EntityKind::Version, Operation::List { owner_id: Some("a b") })
            .unwrap();
        assert_eq!(url, "http://x/projects/a%20b/versions.json");
        let url = json.resolve(EntityKind::Project, Operation::Read { id: "alpha-1_x" }).unwrap();
        assert_eq!(url, "http://x/projects/alpha-1_x.json");
    }
}
