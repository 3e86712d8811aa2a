//! Shared fixtures: one fully populated instance of every entity kind.

#![allow(dead_code)]

use std::fmt::Debug;

use chrono::{DateTime, NaiveDate, Utc};
use redmine_core::types::*;
use redmine_core::{decode, encode, Entity, MimeFormat, WriteMode};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn at(rfc3339: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(rfc3339).unwrap().with_timezone(&Utc)
}

pub fn named(id: i32, name: &str) -> IdentifiableName {
    IdentifiableName::new(id, name)
}

/// Encodes in full mode and decodes again, in both formats.
pub fn assert_roundtrip<T: Entity + PartialEq + Debug>(entity: &T) {
    for format in [MimeFormat::Xml, MimeFormat::Json] {
        let wire = encode(entity, WriteMode::Full, format).unwrap();
        let back: T = decode(&wire, format)
            .unwrap_or_else(|e| panic!("{format}: {e}\n{wire}"));
        assert_eq!(&back, entity, "{format}:\n{wire}");
    }
}

pub fn custom_fields() -> Vec<IssueCustomField> {
    vec![
        IssueCustomField {
            name: Some("Build".into()),
            ..IssueCustomField::scalar(1, "1.2.3")
        },
        IssueCustomField {
            name: Some("Platforms".into()),
            ..IssueCustomField::multiple(2, vec!["Linux".into(), "BSD".into()])
        },
        IssueCustomField {
            name: Some("Single pick".into()),
            ..IssueCustomField::multiple(3, vec!["Only".into()])
        },
    ]
}

pub fn attachment() -> Attachment {
    Attachment {
        id: 30,
        filename: Some("trace.log".into()),
        filesize: Some(4096),
        content_type: Some("text/plain".into()),
        description: Some("Stack trace".into()),
        content_url: Some("http://x/attachments/download/30/trace.log".into()),
        author: Some(named(3, "Ann Admin")),
        created_on: Some(at("2024-03-01T10:05:00Z")),
    }
}

pub fn upload() -> Upload {
    Upload {
        id: Some(7),
        token: Some("7.ed32257a2ab0f7526c0d72c32994c58b".into()),
        filename: Some("screenshot.png".into()),
        content_type: Some("image/png".into()),
        description: Some("Before & after".into()),
    }
}

pub fn issue() -> Issue {
    Issue {
        id: 12,
        project: Some(named(1, "Alpha")),
        tracker: Some(named(1, "Bug")),
        status: Some(named(2, "In Progress")),
        priority: Some(named(4, "High")),
        author: Some(named(3, "Ann Admin")),
        assigned_to: Some(named(5, "Bob <Dev>")),
        category: Some(named(6, "UI")),
        fixed_version: Some(named(7, "1.0")),
        parent: Some(IdentifiableName::from_id(9)),
        subject: Some("Crash on save".into()),
        description: Some("Steps: open, edit & save".into()),
        start_date: Some(date(2024, 3, 1)),
        due_date: Some(date(2024, 3, 15)),
        done_ratio: Some(30),
        estimated_hours: Some(4.5),
        spent_hours: Some(1.25),
        is_private: Some(false),
        notes: Some("Looking into it".into()),
        private_notes: Some(true),
        created_on: Some(at("2024-03-01T10:00:00Z")),
        updated_on: Some(at("2024-03-02T08:30:00Z")),
        closed_on: None,
        custom_fields: Some(custom_fields()),
        journals: Some(vec![Journal {
            id: 40,
            user: Some(named(3, "Ann Admin")),
            notes: Some("Status changed".into()),
            private_notes: Some(false),
            created_on: Some(at("2024-03-02T08:30:00Z")),
            details: Some(vec![Detail {
                property: Some("attr".into()),
                name: Some("status_id".into()),
                old_value: Some("1".into()),
                new_value: Some("2".into()),
            }]),
        }]),
        attachments: Some(vec![attachment()]),
        relations: Some(vec![IssueRelation {
            id: 70,
            issue_id: Some(12),
            issue_to_id: Some(13),
            relation_type: Some(IssueRelationType::Precedes),
            delay: Some(2),
        }]),
        watchers: Some(vec![named(5, "Bob <Dev>")]),
        uploads: Some(vec![upload()]),
    }
}

pub fn project() -> Project {
    Project {
        id: 1,
        name: Some("Alpha".into()),
        identifier: Some("alpha".into()),
        description: Some("The first project".into()),
        parent: Some(named(10, "Portfolio")),
        homepage: Some("https://alpha.example.org".into()),
        is_public: Some(true),
        inherit_members: Some(false),
        status: Some(1),
        created_on: Some(at("2023-01-01T00:00:00Z")),
        updated_on: Some(at("2023-06-01T12:00:00Z")),
        trackers: Some(vec![named(1, "Bug"), named(2, "Feature")]),
        issue_categories: Some(vec![named(6, "UI")]),
        enabled_modules: Some(vec![named(100, "issue_tracking"), named(101, "wiki")]),
        custom_fields: Some(custom_fields()),
    }
}

pub fn version() -> Version {
    Version {
        id: 7,
        project: Some(named(1, "Alpha")),
        name: Some("1.0".into()),
        description: Some("First release".into()),
        status: Some(VersionStatus::Locked),
        sharing: Some(VersionSharing::Hierarchy),
        due_date: Some(date(2024, 6, 30)),
        created_on: Some(at("2024-01-01T00:00:00Z")),
        updated_on: Some(at("2024-02-01T00:00:00Z")),
        custom_fields: Some(custom_fields()),
    }
}

fn roles() -> Vec<MembershipRole> {
    vec![
        MembershipRole {
            id: 3,
            name: Some("Developer".into()),
            inherited: None,
        },
        MembershipRole {
            id: 4,
            name: Some("Reporter".into()),
            inherited: Some(true),
        },
    ]
}

pub fn membership() -> Membership {
    Membership {
        id: 8,
        project: Some(named(1, "Alpha")),
        roles: Some(roles()),
    }
}

pub fn project_membership() -> ProjectMembership {
    ProjectMembership {
        id: 8,
        project: Some(named(1, "Alpha")),
        user: Some(named(5, "Bob <Dev>")),
        group: None,
        roles: Some(roles()),
    }
}

pub fn user() -> User {
    User {
        id: 5,
        login: Some("bob".into()),
        firstname: Some("Bob".into()),
        lastname: Some("Builder".into()),
        mail: Some("bob@example.net".into()),
        password: Some("s3cret!".into()),
        auth_source_id: Some(2),
        must_change_passwd: Some(false),
        api_key: Some("0123456789abcdef".into()),
        status: Some(UserStatus::Registered),
        created_on: Some(at("2023-05-01T09:00:00Z")),
        last_login_on: Some(at("2024-03-01T07:59:00Z")),
        custom_fields: Some(custom_fields()),
        memberships: Some(vec![membership()]),
        groups: Some(vec![named(20, "Devs")]),
    }
}

pub fn group() -> Group {
    Group {
        id: 20,
        name: Some("Devs".into()),
        users: Some(vec![named(5, "Bob <Dev>")]),
        custom_fields: Some(custom_fields()),
        memberships: Some(vec![membership()]),
    }
}

pub fn issue_category() -> IssueCategory {
    IssueCategory {
        id: 6,
        project: Some(named(1, "Alpha")),
        name: Some("UI".into()),
        assigned_to: Some(named(5, "Bob <Dev>")),
    }
}

pub fn time_entry() -> TimeEntry {
    TimeEntry {
        id: 90,
        project: Some(named(1, "Alpha")),
        issue: Some(IdentifiableName::from_id(12)),
        user: Some(named(5, "Bob <Dev>")),
        activity: Some(named(9, "Development")),
        hours: Some(2.75),
        comments: Some("Debugging".into()),
        spent_on: Some(date(2024, 3, 2)),
        created_on: Some(at("2024-03-02T17:00:00Z")),
        updated_on: Some(at("2024-03-02T17:00:00Z")),
        custom_fields: Some(custom_fields()),
    }
}

pub fn news() -> News {
    News {
        id: 2,
        project: Some(named(1, "Alpha")),
        author: Some(named(3, "Ann Admin")),
        title: Some("1.0 released".into()),
        summary: Some("Download now".into()),
        description: Some("Changelog: fixes & features".into()),
        created_on: Some(at("2024-07-01T00:00:00Z")),
    }
}

pub fn query() -> Query {
    Query {
        id: 4,
        name: Some("Open bugs".into()),
        is_public: Some(true),
        project_id: Some(1),
    }
}

pub fn issue_status() -> IssueStatus {
    IssueStatus {
        id: 2,
        name: Some("In Progress".into()),
        is_default: Some(false),
        is_closed: Some(false),
    }
}

pub fn tracker() -> Tracker {
    Tracker {
        id: 1,
        name: Some("Bug".into()),
        default_status: Some(named(1, "New")),
        description: Some("Something is broken".into()),
    }
}

pub fn role() -> Role {
    Role {
        id: 3,
        name: Some("Developer".into()),
        assignable: Some(true),
        permissions: Some(vec!["view_issues".into(), "add_issues".into()]),
    }
}

pub fn custom_field() -> CustomField {
    CustomField {
        id: 2,
        name: Some("Platforms".into()),
        customized_type: Some("issue".into()),
        field_format: Some("list".into()),
        regexp: Some("^[A-Z].*$".into()),
        min_length: Some(1),
        max_length: Some(40),
        is_required: Some(false),
        is_filter: Some(true),
        searchable: Some(true),
        multiple: Some(true),
        default_value: Some("Linux".into()),
        visible: Some(true),
        possible_values: Some(vec![
            CustomFieldPossibleValue {
                value: Some("Linux".into()),
                label: Some("Linux".into()),
            },
            CustomFieldPossibleValue {
                value: Some("BSD".into()),
                label: None,
            },
        ]),
        trackers: Some(vec![named(1, "Bug")]),
        roles: Some(vec![]),
    }
}

pub fn time_entry_activity() -> TimeEntryActivity {
    TimeEntryActivity {
        id: 9,
        name: Some("Development".into()),
        is_default: Some(true),
    }
}

pub fn issue_priority() -> IssuePriority {
    IssuePriority {
        id: 4,
        name: Some("High".into()),
        is_default: Some(false),
    }
}

pub fn wiki_page() -> WikiPage {
    WikiPage {
        title: Some("Install".into()),
        parent_title: Some("Guide".into()),
        text: Some("h1. Install\n\nRun the installer".into()),
        version: Some(3),
        author: Some(named(3, "Ann Admin")),
        comments: Some("Added steps".into()),
        created_on: Some(at("2024-01-01T00:00:00Z")),
        updated_on: Some(at("2024-01-02T00:00:00Z")),
        attachments: Some(vec![attachment()]),
        uploads: Some(vec![upload()]),
    }
}

pub fn error_record() -> ErrorRecord {
    ErrorRecord {
        info: "Name can't be blank".into(),
    }
}
