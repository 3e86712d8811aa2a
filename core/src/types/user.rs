use chrono::{DateTime, Utc};

use crate::error::{deserialization, RedmineResult};
use crate::registry::EntityKind;
use crate::serialization::{Decode, Encode, Entity, Node, NodeWriter};
use crate::types::{IdentifiableName, IssueCustomField, MembershipRole};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserStatus {
    Active,
    Registered,
    Locked,
}

impl UserStatus {
    pub fn code(&self) -> i32 {
        match self {
            UserStatus::Active => 1,
            UserStatus::Registered => 2,
            UserStatus::Locked => 3,
        }
    }
}

impl TryFrom<i32> for UserStatus {
    type Error = crate::error::RedmineError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(UserStatus::Active),
            2 => Ok(UserStatus::Registered),
            3 => Ok(UserStatus::Locked),
            other => Err(deserialization(format!("unknown user status {other}"))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct User {
    pub id: i32,
    pub login: Option<String>,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub mail: Option<String>,
    /// Write-only; never returned by the server.
    pub password: Option<String>,
    pub auth_source_id: Option<i32>,
    pub must_change_passwd: Option<bool>,
    pub api_key: Option<String>,
    pub status: Option<UserStatus>,
    pub created_on: Option<DateTime<Utc>>,
    pub last_login_on: Option<DateTime<Utc>>,
    pub custom_fields: Option<Vec<IssueCustomField>>,
    pub memberships: Option<Vec<Membership>>,
    pub groups: Option<Vec<IdentifiableName>>,
}

impl Decode for User {
    fn read_field(&mut self, field: &Node) -> RedmineResult<bool> {
        match field.name.as_str() {
            "id" => self.id = field.to_i32()?,
            "login" => self.login = Some(field.to_text()?),
            "firstname" => self.firstname = Some(field.to_text()?),
            "lastname" => self.lastname = Some(field.to_text()?),
            "mail" => self.mail = Some(field.to_text()?),
            "password" => self.password = Some(field.to_text()?),
            "auth_source_id" => self.auth_source_id = Some(field.to_i32()?),
            "must_change_passwd" => self.must_change_passwd = Some(field.to_bool()?),
            "api_key" => self.api_key = Some(field.to_text()?),
            "status" => self.status = Some(UserStatus::try_from(field.to_i32()?)?),
            "created_on" => self.created_on = Some(field.to_datetime()?),
            "last_login_on" => self.last_login_on = Some(field.to_datetime()?),
            "custom_fields" => self.custom_fields = Some(field.collection()?),
            "memberships" => self.memberships = Some(field.collection()?),
            "groups" => self.groups = Some(field.collection()?),
            _ => return Ok(false),
        }
        Ok(true)
    }
}

impl Encode for User {
    fn write_fields(&self, out: &mut NodeWriter) {
        if out.is_full() {
            out.value("id", self.id);
        }
        out.optional("login", self.login.as_deref());
        out.optional("firstname", self.firstname.as_deref());
        out.optional("lastname", self.lastname.as_deref());
        out.optional("mail", self.mail.as_deref());
        out.optional("password", self.password.as_deref());
        out.optional("auth_source_id", self.auth_source_id);
        out.optional("must_change_passwd", self.must_change_passwd);
        out.optional("status", self.status.map(|s| s.code()));
        if out.is_full() {
            out.optional("api_key", self.api_key.as_deref());
            out.datetime("created_on", self.created_on);
            out.datetime("last_login_on", self.last_login_on);
        }
        out.collection("custom_fields", "custom_field", self.custom_fields.as_deref());
        if out.is_full() {
            out.collection("memberships", "membership", self.memberships.as_deref());
            out.collection("groups", "group", self.groups.as_deref());
        }
    }
}

impl Entity for User {
    const KIND: EntityKind = EntityKind::User;
    const ROOT: &'static str = "user";
    const COLLECTION: &'static str = "users";
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Group {
    pub id: i32,
    pub name: Option<String>,
    pub users: Option<Vec<IdentifiableName>>,
    pub custom_fields: Option<Vec<IssueCustomField>>,
    pub memberships: Option<Vec<Membership>>,
}

impl Decode for Group {
    fn read_field(&mut self, field: &Node) -> RedmineResult<bool> {
        match field.name.as_str() {
            "id" => self.id = field.to_i32()?,
            "name" => self.name = Some(field.to_text()?),
            "users" => self.users = Some(field.collection()?),
            "custom_fields" => self.custom_fields = Some(field.collection()?),
            "memberships" => self.memberships = Some(field.collection()?),
            _ => return Ok(false),
        }
        Ok(true)
    }
}

impl Encode for Group {
    fn write_fields(&self, out: &mut NodeWriter) {
        if out.is_full() {
            out.value("id", self.id);
        }
        out.optional("name", self.name.as_deref());
        if out.is_full() {
            out.collection("users", "user", self.users.as_deref());
        } else {
            out.ids("user_ids", "user_id", self.users.as_deref());
        }
        out.collection("custom_fields", "custom_field", self.custom_fields.as_deref());
        if out.is_full() {
            out.collection("memberships", "membership", self.memberships.as_deref());
        }
    }
}

impl Entity for Group {
    const KIND: EntityKind = EntityKind::Group;
    const ROOT: &'static str = "group";
    const COLLECTION: &'static str = "groups";
}

/// A project membership as listed on a user or group (`include=memberships`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Membership {
    pub id: i32,
    pub project: Option<IdentifiableName>,
    pub roles: Option<Vec<MembershipRole>>,
}

impl Decode for Membership {
    fn read_field(&mut self, field: &Node) -> RedmineResult<bool> {
        match field.name.as_str() {
            "id" => self.id = field.to_i32()?,
            "project" => self.project = Some(field.decode()?),
            "roles" => self.roles = Some(field.collection()?),
            _ => return Ok(false),
        }
        Ok(true)
    }
}

impl Encode for Membership {
    fn write_fields(&self, out: &mut NodeWriter) {
        out.value("id", self.id);
        out.nested("project", self.project.as_ref());
        out.collection("roles", "role", self.roles.as_deref());
    }
}
