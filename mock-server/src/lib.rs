//! In-memory stand-in for a Redmine server.
//!
//! Serves project versions (list, create, read, update, delete) and the
//! current user in both wire formats. The format comes from the last path
//! segment's extension, as on the real server (`/versions/3.json`). Every
//! request needs the `X-Redmine-API-Key` header set to [`API_KEY`].

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use quick_xml::{
    se::{QuoteLevel, Serializer},
    DeError,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, error};

pub const API_KEY: &str = "mock-api-key";
pub const API_KEY_HEADER: &str = "x-redmine-api-key";
const TIMESTAMP: &str = "2024-01-01T00:00:00Z";
const DEFAULT_LIMIT: usize = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Xml,
    Json,
}

impl Format {
    fn content_type(self) -> &'static str {
        match self {
            Format::Xml => "application/xml; charset=utf-8",
            Format::Json => "application/json; charset=utf-8",
        }
    }
}

/// Splits `"3.json"` into `("3", Format::Json)`.
pub fn split_file(file: &str) -> Option<(&str, Format)> {
    let (stem, extension) = file.rsplit_once('.')?;
    let format = match extension {
        "xml" => Format::Xml,
        "json" => Format::Json,
        _ => return None,
    };
    Some((stem, format))
}

#[derive(Clone, Debug, PartialEq)]
pub struct Version {
    pub id: i32,
    pub project_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub status: String,
    pub sharing: String,
    pub due_date: Option<String>,
}

/// Writable fields of a version request body. Anything else is ignored.
#[derive(Debug, Default, Deserialize)]
pub struct VersionInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub sharing: Option<String>,
    pub due_date: Option<String>,
}

#[derive(Deserialize)]
struct VersionEnvelope {
    version: VersionInput,
}

pub fn parse_version_input(format: Format, body: &str) -> Result<VersionInput, String> {
    match format {
        Format::Xml => quick_xml::de::from_str(body).map_err(|e| e.to_string()),
        Format::Json => serde_json::from_str::<VersionEnvelope>(body)
            .map(|envelope| envelope.version)
            .map_err(|e| e.to_string()),
    }
}

impl VersionInput {
    fn problems(&self, creating: bool) -> Vec<String> {
        let mut problems = Vec::new();
        let blank_name = match &self.name {
            Some(name) => name.trim().is_empty(),
            None => creating,
        };
        if blank_name {
            problems.push("Name can't be blank".to_string());
        }
        if let Some(status) = &self.status {
            if !["open", "locked", "closed"].contains(&status.as_str()) {
                problems.push("Status is not included in the list".to_string());
            }
        }
        problems
    }
}

#[derive(Debug, Default)]
pub struct Store {
    next_id: i32,
    versions: BTreeMap<i32, Version>,
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route(
            "/projects/{project_id}/{file}",
            get(list_versions).post(create_version),
        )
        .route(
            "/versions/{file}",
            get(get_version).put(update_version).delete(delete_version),
        )
        .route("/users/{file}", get(current_user))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        == Some(API_KEY)
}

fn reply(status: StatusCode, format: Format, body: String) -> Response {
    (status, [(header::CONTENT_TYPE, format.content_type())], body).into_response()
}

fn reply_json(status: StatusCode, value: Value) -> Response {
    reply(status, Format::Json, value.to_string())
}

/// Serializes `value` as the `root` element of an XML document.
pub fn to_xml<T: Serialize>(root: &str, value: &T) -> Result<String, DeError> {
    let mut body = String::from(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    let mut serializer = Serializer::with_root(&mut body, Some(root))?;
    serializer.set_quote_level(QuoteLevel::Full);
    value.serialize(serializer)?;
    Ok(body)
}

fn reply_xml<T: Serialize>(status: StatusCode, root: &str, value: &T) -> Response {
    match to_xml(root, value) {
        Ok(body) => reply(status, Format::Xml, body),
        Err(reason) => {
            error!(%reason, root, "cannot render xml");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

const ARRAY: &str = "array";

#[derive(Serialize)]
struct ErrorsXml<'a> {
    #[serde(rename = "@type")]
    kind: &'static str,
    error: &'a [String],
}

#[derive(Serialize)]
struct ReferenceXml {
    #[serde(rename = "@id")]
    id: i32,
    #[serde(rename = "@name")]
    name: String,
}

/// A missing optional field renders as an empty element, like Redmine does.
#[derive(Serialize)]
struct VersionXml<'a> {
    id: i32,
    project: ReferenceXml,
    name: &'a str,
    description: Option<&'a str>,
    status: &'a str,
    sharing: &'a str,
    due_date: Option<&'a str>,
    created_on: &'static str,
    updated_on: &'static str,
}

impl<'a> From<&'a Version> for VersionXml<'a> {
    fn from(version: &'a Version) -> Self {
        Self {
            id: version.id,
            project: ReferenceXml {
                id: version.project_id,
                name: format!("Project {}", version.project_id),
            },
            name: &version.name,
            description: version.description.as_deref(),
            status: &version.status,
            sharing: &version.sharing,
            due_date: version.due_date.as_deref(),
            created_on: TIMESTAMP,
            updated_on: TIMESTAMP,
        }
    }
}

#[derive(Serialize)]
struct VersionsXml<'a> {
    #[serde(rename = "@type")]
    kind: &'static str,
    #[serde(rename = "@total_count")]
    total_count: usize,
    #[serde(rename = "@offset")]
    offset: usize,
    #[serde(rename = "@limit")]
    limit: usize,
    version: Vec<VersionXml<'a>>,
}

#[derive(Serialize)]
struct UserXml {
    id: i32,
    login: &'static str,
    firstname: &'static str,
    lastname: &'static str,
    mail: &'static str,
    created_on: &'static str,
    last_login_on: Option<&'static str>,
    api_key: &'static str,
    status: i32,
}

fn validation_failed(format: Format, problems: &[String]) -> Response {
    let status = StatusCode::UNPROCESSABLE_ENTITY;
    match format {
        Format::Xml => reply_xml(status, "errors", &ErrorsXml { kind: ARRAY, error: problems }),
        Format::Json => reply_json(status, json!({ "errors": problems })),
    }
}

fn version_json(version: &Version) -> Value {
    json!({
        "id": version.id,
        "project": { "id": version.project_id, "name": format!("Project {}", version.project_id) },
        "name": version.name,
        "description": version.description,
        "status": version.status,
        "sharing": version.sharing,
        "due_date": version.due_date,
        "created_on": TIMESTAMP,
        "updated_on": TIMESTAMP,
    })
}

fn render_version(status: StatusCode, format: Format, version: &Version) -> Response {
    match format {
        Format::Xml => reply_xml(status, "version", &VersionXml::from(version)),
        Format::Json => reply_json(status, json!({ "version": version_json(version) })),
    }
}

/// Resolves `/projects/{id}/versions.{format}`.
fn project_scope(project_id: &str, file: &str) -> Option<(i32, Format)> {
    let (stem, format) = split_file(file)?;
    if stem != "versions" {
        return None;
    }
    Some((project_id.parse().ok()?, format))
}

/// Resolves `/versions/{id}.{format}`.
fn version_scope(file: &str) -> Option<(i32, Format)> {
    let (stem, format) = split_file(file)?;
    Some((stem.parse().ok()?, format))
}

async fn list_versions(
    State(db): State<Db>,
    Path((project_id, file)): Path<(String, String)>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let Some((project_id, format)) = project_scope(&project_id, &file) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let offset = query.get("offset").and_then(|o| o.parse().ok()).unwrap_or(0);
    let limit = query
        .get("limit")
        .and_then(|l| l.parse().ok())
        .unwrap_or(DEFAULT_LIMIT);

    let store = db.read().await;
    let all: Vec<&Version> = store
        .versions
        .values()
        .filter(|v| v.project_id == project_id)
        .collect();
    let total = all.len();
    let page = all.into_iter().skip(offset).take(limit);
    debug!(project_id, total, offset, limit, "listing versions");

    match format {
        Format::Xml => {
            let list = VersionsXml {
                kind: ARRAY,
                total_count: total,
                offset,
                limit,
                version: page.map(VersionXml::from).collect(),
            };
            reply_xml(StatusCode::OK, "versions", &list)
        }
        Format::Json => {
            let items: Vec<Value> = page.map(version_json).collect();
            reply_json(
                StatusCode::OK,
                json!({ "versions": items, "total_count": total, "offset": offset, "limit": limit }),
            )
        }
    }
}

async fn create_version(
    State(db): State<Db>,
    Path((project_id, file)): Path<(String, String)>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let Some((project_id, format)) = project_scope(&project_id, &file) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let input = match parse_version_input(format, &body) {
        Ok(input) => input,
        Err(reason) => {
            debug!(%reason, "unreadable version body");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };
    let problems = input.problems(true);
    if !problems.is_empty() {
        return validation_failed(format, &problems);
    }

    let mut store = db.write().await;
    store.next_id += 1;
    let version = Version {
        id: store.next_id,
        project_id,
        name: input.name.unwrap_or_default(),
        description: input.description,
        status: input.status.unwrap_or_else(|| "open".to_string()),
        sharing: input.sharing.unwrap_or_else(|| "none".to_string()),
        due_date: input.due_date,
    };
    store.versions.insert(version.id, version.clone());
    debug!(id = version.id, project_id, "created version");
    render_version(StatusCode::CREATED, format, &version)
}

async fn get_version(State(db): State<Db>, Path(file): Path<String>, headers: HeaderMap) -> Response {
    let Some((id, format)) = version_scope(&file) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let store = db.read().await;
    match store.versions.get(&id) {
        Some(version) => render_version(StatusCode::OK, format, version),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn update_version(
    State(db): State<Db>,
    Path(file): Path<String>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let Some((id, format)) = version_scope(&file) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let mut store = db.write().await;
    let Some(version) = store.versions.get_mut(&id) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let input = match parse_version_input(format, &body) {
        Ok(input) => input,
        Err(_) => return StatusCode::BAD_REQUEST.into_response(),
    };
    let problems = input.problems(false);
    if !problems.is_empty() {
        return validation_failed(format, &problems);
    }
    if let Some(name) = input.name {
        version.name = name;
    }
    if let Some(description) = input.description {
        version.description = Some(description);
    }
    if let Some(status) = input.status {
        version.status = status;
    }
    if let Some(sharing) = input.sharing {
        version.sharing = sharing;
    }
    if let Some(due_date) = input.due_date {
        version.due_date = Some(due_date);
    }
    debug!(id, "updated version");
    StatusCode::NO_CONTENT.into_response()
}

async fn delete_version(State(db): State<Db>, Path(file): Path<String>, headers: HeaderMap) -> Response {
    let Some((id, _)) = version_scope(&file) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let mut store = db.write().await;
    match store.versions.remove(&id) {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn current_user(Path(file): Path<String>, headers: HeaderMap) -> Response {
    let Some(("current", format)) = split_file(&file) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    match format {
        Format::Xml => {
            let user = UserXml {
                id: 1,
                login: "admin",
                firstname: "Redmine",
                lastname: "Admin",
                mail: "admin@example.net",
                created_on: TIMESTAMP,
                last_login_on: None,
                api_key: API_KEY,
                status: 1,
            };
            reply_xml(StatusCode::OK, "user", &user)
        }
        Format::Json => reply_json(
            StatusCode::OK,
            json!({ "user": {
                "id": 1,
                "login": "admin",
                "firstname": "Redmine",
                "lastname": "Admin",
                "mail": "admin@example.net",
                "created_on": TIMESTAMP,
                "last_login_on": null,
                "api_key": API_KEY,
                "status": 1,
            }}),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_segment_selects_format() {
        assert_eq!(split_file("3.json"), Some(("3", Format::Json)));
        assert_eq!(split_file("versions.xml"), Some(("versions", Format::Xml)));
        assert_eq!(split_file("versions.yaml"), None);
        assert_eq!(split_file("versions"), None);
    }

    #[test]
    fn xml_body_reads_known_fields_only() {
        let input = parse_version_input(
            Format::Xml,
            r#"<version><name>1.0</name><status>locked</status><custom_fields type="array"/></version>"#,
        )
        .unwrap();
        assert_eq!(input.name.as_deref(), Some("1.0"));
        assert_eq!(input.status.as_deref(), Some("locked"));
        assert!(input.due_date.is_none());
    }

    #[test]
    fn json_body_needs_envelope() {
        let input = parse_version_input(Format::Json, r#"{"version":{"name":"2.0"}}"#).unwrap();
        assert_eq!(input.name.as_deref(), Some("2.0"));
        assert!(parse_version_input(Format::Json, r#"{"name":"2.0"}"#).is_err());
    }

    #[test]
    fn blank_name_is_a_problem_on_create_only_when_missing() {
        assert_eq!(VersionInput::default().problems(true), ["Name can't be blank"]);
        assert!(VersionInput::default().problems(false).is_empty());
        let input = VersionInput {
            name: Some("  ".into()),
            status: Some("frozen".into()),
            ..VersionInput::default()
        };
        assert_eq!(input.problems(false).len(), 2);
    }

    #[test]
    fn version_xml_escapes_text() {
        let version = Version {
            id: 1,
            project_id: 2,
            name: "R&D <beta> 'rc'".into(),
            description: None,
            status: "open".into(),
            sharing: "none".into(),
            due_date: None,
        };
        let xml = to_xml("version", &VersionXml::from(&version)).unwrap();
        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?><version><id>1</id>"#), "{xml}");
        assert!(xml.contains("<name>R&amp;D &lt;beta&gt; &apos;rc&apos;</name>"), "{xml}");
        assert!(xml.contains(r#"<project id="2" name="Project 2"/>"#), "{xml}");
        assert!(xml.contains("<description/>"), "{xml}");
    }

    #[test]
    fn list_xml_carries_paging_attributes() {
        let version = Version {
            id: 4,
            project_id: 1,
            name: "2.0".into(),
            description: Some("Second".into()),
            status: "locked".into(),
            sharing: "none".into(),
            due_date: Some("2024-06-30".into()),
        };
        let list = VersionsXml {
            kind: ARRAY,
            total_count: 7,
            offset: 2,
            limit: 1,
            version: vec![VersionXml::from(&version)],
        };
        let xml = to_xml("versions", &list).unwrap();
        assert!(
            xml.contains(r#"<versions type="array" total_count="7" offset="2" limit="1"><version><id>4</id>"#),
            "{xml}"
        );
        assert!(xml.contains("<due_date>2024-06-30</due_date>"), "{xml}");

        let empty = VersionsXml { version: Vec::new(), ..list };
        let xml = to_xml("versions", &empty).unwrap();
        assert!(xml.ends_with(r#"<versions type="array" total_count="7" offset="2" limit="1"/>"#), "{xml}");
    }
}
