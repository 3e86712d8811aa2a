//! Stateless HTTP request builder and response parser for the Redmine API.
//!
//! # Design
//! `RedmineClient` holds only the host, the wire format and the credentials,
//! and carries no mutable state between calls. Each operation is split into
//! a `build_*` method that produces an `HttpRequest` and a `parse_*` method
//! that consumes the transport's outcome. The caller executes the actual
//! HTTP round-trip (or hands a [`Transport`](crate::http::Transport) to
//! [`RedmineManager`](crate::manager::RedmineManager)), keeping the core
//! deterministic and free of I/O dependencies.

use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{RedmineError, RedmineResult};
use crate::format::MimeFormat;
use crate::http::{HttpMethod, HttpRequest, TransportOutcome};
use crate::params::Parameters;
use crate::response::ResponseTranslator;
use crate::serialization::{self, Entity, Node, PagedList, WriteMode};
use crate::types::{Attachment, Upload, User, WikiPage};
use crate::urls::{Endpoint, Operation, UrlResolver};

pub const API_KEY_HEADER: &str = "X-Redmine-API-Key";
pub const SWITCH_USER_HEADER: &str = "X-Redmine-Switch-User";
const OCTET_STREAM: &str = "application/octet-stream";

/// Synchronous, stateless client for the Redmine REST API.
///
/// Immutable once built; clone it freely across threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedmineClient {
    host: String,
    format: MimeFormat,
    api_key: Option<String>,
    impersonate: Option<String>,
}

impl RedmineClient {
    /// `host` may omit the scheme (`http://` is assumed) and may end in `/`.
    pub fn new(host: &str, format: MimeFormat) -> RedmineResult<Self> {
        Ok(Self {
            host: normalize_host(host)?,
            format,
            api_key: None,
            impersonate: None,
        })
    }

    pub fn from_config(config: &ClientConfig) -> RedmineResult<Self> {
        let mut client = Self::new(&config.host, config.format)?;
        client.api_key = config.api_key.clone();
        client.impersonate = config.impersonate.clone();
        Ok(client)
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Acts as another user; needs an administrator's API key.
    pub fn with_impersonation(mut self, login: impl Into<String>) -> Self {
        self.impersonate = Some(login.into());
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn format(&self) -> MimeFormat {
        self.format
    }

    pub fn resolver(&self) -> UrlResolver<'_> {
        UrlResolver::new(&self.host, self.format)
    }

    fn translator(&self) -> ResponseTranslator {
        ResponseTranslator::new(self.format)
    }

    fn request(&self, method: HttpMethod, path: String, body: Option<(Vec<u8>, &str)>) -> HttpRequest {
        let mut headers = Vec::new();
        let body = body.map(|(bytes, content_type)| {
            headers.push(("content-type".to_string(), content_type.to_string()));
            bytes
        });
        if let Some(key) = &self.api_key {
            headers.push((API_KEY_HEADER.to_string(), key.clone()));
        }
        if let Some(login) = &self.impersonate {
            headers.push((SWITCH_USER_HEADER.to_string(), login.clone()));
        }
        debug!(%method, url = %path, "built request");
        HttpRequest {
            method,
            path,
            headers,
            body,
        }
    }

    fn payload(&self, text: String) -> Option<(Vec<u8>, &'static str)> {
        Some((text.into_bytes(), self.format.content_type()))
    }

    fn encode<T: Entity>(&self, entity: &T, mode: WriteMode) -> RedmineResult<Option<(Vec<u8>, &'static str)>> {
        Ok(self.payload(serialization::encode(entity, mode, self.format)?))
    }

    // -- generic operations ------------------------------------------------

    /// `owner_id` is the parent project/issue for parent-scoped kinds and
    /// ignored otherwise.
    pub fn build_create<T: Entity>(&self, entity: &T, owner_id: Option<&str>) -> RedmineResult<HttpRequest> {
        let url = self.resolver().resolve(T::KIND, Operation::Create { owner_id })?;
        Ok(self.request(HttpMethod::Post, url, self.encode(entity, WriteMode::Create)?))
    }

    pub fn parse_create<T: Entity>(&self, outcome: TransportOutcome) -> RedmineResult<T> {
        self.translator().translate(outcome, HttpMethod::Post)
    }

    pub fn build_get<T: Entity>(&self, id: &str, params: &Parameters) -> RedmineResult<HttpRequest> {
        let url = self.resolver().resolve(T::KIND, Operation::Read { id })?;
        Ok(self.request(HttpMethod::Get, params.apply(url), None))
    }

    pub fn parse_get<T: Entity>(&self, outcome: TransportOutcome) -> RedmineResult<T> {
        self.translator().translate(outcome, HttpMethod::Get)
    }

    /// For parent-scoped kinds the owner is taken from `project_id` /
    /// `issue_id` in `params` and moved into the path.
    pub fn build_list<T: Entity>(&self, params: &Parameters) -> RedmineResult<HttpRequest> {
        let descriptor = T::KIND.descriptor()?;
        let mut query = params.clone();
        let owner = match descriptor.parent {
            Some(parent) if descriptor.list_requires_parent => query.remove(parent.parameter()),
            _ => None,
        };
        let url = self
            .resolver()
            .resolve(T::KIND, Operation::List { owner_id: owner.as_deref() })?;
        Ok(self.request(HttpMethod::Get, query.apply(url), None))
    }

    pub fn parse_list<T: Entity>(&self, outcome: TransportOutcome) -> RedmineResult<PagedList<T>> {
        self.translator().translate_list(outcome, HttpMethod::Get)
    }

    pub fn build_update<T: Entity>(&self, id: &str, entity: &T) -> RedmineResult<HttpRequest> {
        let url = self.resolver().resolve(T::KIND, Operation::Update { id })?;
        Ok(self.request(HttpMethod::Put, url, self.encode(entity, WriteMode::Update)?))
    }

    pub fn parse_update(&self, outcome: TransportOutcome) -> RedmineResult<()> {
        self.translator().translate_empty(outcome, HttpMethod::Put)
    }

    pub fn build_delete<T: Entity>(&self, id: &str) -> RedmineResult<HttpRequest> {
        let url = self.resolver().resolve(T::KIND, Operation::Delete { id })?;
        Ok(self.request(HttpMethod::Delete, url, None))
    }

    pub fn parse_delete(&self, outcome: TransportOutcome) -> RedmineResult<()> {
        self.translator().translate_empty(outcome, HttpMethod::Delete)
    }

    // -- special endpoints -------------------------------------------------

    pub fn build_current_user(&self, params: &Parameters) -> HttpRequest {
        let url = self.resolver().endpoint(Endpoint::CurrentUser);
        self.request(HttpMethod::Get, params.apply(url), None)
    }

    pub fn parse_current_user(&self, outcome: TransportOutcome) -> RedmineResult<User> {
        self.translator().translate(outcome, HttpMethod::Get)
    }

    /// Raw file contents; the response carries the token to attach.
    pub fn build_upload_file(&self, data: Vec<u8>) -> HttpRequest {
        let url = self.resolver().endpoint(Endpoint::Uploads);
        self.request(HttpMethod::Post, url, Some((data, OCTET_STREAM)))
    }

    pub fn parse_upload_file(&self, outcome: TransportOutcome) -> RedmineResult<Upload> {
        self.translator().translate(outcome, HttpMethod::Post)
    }

    pub fn build_wiki_index(&self, project_id: &str) -> HttpRequest {
        let url = self.resolver().endpoint(Endpoint::WikiIndex { project_id });
        self.request(HttpMethod::Get, url, None)
    }

    pub fn parse_wiki_index(&self, outcome: TransportOutcome) -> RedmineResult<PagedList<WikiPage>> {
        self.translator().translate_list(outcome, HttpMethod::Get)
    }

    pub fn build_get_wiki_page(
        &self,
        project_id: &str,
        page: &str,
        version: Option<u32>,
        params: &Parameters,
    ) -> HttpRequest {
        let url = self
            .resolver()
            .endpoint(Endpoint::WikiPage { project_id, page, version });
        self.request(HttpMethod::Get, params.apply(url), None)
    }

    pub fn parse_get_wiki_page(&self, outcome: TransportOutcome) -> RedmineResult<WikiPage> {
        self.translator().translate(outcome, HttpMethod::Get)
    }

    /// Creates the page when missing, otherwise adds a new version.
    pub fn build_put_wiki_page(&self, project_id: &str, page: &str, content: &WikiPage) -> RedmineResult<HttpRequest> {
        let url = self
            .resolver()
            .endpoint(Endpoint::WikiPage { project_id, page, version: None });
        Ok(self.request(HttpMethod::Put, url, self.encode(content, WriteMode::Update)?))
    }

    /// The created page on 201; `None` when an existing page was updated.
    pub fn parse_put_wiki_page(&self, outcome: TransportOutcome) -> RedmineResult<Option<WikiPage>> {
        self.translator().translate_optional(outcome, HttpMethod::Put)
    }

    pub fn build_delete_wiki_page(&self, project_id: &str, page: &str) -> HttpRequest {
        let url = self
            .resolver()
            .endpoint(Endpoint::WikiPage { project_id, page, version: None });
        self.request(HttpMethod::Delete, url, None)
    }

    pub fn parse_delete_wiki_page(&self, outcome: TransportOutcome) -> RedmineResult<()> {
        self.translator().translate_empty(outcome, HttpMethod::Delete)
    }

    fn user_id_body(&self, user_id: i32) -> RedmineResult<Option<(Vec<u8>, &'static str)>> {
        let body = serialization::render(&Node::scalar("user_id", user_id), self.format)?;
        Ok(self.payload(body))
    }

    pub fn build_add_user_to_group(&self, group_id: i32, user_id: i32) -> RedmineResult<HttpRequest> {
        let url = self.resolver().endpoint(Endpoint::GroupUsers { group_id });
        Ok(self.request(HttpMethod::Post, url, self.user_id_body(user_id)?))
    }

    pub fn parse_add_user_to_group(&self, outcome: TransportOutcome) -> RedmineResult<()> {
        self.translator().translate_empty(outcome, HttpMethod::Post)
    }

    pub fn build_remove_user_from_group(&self, group_id: i32, user_id: i32) -> HttpRequest {
        let url = self.resolver().endpoint(Endpoint::GroupUser { group_id, user_id });
        self.request(HttpMethod::Delete, url, None)
    }

    pub fn parse_remove_user_from_group(&self, outcome: TransportOutcome) -> RedmineResult<()> {
        self.translator().translate_empty(outcome, HttpMethod::Delete)
    }

    pub fn build_add_watcher(&self, issue_id: i32, user_id: i32) -> RedmineResult<HttpRequest> {
        let url = self.resolver().endpoint(Endpoint::Watchers { issue_id });
        Ok(self.request(HttpMethod::Post, url, self.user_id_body(user_id)?))
    }

    pub fn parse_add_watcher(&self, outcome: TransportOutcome) -> RedmineResult<()> {
        self.translator().translate_empty(outcome, HttpMethod::Post)
    }

    pub fn build_remove_watcher(&self, issue_id: i32, user_id: i32) -> HttpRequest {
        let url = self.resolver().endpoint(Endpoint::Watcher { issue_id, user_id });
        self.request(HttpMethod::Delete, url, None)
    }

    pub fn parse_remove_watcher(&self, outcome: TransportOutcome) -> RedmineResult<()> {
        self.translator().translate_empty(outcome, HttpMethod::Delete)
    }

    /// Renames or re-describes attachments of an issue. The body keys each
    /// attachment's changed fields by its id.
    pub fn build_update_attachment(&self, issue_id: i32, attachments: &[Attachment]) -> RedmineResult<HttpRequest> {
        let url = self.resolver().endpoint(Endpoint::AttachmentUpdate { issue_id });
        let mut root = Node::new("attachments");
        root.is_array = self.format == MimeFormat::Xml;
        for attachment in attachments {
            let mut entry = serialization::to_node(attachment, "attachment", WriteMode::Update);
            match self.format {
                MimeFormat::Xml => {
                    let mut id = Node::scalar("id", attachment.id);
                    id.is_attribute = true;
                    entry.children.insert(0, id);
                }
                MimeFormat::Json => entry.name = attachment.id.to_string(),
            }
            root.children.push(entry);
        }
        let body = serialization::render(&root, self.format)?;
        Ok(self.request(HttpMethod::Patch, url, self.payload(body)))
    }

    pub fn parse_update_attachment(&self, outcome: TransportOutcome) -> RedmineResult<()> {
        self.translator().translate_empty(outcome, HttpMethod::Patch)
    }
}

fn normalize_host(host: &str) -> RedmineResult<String> {
    let host = host.trim().trim_end_matches('/');
    if host.is_empty() {
        return Err(RedmineError::InvalidConfig("host is empty".to_string()));
    }
    let host = if host.contains("://") {
        host.to_string()
    } else {
        format!("http://{host}")
    };
    url::Url::parse(&host).map_err(|e| RedmineError::InvalidConfig(format!("invalid host `{host}`: {e}")))?;
    Ok(host)
}
