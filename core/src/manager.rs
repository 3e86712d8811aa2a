//! One-call operations over a [`Transport`].
//!
//! # Design
//! `RedmineManager` pairs a [`RedmineClient`] with a caller-supplied
//! transport and runs `build_*`, `execute`, `parse_*` in sequence. Every
//! method is one request/response exchange, except [`get_objects`] which
//! walks pages sequentially.
//!
//! [`get_objects`]: RedmineManager::get_objects

use tracing::debug;

use crate::client::RedmineClient;
use crate::error::RedmineResult;
use crate::http::{HttpRequest, Transport, TransportOutcome};
use crate::params::Parameters;
use crate::serialization::{Entity, PagedList};
use crate::types::{Attachment, Upload, User, WikiPage};

pub const DEFAULT_PAGE_SIZE: u32 = 25;

#[derive(Debug, Clone)]
pub struct RedmineManager<T: Transport> {
    client: RedmineClient,
    transport: T,
    page_size: u32,
}

impl<T: Transport> RedmineManager<T> {
    pub fn new(client: RedmineClient, transport: T) -> Self {
        Self {
            client,
            transport,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Page size used by [`get_objects`](Self::get_objects) when the
    /// parameters carry no `limit`.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn client(&self) -> &RedmineClient {
        &self.client
    }

    fn send(&self, request: HttpRequest) -> TransportOutcome {
        self.transport.execute(request)
    }

    pub fn create_object<E: Entity>(&self, entity: &E, owner_id: Option<&str>) -> RedmineResult<E> {
        let request = self.client.build_create(entity, owner_id)?;
        self.client.parse_create(self.send(request))
    }

    pub fn get_object<E: Entity>(&self, id: &str, params: &Parameters) -> RedmineResult<E> {
        let request = self.client.build_get::<E>(id, params)?;
        self.client.parse_get(self.send(request))
    }

    /// One page, as selected by `offset`/`limit` in `params`.
    pub fn get_paginated_objects<E: Entity>(&self, params: &Parameters) -> RedmineResult<PagedList<E>> {
        let request = self.client.build_list::<E>(params)?;
        self.client.parse_list(self.send(request))
    }

    /// Every item, fetched page by page until `total_count` items have been
    /// collected or the server returns an empty page.
    pub fn get_objects<E: Entity>(&self, params: &Parameters) -> RedmineResult<Vec<E>> {
        let mut query = params.clone();
        if query.get("limit").is_none() {
            query.set("limit", self.page_size);
        }
        let mut offset: u32 = query.get("offset").and_then(|o| o.parse().ok()).unwrap_or(0);
        let mut items = Vec::new();
        loop {
            query.set("offset", offset);
            let page: PagedList<E> = self.get_paginated_objects(&query)?;
            let fetched = page.items.len() as u32;
            items.extend(page.items);
            debug!(fetched, offset, total = ?page.total_count, "fetched page");
            match page.total_count {
                Some(total) if fetched > 0 && offset + fetched < total => offset += fetched,
                _ => break,
            }
        }
        Ok(items)
    }

    pub fn update_object<E: Entity>(&self, id: &str, entity: &E) -> RedmineResult<()> {
        let request = self.client.build_update(id, entity)?;
        self.client.parse_update(self.send(request))
    }

    pub fn delete_object<E: Entity>(&self, id: &str) -> RedmineResult<()> {
        let request = self.client.build_delete::<E>(id)?;
        self.client.parse_delete(self.send(request))
    }

    pub fn get_current_user(&self, params: &Parameters) -> RedmineResult<User> {
        let request = self.client.build_current_user(params);
        self.client.parse_current_user(self.send(request))
    }

    pub fn upload_file(&self, data: Vec<u8>) -> RedmineResult<Upload> {
        let request = self.client.build_upload_file(data);
        self.client.parse_upload_file(self.send(request))
    }

    pub fn get_all_wiki_pages(&self, project_id: &str) -> RedmineResult<Vec<WikiPage>> {
        let request = self.client.build_wiki_index(project_id);
        Ok(self.client.parse_wiki_index(self.send(request))?.items)
    }

    pub fn get_wiki_page(
        &self,
        project_id: &str,
        page: &str,
        version: Option<u32>,
        params: &Parameters,
    ) -> RedmineResult<WikiPage> {
        let request = self.client.build_get_wiki_page(project_id, page, version, params);
        self.client.parse_get_wiki_page(self.send(request))
    }

    pub fn create_or_update_wiki_page(
        &self,
        project_id: &str,
        page: &str,
        content: &WikiPage,
    ) -> RedmineResult<Option<WikiPage>> {
        let request = self.client.build_put_wiki_page(project_id, page, content)?;
        self.client.parse_put_wiki_page(self.send(request))
    }

    pub fn delete_wiki_page(&self, project_id: &str, page: &str) -> RedmineResult<()> {
        let request = self.client.build_delete_wiki_page(project_id, page);
        self.client.parse_delete_wiki_page(self.send(request))
    }

    pub fn add_user_to_group(&self, group_id: i32, user_id: i32) -> RedmineResult<()> {
        let request = self.client.build_add_user_to_group(group_id, user_id)?;
        self.client.parse_add_user_to_group(self.send(request))
    }

    pub fn remove_user_from_group(&self, group_id: i32, user_id: i32) -> RedmineResult<()> {
        let request = self.client.build_remove_user_from_group(group_id, user_id);
        self.client.parse_remove_user_from_group(self.send(request))
    }

    pub fn add_watcher_to_issue(&self, issue_id: i32, user_id: i32) -> RedmineResult<()> {
        let request = self.client.build_add_watcher(issue_id, user_id)?;
        self.client.parse_add_watcher(self.send(request))
    }

    pub fn remove_watcher_from_issue(&self, issue_id: i32, user_id: i32) -> RedmineResult<()> {
        let request = self.client.build_remove_watcher(issue_id, user_id);
        self.client.parse_remove_watcher(self.send(request))
    }

    pub fn update_attachment(&self, issue_id: i32, attachments: &[Attachment]) -> RedmineResult<()> {
        let request = self.client.build_update_attachment(issue_id, attachments)?;
        self.client.parse_update_attachment(self.send(request))
    }
}
