#![doc = "Google Drive v3 implementation of the core `DriveApi` contract."]
//
//! # Drive client
//!
//! [`DriveClient`] issues authenticated `GET` requests against the Drive REST
//! API with `reqwest`:
//!
//! - `files/{id}?fields=name` for folder names
//! - `files?q=...&fields=nextPageToken, files(...)&pageSize=...&pageToken=...`
//!   for child listings, one page per call
//! - `files/{id}/export?mimeType=...` for document content
//!
//! HTTP statuses are mapped onto [`SyncError`]: 404 is `NotFound`, 401 and
//! 403 are `AccessDenied`, everything else (and any transport or decoding
//! failure) is `TransientService`. Nothing is retried.

use async_trait::async_trait;
use gdocs_mirror_core::contract::{
    DriveApi, ListPage, RemoteDocument, RemoteFolder, DOCUMENT_FIELDS, DOCUMENT_MIME_TYPE,
    FOLDER_FIELDS, FOLDER_MIME_TYPE,
};
use gdocs_mirror_core::{Result, SyncError};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use url::Url;

/// Page size requested for child listings.
pub const DEFAULT_PAGE_SIZE: u32 = 400;

pub struct DriveClient {
    http: reqwest::Client,
    base_url: Url,
    access_token: String,
    page_size: u32,
}

impl DriveClient {
    pub fn new(
        http: reqwest::Client,
        base_url: &str,
        access_token: impl Into<String>,
    ) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| anyhow::anyhow!("Invalid Drive API base URL {base_url:?}: {e}"))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("Drive API base URL {base_url} cannot be used as a base");
        }
        tracing::info!(base_url = %base_url, "Initialized DriveClient");
        Ok(Self {
            http,
            base_url,
            access_token: access_token.into(),
            page_size: DEFAULT_PAGE_SIZE,
        })
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// `{base}/drive/v3/files[/segments...]`, each segment percent-encoded.
    fn files_url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SyncError::InvalidInput(format!("unusable base URL {}", self.base_url)))?
            .pop_if_empty()
            .extend(["drive", "v3", "files"])
            .extend(segments);
        Ok(url)
    }

    async fn get(&self, url: Url, query: &[(&str, &str)], resource: &str) -> Result<reqwest::Response> {
        tracing::debug!(url = %url, resource, "Drive API request");
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.access_token)
            .query(query)
            .send()
            .await
            .map_err(|e| SyncError::TransientService(format!("request for {resource} failed: {e}")))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        tracing::error!(%status, resource, body = %body, "Drive API returned error");
        Err(classify(status, resource, &body))
    }

    async fn list<T: DeserializeOwned>(
        &self,
        mime_type: &str,
        fields: &str,
        parent_id: &str,
        page_token: Option<String>,
    ) -> Result<ListPage<T>> {
        let q = children_query(mime_type, parent_id);
        let fields = format!("nextPageToken, files({fields})");
        let page_size = self.page_size.to_string();
        let mut query = vec![
            ("q", q.as_str()),
            ("fields", fields.as_str()),
            ("pageSize", page_size.as_str()),
        ];
        if let Some(token) = page_token.as_deref() {
            query.push(("pageToken", token));
        }

        let response = self.get(self.files_url(&[])?, &query, parent_id).await?;
        let page: ListPage<T> = response.json().await.map_err(|e| {
            SyncError::TransientService(format!("undecodable listing for {parent_id}: {e}"))
        })?;
        tracing::debug!(
            parent_id,
            mime_type,
            entries = page.files.len(),
            more = page.next_page_token.is_some(),
            "Listed children"
        );
        Ok(page)
    }
}

#[async_trait]
impl DriveApi for DriveClient {
    async fn get_folder_name(&self, folder_id: &str) -> Result<String> {
        #[derive(serde::Deserialize)]
        struct NameOnly {
            name: String,
        }

        let response = self
            .get(self.files_url(&[folder_id])?, &[("fields", "name")], folder_id)
            .await?;
        let file: NameOnly = response.json().await.map_err(|e| {
            SyncError::TransientService(format!("undecodable metadata for {folder_id}: {e}"))
        })?;
        Ok(file.name)
    }

    async fn list_documents(
        &self,
        parent_id: &str,
        page_token: Option<String>,
    ) -> Result<ListPage<RemoteDocument>> {
        self.list(DOCUMENT_MIME_TYPE, DOCUMENT_FIELDS, parent_id, page_token)
            .await
    }

    async fn list_folders(
        &self,
        parent_id: &str,
        page_token: Option<String>,
    ) -> Result<ListPage<RemoteFolder>> {
        self.list(FOLDER_MIME_TYPE, FOLDER_FIELDS, parent_id, page_token)
            .await
    }

    async fn export_document(&self, document_id: &str, mime_type: &str) -> Result<Vec<u8>> {
        let response = self
            .get(
                self.files_url(&[document_id, "export"])?,
                &[("mimeType", mime_type)],
                document_id,
            )
            .await?;
        let bytes = response.bytes().await.map_err(|e| {
            SyncError::TransientService(format!("export of {document_id} interrupted: {e}"))
        })?;
        Ok(bytes.to_vec())
    }
}

/// Drive search query for non-trashed children of one type.
pub fn children_query(mime_type: &str, parent_id: &str) -> String {
    format!(
        "mimeType='{}' and '{}' in parents and trashed = false",
        mime_type,
        escape_query_literal(parent_id)
    )
}

/// Escape `\` and `'` for use inside a single-quoted query literal.
fn escape_query_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

fn classify(status: StatusCode, resource: &str, body: &str) -> SyncError {
    let detail = format!("{resource} ({status}): {body}");
    match status {
        StatusCode::NOT_FOUND => SyncError::NotFound(detail),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SyncError::AccessDenied(detail),
        _ => SyncError::TransientService(detail),
    }
}
