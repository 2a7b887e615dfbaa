//! # contract: the remote document service boundary
//!
//! This module defines the single trait ([`DriveApi`]) the reader talks to,
//! plus the listing types it returns. The real implementation lives in the
//! `gdocs-mirror` crate (Google Drive v3 over HTTPS); tests use the
//! `mockall`-generated [`MockDriveApi`].
//!
//! ## Listing entries
//! - [`RemoteDocument`] and [`RemoteFolder`] mirror the Drive `File` resource
//!   restricted to the fields we request. Field names deserialize from the
//!   service's camelCase JSON.
//! - [`ListPage`] is one page of a listing. Callers follow
//!   `next_page_token` until it is absent.
//!
//! ## Errors
//! Implementors map transport failures onto [`SyncError`](crate::SyncError):
//! `NotFound`, `AccessDenied` or `TransientService`.

use std::collections::BTreeMap;

use async_trait::async_trait;
use mockall::automock;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// MIME type of a Google Docs document.
pub const DOCUMENT_MIME_TYPE: &str = "application/vnd.google-apps.document";
/// MIME type of a Drive folder.
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";
/// Rendition requested when exporting a document.
pub const EXPORT_MIME_TYPE: &str = "text/markdown";

/// Fields requested for document listings.
pub const DOCUMENT_FIELDS: &str =
    "id, name, description, modifiedTime, lastModifyingUser, owners, version, properties, permissionIds";
/// Fields requested for folder listings.
pub const FOLDER_FIELDS: &str = "id, name, owners";

/// A user record as embedded in `lastModifyingUser` and `owners`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteUser {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email_address: Option<String>,
}

/// A document entry from a child listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteDocument {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub modified_time: Option<String>,
    #[serde(default)]
    pub last_modifying_user: Option<RemoteUser>,
    #[serde(default)]
    pub owners: Vec<RemoteUser>,
    /// Drive encodes the int64 version as a JSON string.
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
    #[serde(default)]
    pub permission_ids: Vec<String>,
}

/// A folder entry from a child listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteFolder {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub owners: Vec<RemoteUser>,
}

/// One page of a child listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPage<T> {
    #[serde(default = "Vec::new")]
    pub files: Vec<T>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

impl<T> ListPage<T> {
    /// A page with no continuation.
    pub fn last(files: Vec<T>) -> Self {
        Self {
            files,
            next_page_token: None,
        }
    }

    /// A page followed by another one fetched with `token`.
    pub fn with_next(files: Vec<T>, token: impl Into<String>) -> Self {
        Self {
            files,
            next_page_token: Some(token.into()),
        }
    }
}

/// Read-only access to a remote document tree.
///
/// Every call is a single remote round trip. Listings exclude trashed
/// entries and are returned one page at a time; pass the previous page's
/// `next_page_token` to get the next one.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait DriveApi: Send + Sync {
    /// Look up the display name of a folder.
    async fn get_folder_name(&self, folder_id: &str) -> Result<String>;

    /// List the documents directly inside `parent_id`.
    async fn list_documents(
        &self,
        parent_id: &str,
        page_token: Option<String>,
    ) -> Result<ListPage<RemoteDocument>>;

    /// List the folders directly inside `parent_id`.
    async fn list_folders(
        &self,
        parent_id: &str,
        page_token: Option<String>,
    ) -> Result<ListPage<RemoteFolder>>;

    /// Export a document in the given rendition and return the raw bytes.
    async fn export_document(&self, document_id: &str, mime_type: &str) -> Result<Vec<u8>>;
}
