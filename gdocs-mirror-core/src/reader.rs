//! Remote Tree Reader: materializes a fully populated [`Folder`] from a
//! remote folder id.
//!
//! Per folder the reader issues one name lookup, one listing call per page
//! of child documents, one export per document (after its metadata fields
//! are checked), one listing call per page of
//! child folders, then recurses into each child folder. Calls are awaited one
//! at a time and the listing order is kept as returned.

use std::future::Future;

use futures::future::BoxFuture;
use tracing::{debug, info};

use crate::contract::{DriveApi, ListPage, RemoteDocument, EXPORT_MIME_TYPE};
use crate::error::{Result, SyncError};
use crate::model::{Document, Folder, LastModifyingUser};

pub struct TreeReader<'a, A: DriveApi + ?Sized> {
    api: &'a A,
}

impl<'a, A: DriveApi + ?Sized> TreeReader<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }

    /// Read `folder_id` and everything beneath it.
    ///
    /// Fails on the first remote error; nothing is retried.
    pub fn read_folder<'b>(&'b self, folder_id: &'b str) -> BoxFuture<'b, Result<Folder>> {
        Box::pin(async move {
            if folder_id.trim().is_empty() {
                return Err(SyncError::InvalidInput(
                    "folder id must not be empty".to_string(),
                ));
            }

            let name = self.api.get_folder_name(folder_id).await?;
            debug!(folder_id, folder_name = %name, "Resolved folder name");

            let listed = collect_pages(|token| self.api.list_documents(folder_id, token)).await?;
            let mut documents = Vec::with_capacity(listed.len());
            for remote in listed {
                info!(folder_id, document_id = %remote.id, document_name = %remote.name, "Found document");
                let mut document = into_document(remote)?;
                document.content = self
                    .api
                    .export_document(&document.id, EXPORT_MIME_TYPE)
                    .await?;
                documents.push(document);
            }

            let listed = collect_pages(|token| self.api.list_folders(folder_id, token)).await?;
            let mut subfolders = Vec::with_capacity(listed.len());
            for remote in listed {
                info!(folder_id, subfolder_id = %remote.id, subfolder_name = %remote.name, "Found subfolder");
                subfolders.push(self.read_folder(&remote.id).await?);
            }

            Ok(Folder::new(folder_id, name, documents, subfolders))
        })
    }
}

/// Fetch pages until the service stops returning a continuation token,
/// concatenating entries in page order.
pub async fn collect_pages<T, F, Fut>(mut fetch: F) -> Result<Vec<T>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<ListPage<T>>>,
{
    let mut items = Vec::new();
    let mut token = None;
    loop {
        let page = fetch(token.take()).await?;
        items.extend(page.files);
        match page.next_page_token {
            Some(next) if !next.is_empty() => token = Some(next),
            _ => return Ok(items),
        }
    }
}

/// Build a [`Document`] without content from a listing entry, requiring the
/// fields the metadata header needs. Checked before the export request.
fn into_document(remote: RemoteDocument) -> Result<Document> {
    let modified_time = remote.modified_time.ok_or_else(|| SyncError::MissingField {
        document_id: remote.id.clone(),
        field: "modifiedTime",
    })?;
    let display_name = remote
        .last_modifying_user
        .and_then(|user| user.display_name)
        .ok_or_else(|| SyncError::MissingField {
            document_id: remote.id.clone(),
            field: "lastModifyingUser.displayName",
        })?;

    Ok(Document::new(
        remote.id,
        remote.name,
        remote.description,
        modified_time,
        LastModifyingUser::new(display_name),
        Vec::new(),
    ))
}
