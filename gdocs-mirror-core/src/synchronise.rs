//! High-level pipeline: read each configured remote folder, then write it out.
//!
//! For every [`SyncRoot`], in configuration order:
//!   - the [`TreeReader`] builds the complete in-memory tree
//!   - the [`write_folder`] pass materializes it under the root's
//!     `download_path`
//!   - a [`RootReport`] is appended to the returned [`SynchroniseReport`]
//!
//! # Error Handling
//! Fail-fast: the first read or write error is returned and later roots are
//! not processed. Files already written by earlier roots stay on disk.

use std::path::PathBuf;

use tracing::{error, info};

use crate::config::SyncRoot;
use crate::contract::DriveApi;
use crate::error::Result;
use crate::reader::TreeReader;
use crate::writer::write_folder;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SynchroniseReport {
    pub roots: Vec<RootReport>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootReport {
    pub folder_id: String,
    pub folder_name: String,
    pub download_path: PathBuf,
    /// Remote folders visited, the root included.
    pub folders: usize,
    /// Remote documents exported.
    pub documents: usize,
    pub files_written: usize,
}

pub async fn synchronise<A>(roots: &[SyncRoot], api: &A) -> Result<SynchroniseReport>
where
    A: DriveApi + ?Sized,
{
    info!(roots = roots.len(), "[SYNC] Starting synchronisation");
    let mut report = SynchroniseReport::default();

    for root in roots {
        match mirror_root(root, api).await {
            Ok(root_report) => report.roots.push(root_report),
            Err(e) => {
                error!(folder_id = %root.folder_id, error = %e, "[SYNC][ERROR] Synchronisation failed");
                return Err(e);
            }
        }
    }

    info!(roots = report.roots.len(), "[SYNC] Synchronisation complete");
    Ok(report)
}

/// Read and write a single root.
pub async fn mirror_root<A>(root: &SyncRoot, api: &A) -> Result<RootReport>
where
    A: DriveApi + ?Sized,
{
    info!(folder_id = %root.folder_id, "[SYNC] Parsing folder");
    let folder = TreeReader::new(api).read_folder(&root.folder_id).await?;

    info!(
        folder_id = %root.folder_id,
        download_path = %root.download_path.display(),
        documents = folder.total_documents(),
        "[SYNC] Downloading files locally"
    );
    let stats = write_folder(&folder, &root.download_path)?;

    Ok(RootReport {
        folder_id: folder.id.clone(),
        folder_name: folder.name.clone(),
        download_path: root.download_path.clone(),
        folders: folder.total_folders(),
        documents: folder.total_documents(),
        files_written: stats.files_written,
    })
}
