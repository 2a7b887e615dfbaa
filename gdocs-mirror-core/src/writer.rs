//! Local Tree Writer: recreates a [`Folder`] subtree under a local directory,
//! one markdown file per document.
//!
//! Directories are created lazily with `create_dir_all` when the first file
//! beneath them is written, so a branch without documents leaves nothing on
//! disk while a document-less folder above a populated one is created as an
//! ancestor. Existing files are overwritten.

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{Result, SyncError};
use crate::model::{checked_safe_name, Folder};

/// What a write pass did on disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteStats {
    /// Directories of document-holding folders that did not exist before
    /// this pass. Ancestors created along the way are not counted.
    pub directories_created: usize,
    pub files_written: usize,
}

impl WriteStats {
    fn absorb(&mut self, other: WriteStats) {
        self.directories_created += other.directories_created;
        self.files_written += other.files_written;
    }
}

/// Write `folder` to `parent_path / folder.safe_name`, recursing into
/// subfolders.
pub fn write_folder(folder: &Folder, parent_path: &Path) -> Result<WriteStats> {
    let mut stats = WriteStats::default();

    if folder.total_documents() == 0 {
        debug!(folder_id = %folder.id, folder_name = %folder.name, "Skipping folder without documents");
        return Ok(stats);
    }

    let target = parent_path.join(checked_safe_name(&folder.name)?);

    if !folder.documents.is_empty() {
        if !target.is_dir() {
            fs::create_dir_all(&target).map_err(|e| SyncError::io(&target, e))?;
            stats.directories_created += 1;
            debug!(path = %target.display(), "Created folder directory");
        }

        for document in &folder.documents {
            let path = target.join(document.file_name()?);
            info!(document_id = %document.id, path = %path.display(), "Writing document");
            fs::write(&path, document.rendered()).map_err(|e| SyncError::io(&path, e))?;
            stats.files_written += 1;
        }
    }

    for subfolder in &folder.subfolders {
        stats.absorb(write_folder(subfolder, &target)?);
    }

    Ok(stats)
}
