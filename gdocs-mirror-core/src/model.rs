//! In-memory tree built by the reader and consumed by the writer.

use crate::error::{Result, SyncError};

/// Strip ASCII punctuation from a display name so it can be used as a path
/// component. Every other character, including non-ASCII and whitespace, is
/// kept in order.
pub fn safe_name(display_name: &str) -> String {
    display_name
        .chars()
        .filter(|c| !c.is_ascii_punctuation())
        .collect()
}

/// Safe name of `display_name`, rejected when it cannot name a file.
pub fn checked_safe_name(display_name: &str) -> Result<String> {
    let name = safe_name(display_name);
    if name.is_empty() || is_reserved(&name) {
        return Err(SyncError::InvalidPath {
            display_name: display_name.to_string(),
            name,
        });
    }
    Ok(name)
}

#[cfg(windows)]
fn is_reserved(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7",
        "COM8", "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    let stem = name.trim_end();
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(stem))
}

#[cfg(not(windows))]
fn is_reserved(_name: &str) -> bool {
    false
}

/// The user who last modified a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastModifyingUser {
    pub display_name: String,
}

impl LastModifyingUser {
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
        }
    }

    /// Everything before the first space. Empty for an empty display name.
    pub fn first_name(&self) -> &str {
        self.display_name.split(' ').next().unwrap_or_default()
    }
}

/// A document with its exported content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    /// Service-native timestamp, written out verbatim.
    pub modified_time: String,
    pub last_modifying_user: LastModifyingUser,
    pub content: Vec<u8>,
}

impl Document {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: Option<String>,
        modified_time: impl Into<String>,
        last_modifying_user: LastModifyingUser,
        content: Vec<u8>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description,
            modified_time: modified_time.into(),
            last_modifying_user,
            content,
        }
    }

    /// `<safe name>.md`, or `InvalidPath` if the safe name is unusable.
    pub fn file_name(&self) -> Result<String> {
        Ok(format!("{}.md", checked_safe_name(&self.name)?))
    }

    /// The frontmatter block written before the exported content. The title
    /// is the raw display name, not the safe name.
    pub fn metadata_header(&self) -> String {
        format!(
            "---\ntitle: {}\ndescription: {}\nupdated: {}\nlastModifyingUser: {}\n---\n\n",
            self.name,
            self.description.as_deref().unwrap_or_default(),
            self.modified_time,
            self.last_modifying_user.first_name(),
        )
    }

    /// Full file content: header bytes followed by the exported bytes.
    pub fn rendered(&self) -> Vec<u8> {
        let header = self.metadata_header();
        let mut bytes = Vec::with_capacity(header.len() + self.content.len());
        bytes.extend_from_slice(header.as_bytes());
        bytes.extend_from_slice(&self.content);
        bytes
    }
}

/// A folder and everything beneath it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Folder {
    pub id: String,
    pub name: String,
    pub documents: Vec<Document>,
    pub subfolders: Vec<Folder>,
}

impl Folder {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        documents: Vec<Document>,
        subfolders: Vec<Folder>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            documents,
            subfolders,
        }
    }

    /// Documents in this folder and all descendants.
    pub fn total_documents(&self) -> usize {
        self.documents.len()
            + self
                .subfolders
                .iter()
                .map(Folder::total_documents)
                .sum::<usize>()
    }

    /// This folder plus all descendant folders.
    pub fn total_folders(&self) -> usize {
        1 + self
            .subfolders
            .iter()
            .map(Folder::total_folders)
            .sum::<usize>()
    }
}
