//! Error taxonomy shared by the reader, the writer and every `DriveApi`
//! implementation.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SyncError>;

#[derive(Debug, Error)]
pub enum SyncError {
    /// The remote resource does not exist (or is invisible to the caller).
    #[error("remote resource not found: {0}")]
    NotFound(String),

    /// The credentials lack permission to read the resource.
    #[error("access denied: {0}")]
    AccessDenied(String),

    /// Network faults, 5xx responses and undecodable payloads.
    #[error("remote service error: {0}")]
    TransientService(String),

    /// A listed document lacks a field the metadata header needs.
    #[error("document {document_id} is missing required field `{field}`")]
    MissingField {
        document_id: String,
        field: &'static str,
    },

    #[error("invalid path component {name:?} derived from {display_name:?}")]
    InvalidPath { display_name: String, name: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SyncError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SyncError::Io {
            path: path.into(),
            source,
        }
    }
}
