use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info};

/// One remote folder to mirror and the local directory to mirror it under.
///
/// The folder itself becomes a subdirectory of `download_path`, named after
/// its safe name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncRoot {
    pub folder_id: String,
    pub download_path: PathBuf,
}

impl SyncRoot {
    pub fn new(folder_id: impl Into<String>, download_path: impl Into<PathBuf>) -> Self {
        Self {
            folder_id: folder_id.into(),
            download_path: download_path.into(),
        }
    }
}

/// Everything a mirror run needs besides the transport.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MirrorConfig {
    #[serde(default)]
    pub roots: Vec<SyncRoot>,
}

impl MirrorConfig {
    pub fn trace_loaded(&self) {
        info!(roots_count = self.roots.len(), "Loaded MirrorConfig");
        debug!(?self, "MirrorConfig loaded (full debug)");
    }
}
