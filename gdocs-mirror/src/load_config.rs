/// `load_config` module: loads the YAML run configuration into strongly typed structs.
///
/// This is the only place where the user-supplied YAML is parsed. It yields
/// the credential file locations, the Drive API base URL and the list of
/// [`SyncRoot`]s handed to the core crate.
///
/// # Accepted schema
/// ```yaml
/// credentials:
///   client_secrets: ./credentials.json
///   token_file: ./token.json
/// api_base_url: https://www.googleapis.com   # optional
/// roots:
///   - folder_id: "1AbC..."
///     download_path: /srv/mkdocs/docs
/// ```
///
/// # Errors
/// All errors use `anyhow::Error` and name the offending file.
use anyhow::Result;
use gdocs_mirror_core::config::{MirrorConfig, SyncRoot};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

pub const DEFAULT_API_BASE_URL: &str = "https://www.googleapis.com";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CredentialsSection {
    /// OAuth client secrets downloaded from the cloud console.
    pub client_secrets: PathBuf,
    /// Cached authorized-user token; created on first run.
    pub token_file: PathBuf,
}

#[derive(Debug, Clone)]
pub struct CliConfig {
    pub credentials: CredentialsSection,
    pub api_base_url: String,
    pub mirror: MirrorConfig,
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CliConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => content,
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    #[derive(Debug, Deserialize)]
    struct RawConfig {
        credentials: CredentialsSection,
        api_base_url: Option<String>,
        /// `roots:` with no entries parses as null.
        roots: Option<Vec<SyncRoot>>,
    }

    let raw: RawConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!(
                "Failed to parse config YAML {:?}: {e}",
                path_ref
            ));
        }
    };

    let roots = raw.roots.unwrap_or_default();
    if let Some(root) = roots.iter().find(|r| r.folder_id.trim().is_empty()) {
        return Err(anyhow::anyhow!(
            "Config {:?} has a root with an empty folder_id (download_path {:?})",
            path_ref,
            root.download_path
        ));
    }

    let config = CliConfig {
        credentials: raw.credentials,
        api_base_url: raw
            .api_base_url
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
        mirror: MirrorConfig { roots },
    };
    config.mirror.trace_loaded();
    Ok(config)
}
