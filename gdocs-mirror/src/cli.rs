//! This module implements the CLI interface for gdocs-mirror: command
//! parsing, wiring the config, credentials and Drive client together, and
//! user-visible output.
//!
//! All tree reading and writing lives in the [`gdocs-mirror-core`] crate.
//! This module is strictly CLI glue.
//!
//! ## How To Use
//! - Command line: `gdocs-mirror sync --config mirror.yaml`
//! - Programmatic/integration use: call [`run`] with a constructed [`Cli`].
//!
//! [`gdocs-mirror-core`]: ../../gdocs-mirror-core/

use crate::drive::DriveClient;
use crate::load_config::load_config;
use crate::oauth::get_or_generate_credentials;
use anyhow::Result;
use clap::{Parser, Subcommand};
use gdocs_mirror_core::synchronise::synchronise;
use std::path::PathBuf;

/// CLI for gdocs-mirror: mirror Google Drive folders as markdown files.
#[derive(Parser)]
#[clap(
    name = "gdocs-mirror",
    version,
    about = "Mirror Google Drive folders of Google Docs onto the local filesystem as markdown"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Mirror every configured root folder into its download path
    Sync {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
    },
    /// Obtain (or refresh) credentials and store them in the token file
    Authorize {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
    },
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("cli_started");

    match cli.command {
        Commands::Sync { config } => {
            let config = load_config(config)?;
            let http = reqwest::Client::new();
            let credentials = get_or_generate_credentials(&http, &config.credentials).await?;
            let drive = DriveClient::new(http, &config.api_base_url, credentials.token)?;

            println!("Synchronise starting...");
            match synchronise(&config.mirror.roots, &drive).await {
                Ok(report) => {
                    tracing::info!(command = "sync", ?report, "Synchronisation complete");
                    println!("Synchronise complete.");
                    for root in &report.roots {
                        println!(
                            "  {} ({}) -> {}: {} folders, {} documents, {} files written",
                            root.folder_name,
                            root.folder_id,
                            root.download_path.display(),
                            root.folders,
                            root.documents,
                            root.files_written
                        );
                    }
                    Ok(())
                }
                Err(e) => {
                    tracing::error!(command = "sync", error = %e, "Synchronisation failed");
                    Err(anyhow::Error::new(e).context("Synchronisation failed"))
                }
            }
        }
        Commands::Authorize { config } => {
            let config = load_config(config)?;
            let http = reqwest::Client::new();
            get_or_generate_credentials(&http, &config.credentials).await?;
            println!(
                "Credentials stored in {}",
                config.credentials.token_file.display()
            );
            Ok(())
        }
    }
}
