///
/// This module implements the CLI interface for docs-migrate: command parsing, loading
/// configuration, constructing the store clients and invoking the core orchestrators.
///
/// All mapping and write-group logic lives in the [`docs-migrate-core`] crate.
/// This module is strictly CLI glue.
///
/// ## Commands
/// - `migrate`: copy every documented legacy version into Firestore and create the package.
/// - `publish`: append one prepared version (JSON file) to the existing package.
///
/// Configuration errors are raised before any network I/O.
///
/// [`docs-migrate-core`]: ../../docs-migrate-core/
use crate::credentials::fetch_access_token;
use crate::firestore::FirestoreClient;
use crate::load_config::load_config;
use crate::rtdb::RtdbReader;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use docs_migrate_core::migrate::migrate;
use docs_migrate_core::publish::publish_version;
use docs_migrate_core::source::VersionData;
use std::path::PathBuf;

/// CLI for docs-migrate: move documentation into Firestore.
#[derive(Parser)]
#[clap(
    name = "docs-migrate",
    version,
    about = "Migrate documentation versions from the legacy Realtime Database to Firestore and publish new ones"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Migrate every documented legacy version, then create the package record
    Migrate {
        /// Optional YAML config file (package name, group size, endpoint)
        #[clap(long)]
        config: Option<PathBuf>,
    },
    /// Publish one prepared version and append it to the package's version list
    Publish {
        /// JSON file with tag, date, prerelease, commit, docsCategories and docsPages
        #[clap(long)]
        version_file: PathBuf,
        /// Optional YAML config file (package name, group size, endpoint)
        #[clap(long)]
        config: Option<PathBuf>,
    },
}

pub fn read_version_file(path: &std::path::Path) -> Result<VersionData> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read version file {:?}", path))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Version file {:?} is not a valid version payload", path))
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    // Emit a top-level 'trace_initialised' event at the very start
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Migrate { config } => {
            let config = load_config(config.as_deref())?;
            let database_url = config.database_url()?.to_string();
            tracing::info!(command = "migrate", "Starting migration");

            let http = reqwest::Client::new();
            let token = fetch_access_token(&http, &config.service_account).await?;
            let reader = RtdbReader::with_token(http.clone(), &database_url, token.clone());
            let store = FirestoreClient::with_token(
                http,
                &config.firestore_endpoint,
                &config.service_account.project_id,
                token,
            );

            let result = migrate(&config.run, &reader, &store).await;
            reader.close();
            store.close();

            match result {
                Ok(report) => {
                    tracing::info!(command = "migrate", ?report, "Migration complete");
                    Ok(())
                }
                Err(e) => {
                    tracing::error!(command = "migrate", error = %e, "Migration failed");
                    Err(anyhow::Error::new(e))
                }
            }
        }
        Commands::Publish {
            version_file,
            config,
        } => {
            let config = load_config(config.as_deref())?;
            let data = read_version_file(&version_file)?;
            tracing::info!(command = "publish", version = %data.tag, "Starting publish");

            let store = FirestoreClient::connect(&config).await?;
            let result = publish_version(&config.run, &store, data).await;
            store.close();

            match result {
                Ok(report) => {
                    tracing::info!(command = "publish", ?report, "Publish complete");
                    Ok(())
                }
                Err(e) => {
                    tracing::error!(command = "publish", error = %e, "Publish failed");
                    Err(anyhow::Error::new(e))
                }
            }
        }
    }
}
