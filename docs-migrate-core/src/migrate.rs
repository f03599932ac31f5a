//! Full migration: legacy tree → `versions`, `pages` and one `packages` record.
//!
//! Versions are consumed one at a time from an ordered queue. A version's reads,
//! mapping and every write group finish before the next version is dequeued, so
//! the destination only ever holds whole versions plus at most one partially
//! written one. The package record is created last, with the previews of every
//! migrated version in migration order.
//!
//! Any error stops the run. Nothing already written is undone.

use std::collections::VecDeque;

use tracing::{error, info};

use crate::config::RunConfig;
use crate::contract::{DocumentStore, SourceReader};
use crate::error::MigrateError;
use crate::mapper::{assemble_version, RecordOrigin, VersionMeta};
use crate::model::Package;
use crate::source::LegacyVersion;
use crate::writer::BatchWriter;

#[derive(Debug, Clone, PartialEq)]
pub struct MigrationReport {
    pub package_id: String,
    pub versions: Vec<VersionReport>,
    /// Tags of versions skipped for lacking a docs pointer.
    pub skipped: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VersionReport {
    pub tag: String,
    pub version_id: String,
    pub pages: usize,
    pub groups: usize,
}

pub async fn migrate<R, S>(
    config: &RunConfig,
    reader: &R,
    store: &S,
) -> Result<MigrationReport, MigrateError>
where
    R: SourceReader + ?Sized,
    S: DocumentStore + ?Sized,
{
    info!(package = %config.package_name, "[MIGRATE] Starting migration");
    let writer = BatchWriter::new(store, config.max_pages_per_group)?;

    let legacy_versions = reader.list_versions().await.map_err(|e| {
        error!(error = %e, "[MIGRATE][ERROR] Failed to list legacy versions");
        e
    })?;

    let mut skipped = Vec::new();
    let mut queue: VecDeque<(String, LegacyVersion)> = VecDeque::new();
    for legacy in legacy_versions {
        match legacy.docs_key() {
            Some(key) => queue.push_back((key.to_string(), legacy)),
            None => {
                info!(version = %legacy.tag, "[MIGRATE] Skipping version without docs");
                skipped.push(legacy.tag);
            }
        }
    }
    info!(
        queued = queue.len(),
        skipped = skipped.len(),
        "[MIGRATE] Versions queued"
    );

    let mut previews = Vec::with_capacity(queue.len());
    let mut reports = Vec::with_capacity(queue.len());

    while let Some((docs_key, legacy)) = queue.pop_front() {
        info!(version = %legacy.tag, docs_key = %docs_key, "Migrating {}...", legacy.tag);

        let categories = reader.categories(&docs_key).await?;
        let raw_pages = reader.pages(&docs_key).await?;

        let meta = VersionMeta {
            tag: legacy.tag,
            pre_release: legacy.prerelease,
            created_at: legacy.date,
            fp_available: legacy.features.fp,
        };
        let assembled = assemble_version(
            &config.package_name,
            meta,
            categories,
            raw_pages,
            RecordOrigin::Migrated,
        )
        .map_err(|e| {
            error!(docs_key = %docs_key, error = %e, "[MIGRATE][ERROR] Could not map pages");
            e
        })?;

        let outcome = writer.write_version(&assembled, None).await?;
        info!(
            version = %assembled.version.version,
            version_id = %outcome.version_id,
            pages = assembled.pages.len(),
            groups = outcome.groups,
            "[MIGRATE] Version migrated"
        );

        previews.push(assembled.version.preview());
        reports.push(VersionReport {
            tag: assembled.version.version,
            version_id: outcome.version_id,
            pages: assembled.pages.len(),
            groups: outcome.groups,
        });
    }

    let package = Package {
        name: config.package_name.clone(),
        versions: previews,
    };
    let package_id = writer.create_package(&package).await?;

    info!(
        package_id = %package_id,
        versions = reports.len(),
        "(ﾉ◕ヮ◕)ﾉ*:·ﾟ✧ Done!"
    );

    Ok(MigrationReport {
        package_id,
        versions: reports,
        skipped,
    })
}
