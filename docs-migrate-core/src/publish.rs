//! Appends one prepared version to an existing package.

use tracing::{error, info};

use crate::config::RunConfig;
use crate::contract::DocumentStore;
use crate::error::MigrateError;
use crate::mapper::{assemble_version, RecordOrigin, VersionMeta};
use crate::source::VersionData;
use crate::writer::{BatchWriter, PackageUpdate};

#[derive(Debug, Clone, PartialEq)]
pub struct PublishReport {
    pub package_id: String,
    pub version_id: String,
    pub pages: usize,
    pub groups: usize,
}

/// Published versions always ship the FP submodule.
pub async fn publish_version<S>(
    config: &RunConfig,
    store: &S,
    data: VersionData,
) -> Result<PublishReport, MigrateError>
where
    S: DocumentStore + ?Sized,
{
    info!(version = %data.tag, commit = %data.commit, pages = data.docs_pages.len(), "[PUBLISH] Publishing version");

    let meta = VersionMeta {
        tag: data.tag,
        pre_release: data.prerelease,
        created_at: data.date,
        fp_available: true,
    };
    let assembled = assemble_version(
        &config.package_name,
        meta,
        data.docs_categories,
        data.docs_pages,
        RecordOrigin::Published,
    )?;

    let writer = BatchWriter::new(store, config.max_pages_per_group)?;
    let stored = match store.find_package(&config.package_name).await? {
        Some(stored) => stored,
        None => {
            error!(package = %config.package_name, "[PUBLISH][ERROR] Package record not found");
            return Err(MigrateError::MissingPackage(config.package_name.clone()));
        }
    };

    let mut versions = stored.versions;
    versions.push(serde_json::to_value(assembled.version.preview())?);
    let update = PackageUpdate {
        package_id: stored.id.clone(),
        versions,
    };

    let outcome = writer.write_version(&assembled, Some(&update)).await?;

    info!(
        version = %assembled.version.version,
        version_id = %outcome.version_id,
        groups = outcome.groups,
        "[PUBLISH] Version published"
    );

    Ok(PublishReport {
        package_id: stored.id,
        version_id: outcome.version_id,
        pages: assembled.pages.len(),
        groups: outcome.groups,
    })
}
