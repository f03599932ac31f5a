//! Splits a version's records into write groups and commits them in order.
//!
//! The first group carries the version record, the package update (when publishing)
//! and the first chunk of pages, so the version is visible as soon as it commits.
//! Later groups only carry pages. A failing group stops the sequence; groups that
//! already committed stay committed.

use serde_json::{Map, Value};
use tracing::{error, info};

use crate::contract::{Collection, DocumentStore, WriteGroup, WriteOp};
use crate::error::MigrateError;
use crate::mapper::AssembledVersion;
use crate::model::Package;

pub const DEFAULT_MAX_PAGES_PER_GROUP: usize = 200;

/// Firestore accepts at most 500 writes per commit; two are taken by the version
/// record and the package update.
pub const MAX_PAGES_PER_GROUP_LIMIT: usize = 498;

/// New preview list for an existing package.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageUpdate {
    pub package_id: String,
    pub versions: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WriteOutcome {
    pub version_id: String,
    pub groups: usize,
}

pub struct BatchWriter<'a, S: DocumentStore + ?Sized> {
    store: &'a S,
    max_pages_per_group: usize,
}

impl<'a, S: DocumentStore + ?Sized> BatchWriter<'a, S> {
    pub fn new(store: &'a S, max_pages_per_group: usize) -> Result<Self, MigrateError> {
        if !(1..=MAX_PAGES_PER_GROUP_LIMIT).contains(&max_pages_per_group) {
            error!(max_pages_per_group, limit = MAX_PAGES_PER_GROUP_LIMIT, "Invalid write group size");
            return Err(MigrateError::InvalidGroupSize(max_pages_per_group));
        }
        Ok(Self {
            store,
            max_pages_per_group,
        })
    }

    /// Allocates ids and lays out the groups without touching the store.
    pub fn plan(
        &self,
        assembled: &AssembledVersion,
        package_update: Option<&PackageUpdate>,
    ) -> Result<(WriteOutcome, Vec<WriteGroup>), MigrateError> {
        let version_id = self.store.new_id();
        let mut first = WriteGroup::default();
        first.ops.push(WriteOp::Set {
            collection: Collection::Versions,
            id: version_id.clone(),
            document: serde_json::to_value(&assembled.version)?,
        });
        if let Some(update) = package_update {
            let mut fields = Map::new();
            fields.insert("versions".into(), Value::Array(update.versions.clone()));
            first.ops.push(WriteOp::Update {
                collection: Collection::Packages,
                id: update.package_id.clone(),
                fields,
            });
        }

        let mut groups = vec![first];
        for (index, chunk) in assembled.pages.chunks(self.max_pages_per_group).enumerate() {
            let mut ops = Vec::with_capacity(chunk.len());
            for page in chunk {
                ops.push(WriteOp::Set {
                    collection: Collection::Pages,
                    id: self.store.new_id(),
                    document: serde_json::to_value(page)?,
                });
            }
            if index == 0 {
                groups[0].ops.extend(ops);
            } else {
                groups.push(WriteGroup { ops });
            }
        }

        let outcome = WriteOutcome {
            version_id,
            groups: groups.len(),
        };
        Ok((outcome, groups))
    }

    pub async fn write_version(
        &self,
        assembled: &AssembledVersion,
        package_update: Option<&PackageUpdate>,
    ) -> Result<WriteOutcome, MigrateError> {
        let tag = &assembled.version.version;
        let (outcome, groups) = self.plan(assembled, package_update)?;
        let total = groups.len();

        for (index, group) in groups.into_iter().enumerate() {
            let ops = group.len();
            if let Err(source) = self.store.commit(group).await {
                error!(
                    version = %tag,
                    group = index + 1,
                    groups = total,
                    committed = index,
                    error = %source,
                    "Write group failed; earlier groups stay committed"
                );
                return Err(MigrateError::WriteGroup {
                    version: tag.clone(),
                    group: index + 1,
                    groups: total,
                    committed: index,
                    source,
                });
            }
            info!(version = %tag, group = index + 1, groups = total, ops, "Committed write group");
        }

        Ok(outcome)
    }

    /// Creates a new package record in its own group and returns its id.
    pub async fn create_package(&self, package: &Package) -> Result<String, MigrateError> {
        let id = self.store.new_id();
        let group = WriteGroup {
            ops: vec![WriteOp::Set {
                collection: Collection::Packages,
                id: id.clone(),
                document: serde_json::to_value(package)?,
            }],
        };
        self.store.commit(group).await?;
        info!(package = %package.name, id = %id, versions = package.versions.len(), "Created package");
        Ok(id)
    }
}
