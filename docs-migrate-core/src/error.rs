//! Error types shared by the mapper, the collaborator traits and the orchestrators.

use thiserror::Error;

/// A raw page record that cannot be turned into a typed page.
#[derive(Debug, Error)]
pub enum MapError {
    /// The record's `type` is neither `markdown` nor `jsdoc`.
    #[error("Unknown page type {0}")]
    UnknownPageType(String),

    #[error("Malformed {page_type} page {url_id:?}: {reason}")]
    MalformedPage {
        page_type: &'static str,
        url_id: Option<String>,
        reason: String,
    },
}

/// Failure while reading from the legacy source store.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Source request to {path} failed: {reason}")]
    Request { path: String, reason: String },

    #[error("Could not decode source node {path}: {reason}")]
    Decode { path: String, reason: String },
}

/// Failure reported by the destination document store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store request failed: {0}")]
    Request(String),

    #[error("Store rejected the request with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Could not decode store response: {0}")]
    Decode(String),
}

/// Top-level error of a migration or publish run.
#[derive(Debug, Error)]
pub enum MigrateError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Map(#[from] MapError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Could not find {0} package in storage")]
    MissingPackage(String),

    /// Groups before `group` stay committed; nothing is rolled back.
    #[error("Write group {group}/{groups} for version {version} failed after {committed} committed group(s): {source}")]
    WriteGroup {
        version: String,
        group: usize,
        groups: usize,
        committed: usize,
        #[source]
        source: StoreError,
    },

    #[error("max_pages_per_group must be between 1 and 498, got {0}")]
    InvalidGroupSize(usize),

    #[error("Could not serialize record: {0}")]
    Serialize(#[from] serde_json::Error),
}
