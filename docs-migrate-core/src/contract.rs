//! # contract: interfaces to the two external stores
//!
//! The migration reads from a legacy tree store through [`SourceReader`] and writes
//! into a document store through [`DocumentStore`]. Both are async traits so the CLI
//! crate can provide REST clients while tests use `mockall` mocks or in-memory fakes.
//!
//! ## Mocking & Testing
//! - Both traits are annotated for `mockall`; the mocks are exported with the
//!   `test-export-mocks` feature so integration tests of other crates can use them.
//!
//! ## Write groups
//! - A [`WriteGroup`] is committed all-or-nothing by the store. Nothing spans groups.

use async_trait::async_trait;
use mockall::automock;
use serde_json::{Map, Value};

use crate::error::{SourceError, StoreError};
use crate::model::StoredPackage;
use crate::source::LegacyVersion;

/// Destination collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Packages,
    Versions,
    Pages,
}

impl Collection {
    pub fn id(&self) -> &'static str {
        match self {
            Collection::Packages => "packages",
            Collection::Versions => "versions",
            Collection::Pages => "pages",
        }
    }
}

/// A single mutation inside a write group.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    /// Create or overwrite the whole document.
    Set {
        collection: Collection,
        id: String,
        document: Value,
    },
    /// Overwrite only the given top-level fields of an existing document.
    Update {
        collection: Collection,
        id: String,
        fields: Map<String, Value>,
    },
}

impl WriteOp {
    pub fn collection(&self) -> Collection {
        match self {
            WriteOp::Set { collection, .. } | WriteOp::Update { collection, .. } => *collection,
        }
    }
}

/// Mutations committed atomically, in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteGroup {
    pub ops: Vec<WriteOp>,
}

impl WriteGroup {
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// Read-only access to the legacy tree.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait SourceReader: Send + Sync {
    /// All nodes under `versions`, in key order.
    async fn list_versions(&self) -> Result<Vec<LegacyVersion>, SourceError>;

    /// `docs/{docs_key}/categories`.
    async fn categories(&self, docs_key: &str) -> Result<Vec<String>, SourceError>;

    /// Raw page records under `docs/{docs_key}/pages`, in key order.
    async fn pages(&self, docs_key: &str) -> Result<Vec<Value>, SourceError>;
}

/// Document store with atomic write groups.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// A fresh document id. Never reused.
    fn new_id(&self) -> String;

    /// The package whose `name` equals `name` exactly.
    async fn find_package(&self, name: &str) -> Result<Option<StoredPackage>, StoreError>;

    /// Commit all operations of `group` or none of them.
    async fn commit(&self, group: WriteGroup) -> Result<(), StoreError>;
}
