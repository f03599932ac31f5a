#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use docs_migrate_core::contract::{Collection, DocumentStore, WriteGroup, WriteOp};
use docs_migrate_core::error::StoreError;
use docs_migrate_core::model::StoredPackage;
use serde_json::{json, Value};

/// In-memory store that records committed groups and can reject one commit attempt.
#[derive(Default)]
pub struct RecordingStore {
    next_id: AtomicUsize,
    attempts: AtomicUsize,
    fail_on_attempt: Option<usize>,
    pub committed: Mutex<Vec<WriteGroup>>,
    pub packages: Mutex<Vec<StoredPackage>>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects the `attempt`-th commit (1-based); every other commit succeeds.
    pub fn failing_on(attempt: usize) -> Self {
        Self {
            fail_on_attempt: Some(attempt),
            ..Self::default()
        }
    }

    pub fn with_package(self, package: StoredPackage) -> Self {
        self.packages.lock().unwrap().push(package);
        self
    }

    pub fn groups(&self) -> Vec<WriteGroup> {
        self.committed.lock().unwrap().clone()
    }

    /// Documents set in `collection`, across all committed groups, in commit order.
    pub fn documents(&self, collection: Collection) -> Vec<Value> {
        self.groups()
            .into_iter()
            .flat_map(|g| g.ops)
            .filter_map(|op| match op {
                WriteOp::Set {
                    collection: c,
                    document,
                    ..
                } if c == collection => Some(document),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl DocumentStore for RecordingStore {
    fn new_id(&self) -> String {
        format!("id-{:04}", self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    async fn find_package(&self, name: &str) -> Result<Option<StoredPackage>, StoreError> {
        Ok(self
            .packages
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.name == name)
            .cloned())
    }

    async fn commit(&self, group: WriteGroup) -> Result<(), StoreError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on_attempt == Some(attempt) {
            return Err(StoreError::Rejected {
                status: 500,
                body: format!("attempt {attempt} rejected"),
            });
        }
        self.committed.lock().unwrap().push(group);
        Ok(())
    }
}

pub fn markdown_page(url_id: &str, title: &str) -> Value {
    json!({
        "type": "markdown",
        "urlId": url_id,
        "category": "General",
        "title": title,
        "description": format!("{title} guide"),
        "content": format!("# {title}"),
    })
}

pub fn function_page(url_id: &str, name: &str, is_fp_fn: bool) -> Value {
    json!({
        "type": "jsdoc",
        "kind": "function",
        "isFPFn": is_fp_fn,
        "urlId": url_id,
        "category": "Common Helpers",
        "title": name,
        "description": format!("{name} summary"),
        "content": { "name": name },
    })
}

pub fn typedef_page(url_id: &str, name: &str) -> Value {
    json!({
        "type": "jsdoc",
        "kind": "typedef",
        "isFPFn": false,
        "urlId": url_id,
        "category": "Types",
        "title": name,
        "description": format!("{name} type"),
        "content": { "name": name },
    })
}
