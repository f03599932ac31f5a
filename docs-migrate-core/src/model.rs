//! Normalized records stored in the destination collections.
//!
//! Field names follow the stored document shape (`preRelease`, `createdAt`, ...),
//! so the structs serialize straight into `packages`, `versions` and `pages`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Distribution variant of the library under which a page or version is listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Submodule {
    Default,
    #[serde(rename = "fp")]
    FP,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
    pub name: String,
    #[serde(default)]
    pub versions: Vec<VersionPreview>,
}

/// A package as read back from the store, together with its document id.
///
/// Previews stay raw JSON: entries written by older tooling carry a different
/// shape and must be written back exactly as found.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StoredPackage {
    #[serde(skip)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub versions: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionPreview {
    pub version: String,
    pub pre_release: bool,
    pub created_at: i64,
    #[serde(default)]
    pub submodules: Vec<Submodule>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    pub package: String,
    pub version: String,
    pub pre_release: bool,
    pub created_at: i64,
    pub submodules: Vec<Submodule>,
    pub categories: Vec<String>,
    pub pages: Vec<PagePreview>,
}

impl Version {
    pub fn preview(&self) -> VersionPreview {
        VersionPreview {
            version: self.version.clone(),
            pre_release: self.pre_release,
            created_at: self.created_at,
            submodules: self.submodules.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagePreview {
    pub slug: String,
    pub category: String,
    pub title: String,
    pub summary: String,
    pub submodules: Vec<Submodule>,
}

/// Type-specific payload of a page, stored under the `type` tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PageContent {
    Markdown {
        markdown: String,
    },
    /// API-reference entry written by `publish`. `doc` is the raw record as JSON.
    Jsdoc { name: String, doc: String },
    /// API-reference entry copied by the migration. `doc` is the raw record as JSON.
    Migrated { name: String, doc: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub package: String,
    pub version: String,
    pub slug: String,
    pub category: String,
    pub title: String,
    pub summary: String,
    pub submodules: Vec<Submodule>,
    #[serde(flatten)]
    pub content: PageContent,
}

impl Page {
    pub fn from_preview(
        preview: &PagePreview,
        package: &str,
        version: &str,
        content: PageContent,
    ) -> Self {
        Page {
            package: package.to_string(),
            version: version.to_string(),
            slug: preview.slug.clone(),
            category: preview.category.clone(),
            title: preview.title.clone(),
            summary: preview.summary.clone(),
            submodules: preview.submodules.clone(),
            content,
        }
    }

    pub fn preview(&self) -> PagePreview {
        PagePreview {
            slug: self.slug.clone(),
            category: self.category.clone(),
            title: self.title.clone(),
            summary: self.summary.clone(),
            submodules: self.submodules.clone(),
        }
    }
}
