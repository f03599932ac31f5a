//! Turns raw page records into `(PagePreview, Page)` pairs and assembles versions.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::error::MapError;
use crate::model::{Page, PageContent, PagePreview, Version};
use crate::source::RawPage;
use crate::submodules::{page_submodules, version_submodules};

/// Which entry point produced a record. Decides the stored API-reference type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOrigin {
    Migrated,
    Published,
}

/// Version metadata shared by the legacy tree and publish payloads.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionMeta {
    pub tag: String,
    pub pre_release: bool,
    pub created_at: i64,
    pub fp_available: bool,
}

/// A version ready to be written: the record plus its pages in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledVersion {
    pub version: Version,
    pub pages: Vec<Page>,
}

fn whitespace() -> &'static Regex {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    // ECMAScript whitespace: U+0085 is excluded, U+FEFF is included
    WHITESPACE.get_or_init(|| {
        Regex::new(
            r"[\t\n\x0B\x0C\r \x{00A0}\x{1680}\x{2000}-\x{200A}\x{2028}\x{2029}\x{202F}\x{205F}\x{3000}\x{FEFF}]",
        )
        .expect("whitespace pattern is valid")
    })
}

/// Every whitespace character becomes one hyphen, matching slugs of existing pages.
pub fn guide_slug(url_id: &str) -> String {
    whitespace().replace_all(url_id, "-").into_owned()
}

/// Like [`guide_slug`], minus one leading `fp/` segment.
pub fn reference_slug(url_id: &str) -> String {
    let slug = guide_slug(url_id);
    match slug.strip_prefix("fp/") {
        Some(rest) => rest.to_string(),
        None => slug,
    }
}

pub fn map_page(
    package: &str,
    version_tag: &str,
    fp_available: bool,
    raw: RawPage,
    origin: RecordOrigin,
) -> Result<(PagePreview, Page), MapError> {
    let submodules = page_submodules(fp_available, raw.shape());

    let (preview, content) = match raw {
        RawPage::Markdown(doc) => (
            PagePreview {
                slug: guide_slug(&doc.url_id),
                category: doc.category,
                title: doc.title,
                summary: doc.description,
                submodules,
            },
            PageContent::Markdown {
                markdown: doc.content,
            },
        ),
        RawPage::Reference(doc) => {
            let blob = serde_json::to_string(&doc.record).map_err(|e| MapError::MalformedPage {
                page_type: "jsdoc",
                url_id: Some(doc.url_id.clone()),
                reason: e.to_string(),
            })?;
            let content = match origin {
                RecordOrigin::Migrated => PageContent::Migrated {
                    name: doc.name,
                    doc: blob,
                },
                RecordOrigin::Published => PageContent::Jsdoc {
                    name: doc.name,
                    doc: blob,
                },
            };
            (
                PagePreview {
                    slug: reference_slug(&doc.url_id),
                    category: doc.category,
                    title: doc.title,
                    summary: doc.description,
                    submodules,
                },
                content,
            )
        }
    };

    let page = Page::from_preview(&preview, package, version_tag, content);
    Ok((preview, page))
}

/// Builds the version record and its pages. Fails on the first record that does
/// not convert; a partially mapped version is never returned.
pub fn assemble_version(
    package: &str,
    meta: VersionMeta,
    categories: Vec<String>,
    raw_pages: Vec<Value>,
    origin: RecordOrigin,
) -> Result<AssembledVersion, MapError> {
    let mut previews = Vec::with_capacity(raw_pages.len());
    let mut pages = Vec::with_capacity(raw_pages.len());

    for record in raw_pages {
        let raw = RawPage::try_from(record)?;
        let (preview, page) = map_page(package, &meta.tag, meta.fp_available, raw, origin)?;
        debug!(version = %meta.tag, slug = %preview.slug, "Mapped page");
        previews.push(preview);
        pages.push(page);
    }

    let version = Version {
        package: package.to_string(),
        version: meta.tag,
        pre_release: meta.pre_release,
        created_at: meta.created_at,
        submodules: version_submodules(meta.fp_available),
        categories,
        pages: previews,
    };

    Ok(AssembledVersion { version, pages })
}
