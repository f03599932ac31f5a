//! Raw records as they are found in the legacy tree and in publish payloads.
//!
//! Page records stay untyped JSON until [`RawPage::try_from`] checks their `type`
//! tag. The API-reference variant keeps the whole record so it can be stored as
//! an opaque blob.

use serde::Deserialize;
use serde_json::Value;

use crate::error::MapError;
use crate::submodules::DocShape;

/// A node of the legacy `versions` tree.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyVersion {
    pub tag: String,
    pub date: i64,
    #[serde(default)]
    pub prerelease: bool,
    #[serde(default)]
    pub features: Features,
    #[serde(default)]
    pub docs_key: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Features {
    #[serde(default)]
    pub fp: bool,
}

impl LegacyVersion {
    /// Pointer into the `docs` tree. `None` means the version was never documented.
    pub fn docs_key(&self) -> Option<&str> {
        self.docs_key.as_deref().filter(|key| !key.is_empty())
    }
}

/// A single already-prepared version handed to `publish`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionData {
    pub tag: String,
    pub date: i64,
    pub prerelease: bool,
    pub commit: String,
    pub docs_categories: Vec<String>,
    pub docs_pages: Vec<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceKind {
    Function,
    Typedef,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkdownDoc {
    pub url_id: String,
    pub category: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub content: String,
}

/// A generated API-reference entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceDoc {
    pub url_id: String,
    pub category: String,
    pub title: String,
    pub description: String,
    pub kind: Option<ReferenceKind>,
    pub is_fp_fn: bool,
    pub name: String,
    /// The complete source record, including fields not modelled here.
    pub record: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RawPage {
    Markdown(MarkdownDoc),
    Reference(ReferenceDoc),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReferenceFields {
    url_id: String,
    category: String,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    kind: Option<ReferenceKind>,
    #[serde(default, rename = "isFPFn")]
    is_fp_fn: bool,
    content: ReferenceContent,
}

#[derive(Deserialize)]
struct ReferenceContent {
    name: String,
}

impl RawPage {
    pub fn shape(&self) -> DocShape {
        match self {
            RawPage::Markdown(_) => DocShape::Guide,
            RawPage::Reference(doc) => DocShape::Reference {
                kind: doc.kind,
                is_fp_fn: doc.is_fp_fn,
            },
        }
    }
}

impl TryFrom<Value> for RawPage {
    type Error = MapError;

    fn try_from(record: Value) -> Result<Self, Self::Error> {
        let url_id = record
            .get("urlId")
            .and_then(Value::as_str)
            .map(str::to_string);

        let page_type = record.get("type").and_then(Value::as_str).map(str::to_string);

        match page_type.as_deref() {
            Some("markdown") => serde_json::from_value::<MarkdownDoc>(record)
                .map(RawPage::Markdown)
                .map_err(|e| MapError::MalformedPage {
                    page_type: "markdown",
                    url_id,
                    reason: e.to_string(),
                }),
            Some("jsdoc") => {
                let fields = ReferenceFields::deserialize(&record).map_err(|e| {
                    MapError::MalformedPage {
                        page_type: "jsdoc",
                        url_id,
                        reason: e.to_string(),
                    }
                })?;
                Ok(RawPage::Reference(ReferenceDoc {
                    url_id: fields.url_id,
                    category: fields.category,
                    title: fields.title,
                    description: fields.description,
                    kind: fields.kind,
                    is_fp_fn: fields.is_fp_fn,
                    name: fields.content.name,
                    record,
                }))
            }
            Some(other) => Err(MapError::UnknownPageType(other.to_string())),
            None => Err(MapError::UnknownPageType(
                record
                    .get("type")
                    .map(Value::to_string)
                    .unwrap_or_else(|| "undefined".to_string()),
            )),
        }
    }
}

/// Children of a legacy tree node in Realtime Database key order.
///
/// Keys that parse as 32-bit integers come first in numeric order, the rest follow
/// lexicographically. Array-shaped nodes keep their index order and drop `null` holes.
pub fn ordered_children(node: Value) -> Vec<(String, Value)> {
    match node {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .filter(|(_, v)| !v.is_null())
            .map(|(i, v)| (i.to_string(), v))
            .collect(),
        Value::Object(map) => {
            let mut children: Vec<(String, Value)> =
                map.into_iter().filter(|(_, v)| !v.is_null()).collect();
            children.sort_by(|(a, _), (b, _)| match (int_key(a), int_key(b)) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => a.cmp(b),
            });
            children
        }
        _ => Vec::new(),
    }
}

fn int_key(key: &str) -> Option<i32> {
    // "01" and "+1" are plain strings to the database
    if key != "0" && (key.starts_with('0') || key.starts_with('+') || key.starts_with("-0")) {
        return None;
    }
    key.parse::<i32>().ok()
}
