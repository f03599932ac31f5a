//! Realtime Database REST reader: implements the core `SourceReader`.

use async_trait::async_trait;
use docs_migrate_core::contract::SourceReader;
use docs_migrate_core::error::SourceError;
use docs_migrate_core::source::{ordered_children, LegacyVersion};
use serde_json::Value;

pub struct RtdbReader {
    http: reqwest::Client,
    database_url: String,
    access_token: String,
}

impl RtdbReader {
    pub fn with_token(http: reqwest::Client, database_url: &str, access_token: String) -> Self {
        Self {
            http,
            database_url: database_url.trim_end_matches('/').to_string(),
            access_token,
        }
    }

    pub fn close(self) {
        tracing::info!(database_url = %self.database_url, "Closed legacy database reader");
    }

    pub fn node_url(&self, path: &str) -> String {
        format!("{}/{}.json", self.database_url, path.trim_matches('/'))
    }

    async fn get(&self, path: &str) -> Result<Value, SourceError> {
        let url = self.node_url(path);
        tracing::debug!(path, "Fetching legacy node");
        let response = self
            .http
            .get(&url)
            .query(&[("access_token", self.access_token.as_str())])
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = ?e, path, "Legacy database request failed");
                SourceError::Request {
                    path: path.to_string(),
                    reason: e.to_string(),
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, path, body = %body, "Legacy database rejected request");
            return Err(SourceError::Request {
                path: path.to_string(),
                reason: format!("status {status}: {body}"),
            });
        }

        response.json().await.map_err(|e| SourceError::Decode {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl SourceReader for RtdbReader {
    async fn list_versions(&self) -> Result<Vec<LegacyVersion>, SourceError> {
        let node = self.get("versions").await?;
        let versions = parse_versions(node)?;
        tracing::info!(count = versions.len(), "Fetched legacy versions");
        Ok(versions)
    }

    async fn categories(&self, docs_key: &str) -> Result<Vec<String>, SourceError> {
        let path = format!("docs/{docs_key}/categories");
        let node = self.get(&path).await?;
        ordered_children(node)
            .into_iter()
            .map(|(key, value)| match value {
                Value::String(category) => Ok(category),
                other => Err(SourceError::Decode {
                    path: format!("{path}/{key}"),
                    reason: format!("expected a category name, got {other}"),
                }),
            })
            .collect()
    }

    async fn pages(&self, docs_key: &str) -> Result<Vec<Value>, SourceError> {
        let node = self.get(&format!("docs/{docs_key}/pages")).await?;
        let pages: Vec<Value> = ordered_children(node).into_iter().map(|(_, v)| v).collect();
        tracing::info!(docs_key, count = pages.len(), "Fetched legacy pages");
        Ok(pages)
    }
}

/// Decodes the `versions` node, keeping database key order.
pub fn parse_versions(node: Value) -> Result<Vec<LegacyVersion>, SourceError> {
    ordered_children(node)
        .into_iter()
        .map(|(key, value)| {
            serde_json::from_value(value).map_err(|e| SourceError::Decode {
                path: format!("versions/{key}"),
                reason: e.to_string(),
            })
        })
        .collect()
}
