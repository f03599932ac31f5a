#![doc = "Firestore REST client: implements the core `DocumentStore` for the CLI."]
//
//! # Firestore (destination store)
//!
//! - [`FirestoreClient::connect`] obtains an access token once; [`FirestoreClient::close`]
//!   ends the handle's lifetime at the end of a run.
//! - Write groups map to a single `documents:commit` call, which Firestore applies
//!   atomically.
//! - The package lookup is a `documents:runQuery` with an equality filter on `name`.
//!
//! Documents travel as plain JSON inside the core crate; [`encode_value`] and
//! [`decode_value`] convert to and from Firestore's typed value representation.

use async_trait::async_trait;
use docs_migrate_core::contract::{Collection, DocumentStore, WriteGroup, WriteOp};
use docs_migrate_core::error::StoreError;
use docs_migrate_core::model::StoredPackage;
use serde_json::{json, Map, Value};

use crate::credentials::fetch_access_token;
use crate::load_config::CliConfig;

pub struct FirestoreClient {
    http: reqwest::Client,
    endpoint: String,
    database: String,
    access_token: String,
}

impl FirestoreClient {
    pub async fn connect(config: &CliConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::new();
        let access_token = fetch_access_token(&http, &config.service_account).await?;
        let client = Self::with_token(
            http,
            &config.firestore_endpoint,
            &config.service_account.project_id,
            access_token,
        );
        tracing::info!(database = %client.database, "Connected to Firestore");
        Ok(client)
    }

    pub fn with_token(
        http: reqwest::Client,
        endpoint: &str,
        project_id: &str,
        access_token: String,
    ) -> Self {
        Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            database: format!("projects/{project_id}/databases/(default)"),
            access_token,
        }
    }

    pub fn close(self) {
        tracing::info!(database = %self.database, "Closed Firestore client");
    }

    pub fn document_name(&self, collection: Collection, id: &str) -> String {
        format!("{}/documents/{}/{}", self.database, collection.id(), id)
    }

    /// Request body for `documents:commit`.
    pub fn commit_body(&self, group: &WriteGroup) -> Value {
        let writes: Vec<Value> = group
            .ops
            .iter()
            .map(|op| match op {
                WriteOp::Set {
                    collection,
                    id,
                    document,
                } => json!({
                    "update": {
                        "name": self.document_name(*collection, id),
                        "fields": encode_fields(document),
                    }
                }),
                WriteOp::Update {
                    collection,
                    id,
                    fields,
                } => json!({
                    "update": {
                        "name": self.document_name(*collection, id),
                        "fields": encode_map(fields),
                    },
                    "updateMask": { "fieldPaths": fields.keys().collect::<Vec<_>>() },
                    "currentDocument": { "exists": true },
                }),
            })
            .collect();
        json!({ "writes": writes })
    }

    async fn post(&self, action: &str, body: &Value) -> Result<Value, StoreError> {
        let url = format!("{}/{}/documents:{}", self.endpoint, self.database, action);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = ?e, url = %url, "Firestore request failed");
                StoreError::Request(e.to_string())
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;
        if !status.is_success() {
            tracing::error!(status = %status, url = %url, body = %text, "Firestore rejected request");
            return Err(StoreError::Rejected {
                status: status.as_u16(),
                body: text,
            });
        }
        serde_json::from_str(&text).map_err(|e| StoreError::Decode(e.to_string()))
    }
}

#[async_trait]
impl DocumentStore for FirestoreClient {
    fn new_id(&self) -> String {
        uuid::Uuid::new_v4().simple().to_string()
    }

    async fn find_package(&self, name: &str) -> Result<Option<StoredPackage>, StoreError> {
        tracing::info!(package = name, "Looking up package");
        let body = json!({
            "structuredQuery": {
                "from": [{ "collectionId": Collection::Packages.id() }],
                "where": {
                    "fieldFilter": {
                        "field": { "fieldPath": "name" },
                        "op": "EQUAL",
                        "value": { "stringValue": name },
                    }
                },
                "limit": 1,
            }
        });
        let response = self.post("runQuery", &body).await?;
        let found = first_query_document(&response)?;
        match &found {
            Some(stored) => tracing::info!(package = name, id = %stored.id, versions = stored.versions.len(), "Found package"),
            None => tracing::warn!(package = name, "Package not found"),
        }
        Ok(found)
    }

    async fn commit(&self, group: WriteGroup) -> Result<(), StoreError> {
        tracing::debug!(writes = group.len(), "Committing write group");
        self.post("commit", &self.commit_body(&group)).await?;
        Ok(())
    }
}

/// Picks the first document out of a `runQuery` response stream.
pub fn first_query_document(response: &Value) -> Result<Option<StoredPackage>, StoreError> {
    let Some(results) = response.as_array() else {
        return Err(StoreError::Decode("runQuery response is not an array".into()));
    };
    let Some(document) = results.iter().find_map(|r| r.get("document")) else {
        return Ok(None);
    };

    let name = document
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| StoreError::Decode("document without name".into()))?;
    let id = name.rsplit('/').next().unwrap_or(name).to_string();
    let fields = decode_fields(document.get("fields").unwrap_or(&Value::Null))?;
    let mut stored: StoredPackage =
        serde_json::from_value(fields).map_err(|e| StoreError::Decode(e.to_string()))?;
    stored.id = id;
    Ok(Some(stored))
}

fn encode_fields(document: &Value) -> Value {
    match document {
        Value::Object(map) => encode_map(map),
        _ => Value::Object(Map::new()),
    }
}

fn encode_map(map: &Map<String, Value>) -> Value {
    Value::Object(
        map.iter()
            .map(|(k, v)| (k.clone(), encode_value(v)))
            .collect(),
    )
}

/// Plain JSON → Firestore `Value`.
pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => match n.as_i64() {
            // int64 travels as a decimal string
            Some(i) => json!({ "integerValue": i.to_string() }),
            None => json!({ "doubleValue": n.as_f64() }),
        },
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => json!({
            "arrayValue": { "values": items.iter().map(encode_value).collect::<Vec<_>>() }
        }),
        Value::Object(map) => json!({ "mapValue": { "fields": encode_map(map) } }),
    }
}

fn decode_fields(fields: &Value) -> Result<Value, StoreError> {
    match fields {
        Value::Null => Ok(Value::Object(Map::new())),
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| Ok((k.clone(), decode_value(v)?)))
            .collect::<Result<Map<_, _>, StoreError>>()
            .map(Value::Object),
        other => Err(StoreError::Decode(format!("unexpected fields node {other}"))),
    }
}

/// Firestore `Value` → plain JSON.
pub fn decode_value(value: &Value) -> Result<Value, StoreError> {
    let Some((kind, inner)) = value.as_object().and_then(|m| m.iter().next()) else {
        return Err(StoreError::Decode(format!("unexpected value {value}")));
    };
    match kind.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" | "doubleValue" | "stringValue" | "timestampValue" | "referenceValue" => {
            Ok(inner.clone())
        }
        "integerValue" => match inner {
            Value::String(s) => s
                .parse::<i64>()
                .map(Value::from)
                .map_err(|e| StoreError::Decode(format!("bad integerValue {s}: {e}"))),
            Value::Number(_) => Ok(inner.clone()),
            other => Err(StoreError::Decode(format!("bad integerValue {other}"))),
        },
        "arrayValue" => inner
            .get("values")
            .and_then(Value::as_array)
            .map(|values| values.iter().map(decode_value).collect::<Result<Vec<_>, _>>())
            .unwrap_or_else(|| Ok(Vec::new()))
            .map(Value::Array),
        "mapValue" => decode_fields(inner.get("fields").unwrap_or(&Value::Null)),
        other => Err(StoreError::Decode(format!("unsupported value type {other}"))),
    }
}
