use std::collections::BTreeMap;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;

use super::{Document, DocumentStore, FieldValue, Filter};

pub struct FirestoreStore {
    base_url: String,
    project_id: String,
    database: String,
    api_key: String,
    client: reqwest::Client,
}

impl FirestoreStore {
    pub fn new(base_url: String, project_id: String, database: String, api_key: String) -> Self {
        Self {
            base_url,
            project_id,
            database,
            api_key,
            client: reqwest::Client::new(),
        }
    }

    fn run_query_url(&self) -> String {
        format!(
            "{}/projects/{}/databases/{}/documents:runQuery",
            self.base_url, self.project_id, self.database
        )
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn query(&self, collection: &str, filters: &[Filter]) -> anyhow::Result<Vec<Document>> {
        let body = build_query(collection, filters);

        let mut request = self.client.post(self.run_query_url()).json(&body);
        if !self.api_key.is_empty() {
            request = request.query(&[("key", self.api_key.as_str())]);
        }

        let resp = request
            .send()
            .await
            .context("failed to call Firestore runQuery")?;

        let status = resp.status();
        let data: serde_json::Value = resp
            .json()
            .await
            .context("failed to parse Firestore response")?;

        if !status.is_success() {
            anyhow::bail!("Firestore API error ({}): {}", status, data);
        }

        Ok(parse_query_results(&data))
    }
}

fn build_query(collection: &str, filters: &[Filter]) -> serde_json::Value {
    let mut query = json!({
        "from": [{"collectionId": collection}],
    });

    let field_filters: Vec<serde_json::Value> = filters
        .iter()
        .map(|f| {
            json!({
                "fieldFilter": {
                    "field": {"fieldPath": f.field},
                    "op": "EQUAL",
                    "value": encode_value(&f.value),
                }
            })
        })
        .collect();

    match field_filters.len() {
        0 => {}
        1 => {
            query["where"] = field_filters.into_iter().next().unwrap_or_default();
        }
        _ => {
            query["where"] = json!({
                "compositeFilter": {"op": "AND", "filters": field_filters}
            });
        }
    }

    json!({"structuredQuery": query})
}

// Firestore wraps every value in a single-key type envelope; int64 rides as
// a decimal string.
fn encode_value(value: &FieldValue) -> serde_json::Value {
    match value {
        FieldValue::Null => json!({"nullValue": null}),
        FieldValue::Bool(b) => json!({"booleanValue": b}),
        FieldValue::Int(i) => json!({"integerValue": i.to_string()}),
        FieldValue::Double(d) => json!({"doubleValue": d}),
        FieldValue::Str(s) => json!({"stringValue": s}),
        FieldValue::Timestamp(t) => json!({"timestampValue": t.to_rfc3339()}),
        FieldValue::Array(items) => json!({
            "arrayValue": {"values": items.iter().map(encode_value).collect::<Vec<_>>()}
        }),
        FieldValue::Map(entries) => json!({
            "mapValue": {"fields": entries
                .iter()
                .map(|(k, v)| (k.clone(), encode_value(v)))
                .collect::<serde_json::Map<_, _>>()}
        }),
    }
}

fn decode_value(envelope: &serde_json::Value) -> FieldValue {
    let Some(obj) = envelope.as_object() else {
        return FieldValue::Null;
    };
    let Some((kind, inner)) = obj.iter().next() else {
        return FieldValue::Null;
    };

    match kind.as_str() {
        "nullValue" => FieldValue::Null,
        "booleanValue" => FieldValue::Bool(inner.as_bool().unwrap_or(false)),
        "integerValue" => {
            // String-encoded in the JSON mapping, but accept a bare number.
            let parsed = inner
                .as_str()
                .and_then(|s| s.parse::<i64>().ok())
                .or_else(|| inner.as_i64());
            FieldValue::Int(parsed.unwrap_or(0))
        }
        "doubleValue" => FieldValue::Double(inner.as_f64().unwrap_or(0.0)),
        "timestampValue" => match inner.as_str() {
            Some(raw) => DateTime::parse_from_rfc3339(raw)
                .map(|t| FieldValue::Timestamp(t.with_timezone(&Utc)))
                .unwrap_or_else(|_| FieldValue::Str(raw.to_string())),
            None => FieldValue::Null,
        },
        "stringValue" | "referenceValue" | "bytesValue" => {
            FieldValue::Str(inner.as_str().unwrap_or_default().to_string())
        }
        "mapValue" => {
            let fields = inner
                .get("fields")
                .and_then(|f| f.as_object())
                .map(decode_fields)
                .unwrap_or_default();
            FieldValue::Map(fields)
        }
        "arrayValue" => {
            let items = inner
                .get("values")
                .and_then(|v| v.as_array())
                .map(|values| values.iter().map(decode_value).collect())
                .unwrap_or_default();
            FieldValue::Array(items)
        }
        _ => FieldValue::Null,
    }
}

fn decode_fields(fields: &serde_json::Map<String, serde_json::Value>) -> BTreeMap<String, FieldValue> {
    fields
        .iter()
        .map(|(name, envelope)| (name.clone(), decode_value(envelope)))
        .collect()
}

fn parse_query_results(data: &serde_json::Value) -> Vec<Document> {
    let Some(entries) = data.as_array() else {
        return vec![];
    };

    entries
        .iter()
        .filter_map(|entry| {
            // Entries without a document (read-time / progress markers) are
            // skipped.
            let doc = entry.get("document")?;
            let name = doc.get("name").and_then(|n| n.as_str())?;
            let id = name.rsplit('/').next().unwrap_or(name).to_string();
            let fields = doc
                .get("fields")
                .and_then(|f| f.as_object())
                .map(decode_fields)
                .unwrap_or_default();
            Some(Document { id, fields })
        })
        .collect()
}
