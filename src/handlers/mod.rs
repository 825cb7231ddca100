pub mod chat;
pub mod health;
pub mod music;

use crate::{models::ItemsResponse, AppState, Result};
use axum::{extract::State, Json};
use bson::{Bson, Document};
use serde_json::{json, Map, Value};
use std::sync::Arc;

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "app": "xuby-backend"
    }))
}

/// Verify the server can reach the database connection path.
pub async fn test_connection(State(state): State<Arc<AppState>>) -> Result<Json<Value>> {
    let was_connected = state.store.is_connected().await;
    state.store.connect().await?;
    tracing::debug!("Connection probe ok (already connected: {})", was_connected);
    Ok(Json(json!({ "status": "ok" })))
}

/// Render a stored document as plain JSON: datetimes become RFC 3339 strings
/// and object ids become hex strings.
pub fn document_json(document: Document) -> Value {
    let map: Map<String, Value> = document
        .into_iter()
        .map(|(key, value)| (key, bson_json(value)))
        .collect();
    Value::Object(map)
}

fn bson_json(value: Bson) -> Value {
    match value {
        Bson::DateTime(dt) => match dt.try_to_rfc3339_string() {
            Ok(s) => Value::String(s),
            Err(_) => json!(dt.timestamp_millis()),
        },
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::Document(doc) => document_json(doc),
        Bson::Array(items) => Value::Array(items.into_iter().map(bson_json).collect()),
        other => other.into_relaxed_extjson(),
    }
}

pub(crate) fn items(documents: Vec<Document>) -> Json<ItemsResponse> {
    Json(ItemsResponse {
        items: documents.into_iter().map(document_json).collect(),
    })
}
