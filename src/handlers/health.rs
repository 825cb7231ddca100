use super::{document_json, items};
use crate::{models, AppState, Result};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Json,
};
use bson::doc;
use serde_json::Value;
use std::sync::Arc;

pub async fn add_entry(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<models::HealthEntryRequest>, JsonRejection>,
) -> Result<Json<Value>> {
    let Json(req) = payload?;
    let entry = req.into_entry();
    let doc = state
        .store
        .create_document(models::HEALTH_ENTRIES, bson::to_document(&entry)?)
        .await?;

    Ok(Json(document_json(doc)))
}

pub async fn list_entries(
    State(state): State<Arc<AppState>>,
    query: std::result::Result<Query<models::EntriesQuery>, QueryRejection>,
) -> Result<Json<models::ItemsResponse>> {
    let Query(query) = query?;
    let filter = query
        .user_id
        .filter(|id| !id.is_empty())
        .map(|id| doc! { "user_id": id });

    let docs = state
        .store
        .list_documents(models::HEALTH_ENTRIES, filter, query.limit)
        .await?;

    Ok(items(docs))
}
