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

pub async fn create_session(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<models::CreateChatSessionRequest>, JsonRejection>,
) -> Result<Json<Value>> {
    let Json(req) = payload?;
    let session = req.into_session();
    let doc = state
        .store
        .create_document(models::CHAT_SESSIONS, bson::to_document(&session)?)
        .await?;

    Ok(Json(document_json(doc)))
}

pub async fn add_message(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<models::AddMessageRequest>, JsonRejection>,
) -> Result<Json<Value>> {
    let Json(req) = payload?;
    let message = req.into_message();
    let doc = state
        .store
        .create_document(models::CHAT_MESSAGES, bson::to_document(&message)?)
        .await?;

    Ok(Json(document_json(doc)))
}

pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    query: std::result::Result<Query<models::MessagesQuery>, QueryRejection>,
) -> Result<Json<models::ItemsResponse>> {
    let Query(query) = query?;
    let filter = query
        .session_id
        .filter(|id| !id.is_empty())
        .map(|id| doc! { "session_id": id });

    let docs = state
        .store
        .list_documents(models::CHAT_MESSAGES, filter, query.limit)
        .await?;

    Ok(items(docs))
}
