use super::{document_json, items};
use crate::{models, AppState, Result};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Json,
};
use serde_json::Value;
use std::sync::Arc;

pub async fn add_track(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<models::CreateTrackRequest>, JsonRejection>,
) -> Result<Json<Value>> {
    let Json(req) = payload?;
    let track = req.into_track();
    tracing::info!("Adding track {} by {}", track.title, track.artist);

    let doc = state
        .store
        .create_document(models::TRACKS, bson::to_document(&track)?)
        .await?;

    Ok(Json(document_json(doc)))
}

pub async fn list_tracks(
    State(state): State<Arc<AppState>>,
    query: std::result::Result<Query<models::TracksQuery>, QueryRejection>,
) -> Result<Json<models::ItemsResponse>> {
    let Query(query) = query?;
    let docs = state
        .store
        .list_documents(models::TRACKS, None, query.limit)
        .await?;

    Ok(items(docs))
}
