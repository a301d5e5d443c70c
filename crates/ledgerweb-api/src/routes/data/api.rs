//! Data API endpoints - JSON API

use crate::error::{logged, ApiError};
use crate::routes::success;
use crate::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use ledgerweb_core::Document;
use serde_json::{json, Value};

/// Get the full document (JSON API)
pub async fn api_data(state: State<AppState>) -> Result<Json<Document>, ApiError> {
    let ledger = state.ledger.read().await;
    let document = ledger.data().await.map_err(logged("get_data"))?;
    Ok(Json(document))
}

/// Merge top-level keys into the document (JSON API)
pub async fn api_update(
    state: State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(patch) = payload?;

    let mut ledger = state.ledger.write().await;
    let document = ledger.merge_update(patch).await.map_err(logged("update"))?;

    Ok(Json(success(json!({ "data": document }))))
}
