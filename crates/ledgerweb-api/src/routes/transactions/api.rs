//! Transactions API endpoints - JSON API

use crate::error::{logged, ApiError};
use crate::routes::success;
use crate::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use ledgerweb_core::NewTransaction;
use serde_json::{json, Value};

/// Record a transaction (JSON API)
///
/// Required fields: `account_id`, `amount`, `type`. Anything else in the
/// body is stored with the transaction as-is.
pub async fn api_add_transaction(
    state: State<AppState>,
    payload: Result<Json<NewTransaction>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = payload?;

    let mut ledger = state.ledger.write().await;
    let transaction = ledger
        .add_transaction(request)
        .await
        .map_err(logged("add_transaction"))?;

    Ok(Json(success(json!({ "transaction": transaction }))))
}
