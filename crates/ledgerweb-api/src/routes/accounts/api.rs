//! Accounts API endpoints - JSON API
//!
//! Endpoints:
//! - api_add_account: Create an account
//! - api_delete_account: Remove an account and cascade its transactions
//! - api_toggle_account: Set the single active account
//! - api_update_budget: Change a budget limit

use crate::error::{logged, ApiError};
use crate::routes::success;
use crate::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use ledgerweb_core::{AccountRef, BudgetUpdate, NewAccount};
use serde_json::{json, Value};

/// Create an account from `{name, type, balance}`
pub async fn api_add_account(
    state: State<AppState>,
    payload: Result<Json<NewAccount>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = payload?;

    let mut ledger = state.ledger.write().await;
    let account = ledger
        .add_account(request)
        .await
        .map_err(logged("add_account"))?;

    Ok(Json(success(json!({ "account": account }))))
}

/// Delete the account `{id}` and every transaction referencing it
pub async fn api_delete_account(
    state: State<AppState>,
    payload: Result<Json<AccountRef>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = payload?;

    let mut ledger = state.ledger.write().await;
    let outcome = ledger
        .delete_account(request)
        .await
        .map_err(logged("delete_account"))?;

    Ok(Json(success(json!(outcome))))
}

/// Activate the account `{id}`, deactivating all others
pub async fn api_toggle_account(
    state: State<AppState>,
    payload: Result<Json<AccountRef>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = payload?;

    let mut ledger = state.ledger.write().await;
    let matched = ledger
        .toggle_account(request)
        .await
        .map_err(logged("toggle_account"))?;

    Ok(Json(success(json!({ "matched": matched }))))
}

/// Set `budget_limit` from `{account_id, new_limit}`
pub async fn api_update_budget(
    state: State<AppState>,
    payload: Result<Json<BudgetUpdate>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = payload?;

    let mut ledger = state.ledger.write().await;
    let matched = ledger
        .update_budget(request)
        .await
        .map_err(logged("update_budget"))?;

    Ok(Json(success(json!({ "matched": matched }))))
}
