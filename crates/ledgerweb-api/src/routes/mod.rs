//! Route modules for the API server
//!
//! - data: Full document read and shallow merge
//! - transactions: Record a transaction
//! - accounts: Add, delete, activate accounts and set budgets
//!
//! Each module follows a consistent structure:
//! - mod.rs: Module declaration and exports
//! - api.rs: JSON API endpoints

pub mod accounts;
pub mod data;
pub mod transactions;

use serde_json::{Map, Value};

/// Success envelope: `{"status": "success", ...payload}`
pub(crate) fn success(payload: Value) -> Value {
    let mut body = Map::new();
    body.insert("status".to_string(), Value::from("success"));
    if let Value::Object(fields) = payload {
        body.extend(fields);
    }
    Value::Object(body)
}
