//! Transaction routes - Recording income and expenses
//!
//! Features:
//! - Record a transaction with a server-assigned id
//! - Adjust the referenced account's balance

pub mod api;

pub use api::api_add_transaction;
