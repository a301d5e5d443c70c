//! Data routes - The whole ledger document
//!
//! Features:
//! - Read the full document
//! - Shallow merge of arbitrary top-level keys

pub mod api;

pub use api::{api_data, api_update};
