//! Account routes - Account management
//!
//! Features:
//! - Add an account with a derived id and default budget
//! - Delete an account together with its transactions
//! - Make one account the active one
//! - Change an account's budget limit
//!
//! Requests naming an unknown account succeed; `matched: false` in the
//! response tells the caller nothing was found.

pub mod api;

pub use api::{api_add_account, api_delete_account, api_toggle_account, api_update_budget};
