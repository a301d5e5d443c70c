//! Core ledger processing and business logic
//!
//! Every [`Ledger`] operation is one full cycle over the store: load the
//! document, change an in-memory copy, save it once. Requests are validated
//! before anything is loaded, and nothing is written if the change fails.
//!
//! Mutating operations take `&mut self`. Shared behind a
//! `tokio::sync::RwLock`, that makes writers run one at a time, so two
//! concurrent updates cannot overwrite each other's changes.

pub mod error;
pub mod models;
pub mod store;
pub mod types;

use serde_json::Value;
use std::sync::Arc;

pub use error::{CoreError, CoreResult, ErrorCode, ErrorDetails, ErrorSeverity};
pub use models::{
    Account, AccountDraft, AccountRef, Amount, BudgetUpdate, DeleteOutcome, Document, NewAccount,
    NewTransaction, Recorded, Transaction, DEFAULT_BUDGET_LIMIT,
};
pub use store::{DocumentStore, JsonFileStore, MemoryStore};
pub use types::TransactionKind;

/// Store reference type
pub type StoreRef = Arc<dyn DocumentStore>;

/// Main ledger service
pub struct Ledger {
    store: StoreRef,
    default_budget_limit: f64,
}

impl Ledger {
    /// Create a ledger over a store; new accounts get `default_budget_limit`
    pub fn new(store: StoreRef, default_budget_limit: f64) -> Self {
        Self {
            store,
            default_budget_limit,
        }
    }

    /// Where the document lives
    pub fn location(&self) -> String {
        self.store.location()
    }

    /// The full document, unchanged
    pub async fn data(&self) -> CoreResult<Document> {
        self.store.load().await
    }

    /// Overwrite the top-level keys present in `patch`
    pub async fn merge_update(&mut self, patch: Value) -> CoreResult<Document> {
        let keys = match &patch {
            Value::Object(map) => map.keys().cloned().collect::<Vec<_>>().join(", "),
            _ => return Err(CoreError::validation("update body must be a JSON object")),
        };

        let merged = self.store.load().await?.merge(patch)?;
        self.store.save(&merged).await?;

        log::info!("Merged update into keys: {}", keys);
        Ok(merged)
    }

    /// Record a transaction and apply it to its account's balance
    pub async fn add_transaction(&mut self, request: NewTransaction) -> CoreResult<Transaction> {
        let transaction = request.validate()?;

        let mut document = self.store.load().await?;
        let recorded = document.record_transaction(transaction)?;
        self.store.save(&document).await?;

        let tx = &recorded.transaction;
        match recorded.balance {
            Some(balance) => log::info!(
                "Recorded transaction {} ({} {}) on {}, balance now {}",
                tx.id,
                tx.kind.as_deref().unwrap_or_default(),
                tx.amount(),
                tx.account_id(),
                balance
            ),
            None => log::warn!(
                "Recorded transaction {} for unknown account {}, no balance changed",
                tx.id,
                tx.account_id()
            ),
        }
        Ok(recorded.transaction)
    }

    /// Make `id` the only active account. Returns whether it matched; an
    /// unknown id leaves every account inactive.
    pub async fn toggle_account(&mut self, request: AccountRef) -> CoreResult<bool> {
        let id = request.validate()?;

        let mut document = self.store.load().await?;
        let matched = document.activate_account(&id);
        self.store.save(&document).await?;

        if matched {
            log::info!("Active account is now {}", id);
        } else {
            log::warn!("Toggle for unknown account {}, all accounts deactivated", id);
        }
        Ok(matched)
    }

    /// Append a new account
    pub async fn add_account(&mut self, request: NewAccount) -> CoreResult<Account> {
        let draft = request.validate()?;

        let mut document = self.store.load().await?;
        let account = document.push_account(draft, self.default_budget_limit);
        self.store.save(&document).await?;

        log::info!("Added account {} ({})", account.id, account.name());
        Ok(account)
    }

    /// Remove an account and its transactions. Transactions referencing
    /// `id` are removed even when no account matched.
    pub async fn delete_account(&mut self, request: AccountRef) -> CoreResult<DeleteOutcome> {
        let id = request.validate()?;

        let mut document = self.store.load().await?;
        let outcome = document.remove_account(&id);
        self.store.save(&document).await?;

        if outcome.matched {
            log::info!(
                "Deleted account {} and {} transaction(s)",
                id,
                outcome.removed_transactions
            );
        } else {
            log::debug!("Delete for unknown account {}", id);
        }
        Ok(outcome)
    }

    /// Change an account's budget limit. Returns whether it matched.
    pub async fn update_budget(&mut self, request: BudgetUpdate) -> CoreResult<bool> {
        let (account_id, new_limit) = request.validate()?;

        let mut document = self.store.load().await?;
        let matched = document.set_budget_limit(&account_id, new_limit);
        self.store.save(&document).await?;

        if matched {
            log::info!("Budget limit of {} set to {}", account_id, new_limit);
        } else {
            log::debug!("Budget update for unknown account {}", account_id);
        }
        Ok(matched)
    }
}

// ==================== Tests ====================
