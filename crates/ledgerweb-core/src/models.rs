//! Core data models for the ledger
//!
//! The [`Document`] is the whole persisted state. Its mutation methods are
//! pure in-memory edits; loading and saving is left to the [`crate::Ledger`].

use ledgerweb_utils::{account_slug, parse_number};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::error::{CoreError, CoreResult};
use super::types::TransactionKind;

/// Budget limit for accounts stored without one
pub const DEFAULT_BUDGET_LIMIT: f64 = 10000.0;

/// A stored number, kept exactly as written until it is changed.
///
/// Loading accepts JSON numbers and numeric strings. Saving writes back the
/// original value, so `100` stays `100` and `"12.5"` stays a string.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Amount(Value);

impl Amount {
    pub fn value(&self) -> f64 {
        parse_number(&self.0).unwrap_or(0.0)
    }
}

impl From<f64> for Amount {
    fn from(value: f64) -> Self {
        Amount(Value::from(value))
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        match parse_number(&value) {
            Some(_) => Ok(Amount(value)),
            None => Err(serde::de::Error::custom(format!(
                "expected a number, got {}",
                value
            ))),
        }
    }
}

/// The whole persisted dataset
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Accounts in display order, oldest first
    #[serde(default)]
    pub accounts: Vec<Account>,
    /// Transactions, newest first
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    /// Smallest transaction id never handed out
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_transaction_id: Option<u64>,
    /// Any other top-level keys, kept verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Account information
///
/// Only `id` is required. Absent fields stay absent when the account is
/// saved again; the accessors supply the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Unique account identifier (e.g., "main_checking_1")
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Free-form category ("checking", "credit", ...)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub account_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<Amount>,
    /// At most one account is active at a time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_limit: Option<Amount>,
    /// Fields this server does not interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Account {
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    /// Running balance, 0 when unset
    pub fn balance(&self) -> f64 {
        self.balance.as_ref().map_or(0.0, Amount::value)
    }

    pub fn is_active(&self) -> bool {
        self.active.unwrap_or(false)
    }

    pub fn budget_limit(&self) -> f64 {
        self.budget_limit
            .as_ref()
            .map_or(DEFAULT_BUDGET_LIMIT, Amount::value)
    }
}

/// Transaction information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique transaction identifier
    pub id: u64,
    /// Id of the account this transaction belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    /// Non-negative magnitude
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Amount>,
    /// "income", "expense", or anything else (no balance effect)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Client fields passed through verbatim (date, description, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Transaction {
    pub fn account_id(&self) -> &str {
        self.account_id.as_deref().unwrap_or_default()
    }

    pub fn amount(&self) -> f64 {
        self.amount.as_ref().map_or(0.0, Amount::value)
    }

    /// The balance-moving kind, if this transaction has one
    pub fn kind(&self) -> Option<TransactionKind> {
        self.kind.as_deref()?.parse().ok()
    }

    fn belongs_to(&self, account_id: &str) -> bool {
        self.account_id.as_deref() == Some(account_id)
    }
}

/// Result of recording a transaction
#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    /// The stored transaction, id assigned
    pub transaction: Transaction,
    /// New balance of the referenced account, `None` when no account matched
    pub balance: Option<f64>,
}

/// Result of deleting an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeleteOutcome {
    /// Whether an account with the id existed
    pub matched: bool,
    /// Transactions removed by the cascade
    pub removed_transactions: usize,
}

fn ids_exhausted() -> CoreError {
    CoreError::validation("no transaction ids left to assign")
}

impl Document {
    /// Parse a document from JSON text
    pub fn from_json(content: &str) -> CoreResult<Self> {
        serde_json::from_str(content).map_err(|e| CoreError::InvalidFormat {
            message: e.to_string(),
        })
    }

    pub fn account(&self, id: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id == id)
    }

    fn account_mut(&mut self, id: &str) -> Option<&mut Account> {
        self.accounts.iter_mut().find(|a| a.id == id)
    }

    /// Shallow merge: each key of `patch` replaces the top-level key wholesale.
    pub fn merge(self, patch: Value) -> CoreResult<Self> {
        let Value::Object(patch) = patch else {
            return Err(CoreError::validation("update body must be a JSON object"));
        };

        let current = serde_json::to_value(&self).map_err(|e| CoreError::InternalError {
            message: e.to_string(),
        })?;
        let Value::Object(mut root) = current else {
            return Err(CoreError::InternalError {
                message: "document did not serialize to an object".to_string(),
            });
        };

        for (key, value) in patch {
            root.insert(key, value);
        }

        serde_json::from_value(Value::Object(root))
            .map_err(|e| CoreError::validation(format!("merged document is invalid: {}", e)))
    }

    /// Id for the next transaction: one past the largest stored id, never
    /// below the persisted high-water mark.
    pub fn next_transaction_id(&self) -> CoreResult<u64> {
        let after_max = match self.transactions.iter().map(|t| t.id).max() {
            Some(max) => max.checked_add(1).ok_or_else(ids_exhausted)?,
            None => 1,
        };
        Ok(after_max.max(self.next_transaction_id.unwrap_or(1)))
    }

    /// Assign an id, insert at the front and adjust the account balance.
    ///
    /// Fails without touching the document when the id space is used up.
    pub fn record_transaction(&mut self, mut transaction: Transaction) -> CoreResult<Recorded> {
        let id = self.next_transaction_id()?;
        let high_water = id.checked_add(1).ok_or_else(ids_exhausted)?;

        transaction.id = id;
        self.next_transaction_id = Some(high_water);
        self.transactions.insert(0, transaction.clone());

        let kind = transaction.kind();
        let amount = transaction.amount();
        let balance = self.account_mut(transaction.account_id()).map(|account| {
            // Other kinds leave the stored balance as written
            if let Some(kind) = kind {
                account.balance = Some(Amount::from(account.balance() + kind.signed(amount)));
            }
            account.balance()
        });

        Ok(Recorded { transaction, balance })
    }

    /// Make `id` the only active account. Returns whether it matched.
    ///
    /// An unknown id leaves every account inactive.
    pub fn activate_account(&mut self, id: &str) -> bool {
        let mut matched = false;
        for account in &mut self.accounts {
            let active = account.id == id;
            account.active = Some(active);
            matched |= active;
        }
        matched
    }

    /// `slug(name)_N` with N starting at `accounts.len() + 1`, bumped past
    /// ids already taken.
    pub fn allocate_account_id(&self, name: &str) -> String {
        let slug = account_slug(name);
        let mut seq = self.accounts.len() + 1;
        loop {
            let id = format!("{}_{}", slug, seq);
            if self.account(&id).is_none() {
                return id;
            }
            seq += 1;
        }
    }

    /// Append a new inactive account
    pub fn push_account(&mut self, draft: AccountDraft, budget_limit: f64) -> Account {
        let account = Account {
            id: self.allocate_account_id(&draft.name),
            name: Some(draft.name),
            account_type: Some(draft.account_type),
            balance: Some(Amount::from(draft.balance)),
            active: Some(false),
            budget_limit: Some(Amount::from(budget_limit)),
            extra: Map::new(),
        };
        self.accounts.push(account.clone());
        account
    }

    /// Remove an account and every transaction that references it.
    ///
    /// The cascade runs even when no account matched, so transactions left
    /// pointing at `id` are removed too.
    pub fn remove_account(&mut self, id: &str) -> DeleteOutcome {
        let accounts_before = self.accounts.len();
        self.accounts.retain(|a| a.id != id);

        let transactions_before = self.transactions.len();
        self.transactions.retain(|t| !t.belongs_to(id));

        DeleteOutcome {
            matched: self.accounts.len() != accounts_before,
            removed_transactions: transactions_before - self.transactions.len(),
        }
    }

    /// Set an account's budget limit. Returns whether it matched.
    pub fn set_budget_limit(&mut self, id: &str, limit: f64) -> bool {
        match self.account_mut(id) {
            Some(account) => {
                account.budget_limit = Some(Amount::from(limit));
                true
            }
            None => false,
        }
    }
}

// ==================== Requests ====================

fn required(field: &str, value: Option<Value>) -> CoreResult<Value> {
    match value {
        None | Some(Value::Null) => Err(CoreError::validation(format!("{} is required", field))),
        Some(value) => Ok(value),
    }
}

fn required_string(field: &str, value: Option<Value>) -> CoreResult<String> {
    match required(field, value)? {
        Value::String(s) => Ok(s),
        other => Err(CoreError::validation(format!(
            "{} must be a string, got {}",
            field, other
        ))),
    }
}

fn required_number(field: &str, value: Option<Value>) -> CoreResult<f64> {
    let value = required(field, value)?;
    parse_number(&value)
        .ok_or_else(|| CoreError::validation(format!("{} must be a number, got {}", field, value)))
}

/// Body of an add-transaction request, before validation
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewTransaction {
    #[serde(default)]
    pub account_id: Option<Value>,
    #[serde(default)]
    pub amount: Option<Value>,
    #[serde(default, rename = "type")]
    pub kind: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NewTransaction {
    /// Check required fields and build the transaction to record (id unset)
    pub fn validate(self) -> CoreResult<Transaction> {
        let account_id = required_string("account_id", self.account_id)?;
        let amount = required_number("amount", self.amount)?;
        if amount < 0.0 {
            return Err(CoreError::validation("amount must not be negative"));
        }
        let kind = required_string("type", self.kind)?;

        // The server assigns ids
        let mut extra = self.extra;
        extra.remove("id");

        Ok(Transaction {
            id: 0,
            account_id: Some(account_id),
            amount: Some(Amount::from(amount)),
            kind: Some(kind),
            extra,
        })
    }
}

/// Body of an add-account request, before validation
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct NewAccount {
    pub name: Option<Value>,
    pub account_type: Option<Value>,
    pub balance: Option<Value>,
}

impl From<Map<String, Value>> for NewAccount {
    fn from(mut body: Map<String, Value>) -> Self {
        Self {
            name: body.remove("name"),
            account_type: body.remove("type"),
            balance: body.remove("balance"),
        }
    }
}

/// Validated add-account request
#[derive(Debug, Clone, PartialEq)]
pub struct AccountDraft {
    pub name: String,
    pub account_type: String,
    pub balance: f64,
}

impl NewAccount {
    pub fn validate(self) -> CoreResult<AccountDraft> {
        let name = required_string("name", self.name)?;
        if name.trim().is_empty() {
            return Err(CoreError::validation("name must not be empty"));
        }
        Ok(AccountDraft {
            name,
            account_type: required_string("type", self.account_type)?,
            balance: required_number("balance", self.balance)?,
        })
    }
}

/// Body of toggle/delete requests
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct AccountRef {
    pub id: Option<Value>,
}

impl From<Map<String, Value>> for AccountRef {
    fn from(mut body: Map<String, Value>) -> Self {
        Self {
            id: body.remove("id"),
        }
    }
}

impl AccountRef {
    pub fn validate(self) -> CoreResult<String> {
        required_string("id", self.id)
    }
}

/// Body of an update-budget request, before validation
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct BudgetUpdate {
    pub account_id: Option<Value>,
    pub new_limit: Option<Value>,
}

impl From<Map<String, Value>> for BudgetUpdate {
    fn from(mut body: Map<String, Value>) -> Self {
        Self {
            account_id: body.remove("account_id"),
            new_limit: body.remove("new_limit"),
        }
    }
}

impl BudgetUpdate {
    /// Returns the account id and the new limit
    pub fn validate(self) -> CoreResult<(String, f64)> {
        let account_id = required_string("account_id", self.account_id)?;
        let new_limit = required_number("new_limit", self.new_limit)?;
        Ok((account_id, new_limit))
    }
}
