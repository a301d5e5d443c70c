//! Basic types for the core ledger module

use serde::{Deserialize, Serialize};

/// Transaction kinds that move an account balance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money coming in, added to the balance
    Income,
    /// Money going out, subtracted from the balance
    Expense,
}

impl TransactionKind {
    /// Balance delta for a transaction of this kind
    pub fn signed(self, amount: f64) -> f64 {
        match self {
            TransactionKind::Income => amount,
            TransactionKind::Expense => -amount,
        }
    }
}

// Matching is exact: "Income" is recorded but does not move the balance.
impl std::str::FromStr for TransactionKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            _ => Err(format!("Invalid transaction kind: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionKind::Income => write!(f, "income"),
            TransactionKind::Expense => write!(f, "expense"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_kind_from_str() {
        assert_eq!("income".parse::<TransactionKind>().unwrap(), TransactionKind::Income);
        assert_eq!("expense".parse::<TransactionKind>().unwrap(), TransactionKind::Expense);
        assert!("transfer".parse::<TransactionKind>().is_err());
        assert!("Income".parse::<TransactionKind>().is_err());
    }

    #[test]
    fn test_signed_amount() {
        assert_eq!(TransactionKind::Income.signed(40.0), 40.0);
        assert_eq!(TransactionKind::Expense.signed(10.0), -10.0);
    }
}
