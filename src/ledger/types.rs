//! Ledger data model
//!
//! - `TransactionKind`: the closed CHARGE / SELL enumeration
//! - `Account`: plain read of a seller's cached balance
//! - `LockedAccount`: snapshot taken under the exclusive account lock
//! - `Transaction`: immutable ledger row

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::core_types::{Credit, SellerId, TransactionId};

// ============================================================================
// TransactionKind
// ============================================================================

/// Kind of a ledger entry.
///
/// Persisted as a two-letter code (`CH` / `SE`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    /// Credit added to the seller
    Charge,
    /// Credit consumed by the seller
    Sell,
}

impl TransactionKind {
    /// Storage code
    pub const fn code(self) -> &'static str {
        match self {
            TransactionKind::Charge => "CH",
            TransactionKind::Sell => "SE",
        }
    }

    /// Signed effect of `amount` on the balance.
    ///
    /// Returns `None` when negation would overflow.
    pub fn signed_delta(self, amount: Credit) -> Option<Credit> {
        match self {
            TransactionKind::Charge => Some(amount),
            TransactionKind::Sell => amount.checked_neg(),
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionKind::Charge => write!(f, "CHARGE"),
            TransactionKind::Sell => write!(f, "SELL"),
        }
    }
}

impl FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "CH" | "CHARGE" => Ok(TransactionKind::Charge),
            "SE" | "SELL" => Ok(TransactionKind::Sell),
            _ => Err(format!("Invalid transaction kind: {}", s)),
        }
    }
}

impl TryFrom<String> for TransactionKind {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// ============================================================================
// Accounts
// ============================================================================

/// Unlocked read of a seller account.
///
/// Fine for display; never used to decide whether a spend is admissible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow, ToSchema)]
pub struct Account {
    pub seller_id: SellerId,
    pub username: String,
    /// Cached balance
    pub credit: Credit,
    pub is_active: bool,
    pub updated_at: DateTime<Utc>,
}

/// Account snapshot read while holding the exclusive account lock.
///
/// Only a ledger store can produce one, from inside a unit of work, so the
/// balance check cannot be fed a stale read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockedAccount {
    account: Account,
}

impl LockedAccount {
    pub(crate) fn new(account: Account) -> Self {
        Self { account }
    }

    pub fn seller_id(&self) -> SellerId {
        self.account.seller_id
    }

    /// Balance as seen under the lock
    pub fn credit(&self) -> Credit {
        self.account.credit
    }

    pub fn account(&self) -> &Account {
        &self.account
    }
}

// ============================================================================
// Transactions
// ============================================================================

/// Transaction about to be appended (no id yet)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    pub seller_id: SellerId,
    pub kind: TransactionKind,
    pub datetime: DateTime<Utc>,
    pub receiver: Option<String>,
    pub amount: Credit,
}

impl NewTransaction {
    /// Attach the id assigned by the store
    pub fn into_transaction(self, id: TransactionId) -> Transaction {
        Transaction {
            id,
            seller_id: self.seller_id,
            kind: self.kind,
            datetime: self.datetime,
            receiver: self.receiver,
            amount: self.amount,
        }
    }
}

/// Immutable ledger row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Transaction {
    #[schema(example = 42)]
    pub id: TransactionId,
    #[schema(example = 7)]
    pub seller_id: SellerId,
    #[sqlx(try_from = "String")]
    pub kind: TransactionKind,
    pub datetime: DateTime<Utc>,
    #[schema(example = "111")]
    pub receiver: Option<String>,
    /// Non-negative magnitude; the sign comes from `kind`
    #[schema(example = 50)]
    pub amount: Credit,
}

impl Transaction {
    /// Signed effect of this row on the balance
    pub fn signed_amount(&self) -> Credit {
        match self.kind {
            TransactionKind::Charge => self.amount,
            TransactionKind::Sell => -self.amount,
        }
    }
}

/// Aggregates over a seller's full history.
///
/// Sums are `i128`: charging and selling `i64::MAX` each is a valid history
/// whose charged total no longer fits a [`Credit`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct LedgerTotals {
    /// Sum of CHARGE amounts
    pub charged: i128,
    /// Sum of SELL amounts
    pub sold: i128,
    pub transaction_count: i64,
}

impl LedgerTotals {
    /// Fold a sequence of rows
    pub fn from_transactions<'a>(txs: impl IntoIterator<Item = &'a Transaction>) -> Self {
        txs.into_iter().fold(Self::default(), |mut acc, tx| {
            match tx.kind {
                TransactionKind::Charge => acc.charged += i128::from(tx.amount),
                TransactionKind::Sell => acc.sold += i128::from(tx.amount),
            }
            acc.transaction_count += 1;
            acc
        })
    }

    /// Balance recomputed from the ledger
    pub fn net(&self) -> i128 {
        self.charged - self.sold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(kind: TransactionKind, amount: Credit) -> Transaction {
        Transaction {
            id: 1,
            seller_id: 1,
            kind,
            datetime: Utc::now(),
            receiver: None,
            amount,
        }
    }

    #[test]
    fn test_kind_codes_parse_back() {
        assert_eq!(TransactionKind::Charge.code(), "CH");
        assert_eq!(TransactionKind::Sell.code(), "SE");
        assert_eq!("CH".parse::<TransactionKind>(), Ok(TransactionKind::Charge));
        assert_eq!("sell".parse::<TransactionKind>(), Ok(TransactionKind::Sell));
        assert!("XX".parse::<TransactionKind>().is_err());
    }

    #[test]
    fn test_signed_delta() {
        assert_eq!(TransactionKind::Charge.signed_delta(30), Some(30));
        assert_eq!(TransactionKind::Sell.signed_delta(30), Some(-30));
        assert_eq!(TransactionKind::Sell.signed_delta(Credit::MIN), None);
    }

    #[test]
    fn test_kind_serializes_as_upper_words() {
        let json = serde_json::to_string(&TransactionKind::Charge).unwrap();
        assert_eq!(json, "\"CHARGE\"");
    }

    #[test]
    fn test_totals_net() {
        let rows = vec![
            tx(TransactionKind::Charge, 100),
            tx(TransactionKind::Charge, 20),
            tx(TransactionKind::Sell, 45),
        ];
        let totals = LedgerTotals::from_transactions(&rows);
        assert_eq!(totals.charged, 120);
        assert_eq!(totals.sold, 45);
        assert_eq!(totals.transaction_count, 3);
        assert_eq!(totals.net(), 75);
        assert_eq!(rows.iter().map(Transaction::signed_amount).sum::<Credit>(), 75);
    }

    #[test]
    fn test_totals_past_credit_range() {
        let rows = vec![
            tx(TransactionKind::Charge, Credit::MAX),
            tx(TransactionKind::Sell, Credit::MAX),
            tx(TransactionKind::Charge, 1),
        ];
        let totals = LedgerTotals::from_transactions(&rows);
        assert_eq!(totals.charged, i128::from(Credit::MAX) + 1);
        assert_eq!(totals.sold, i128::from(Credit::MAX));
        assert_eq!(totals.net(), 1);
    }
}
