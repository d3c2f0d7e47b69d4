//! Balance audit: the cached credit recomputed from the full history.

use serde::Serialize;
use utoipa::ToSchema;

use super::types::{Account, LedgerTotals};
use crate::core_types::{Credit, SellerId};

/// Result of comparing a cached balance with its ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct AuditReport {
    pub seller_id: SellerId,
    /// Cached `credit` field
    pub cached_credit: Credit,
    pub charged_total: i128,
    pub sold_total: i128,
    /// `charged_total - sold_total`
    pub ledger_balance: i128,
    pub transaction_count: i64,
    /// Cache equals ledger and is non-negative
    pub consistent: bool,
}

impl AuditReport {
    pub fn new(account: &Account, totals: &LedgerTotals) -> Self {
        let ledger_balance = totals.net();
        Self {
            seller_id: account.seller_id,
            cached_credit: account.credit,
            charged_total: totals.charged,
            sold_total: totals.sold,
            ledger_balance,
            transaction_count: totals.transaction_count,
            consistent: ledger_balance == i128::from(account.credit) && account.credit >= 0,
        }
    }
}
