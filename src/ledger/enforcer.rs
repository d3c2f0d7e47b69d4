//! Balance invariant enforcer
//!
//! Pure admission check for a spend. It only accepts a [`LockedAccount`], so
//! the balance it judges is the one the append will be applied to.

use serde::Serialize;

use super::error::LedgerError;
use super::types::LockedAccount;
use crate::core_types::Credit;

/// Why a spend was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectReason {
    NegativeAmount,
    InsufficientBalance,
}

impl RejectReason {
    pub fn code(self) -> &'static str {
        match self {
            RejectReason::NegativeAmount => "NEGATIVE_AMOUNT",
            RejectReason::InsufficientBalance => "INSUFFICIENT_BALANCE",
        }
    }
}

impl From<RejectReason> for LedgerError {
    fn from(reason: RejectReason) -> Self {
        match reason {
            RejectReason::NegativeAmount => LedgerError::NegativeAmount,
            RejectReason::InsufficientBalance => LedgerError::InsufficientBalance,
        }
    }
}

impl TryFrom<&LedgerError> for RejectReason {
    type Error = ();

    fn try_from(err: &LedgerError) -> Result<Self, Self::Error> {
        match err {
            LedgerError::NegativeAmount => Ok(RejectReason::NegativeAmount),
            LedgerError::InsufficientBalance => Ok(RejectReason::InsufficientBalance),
            _ => Err(()),
        }
    }
}

/// Outcome of [`check_spend`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpendDecision {
    Admissible,
    Rejected(RejectReason),
}

impl SpendDecision {
    pub fn is_admissible(self) -> bool {
        matches!(self, SpendDecision::Admissible)
    }
}

/// Admissible iff `0 <= amount <= credit`.
///
/// The sign is checked first: a negative sell would raise the balance.
pub fn check_spend(snapshot: &LockedAccount, amount: Credit) -> SpendDecision {
    if amount < 0 {
        return SpendDecision::Rejected(RejectReason::NegativeAmount);
    }
    if amount > snapshot.credit() {
        return SpendDecision::Rejected(RejectReason::InsufficientBalance);
    }
    SpendDecision::Admissible
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::types::Account;
    use chrono::Utc;

    fn locked(credit: Credit) -> LockedAccount {
        LockedAccount::new(Account {
            seller_id: 1,
            username: "test1".to_string(),
            credit,
            is_active: true,
            updated_at: Utc::now(),
        })
    }

    #[test]
    fn test_exact_balance_is_admissible() {
        assert_eq!(check_spend(&locked(80), 80), SpendDecision::Admissible);
        assert_eq!(check_spend(&locked(80), 0), SpendDecision::Admissible);
    }

    #[test]
    fn test_over_balance_rejected() {
        assert_eq!(
            check_spend(&locked(80), 90),
            SpendDecision::Rejected(RejectReason::InsufficientBalance)
        );
        assert_eq!(
            check_spend(&locked(0), 1),
            SpendDecision::Rejected(RejectReason::InsufficientBalance)
        );
    }

    #[test]
    fn test_negative_rejected_even_with_balance() {
        assert_eq!(
            check_spend(&locked(1_000), -5),
            SpendDecision::Rejected(RejectReason::NegativeAmount)
        );
        // Sign wins over sufficiency
        assert_eq!(
            check_spend(&locked(0), -5),
            SpendDecision::Rejected(RejectReason::NegativeAmount)
        );
    }

    #[test]
    fn test_reason_maps_to_ledger_error() {
        assert_eq!(
            LedgerError::from(RejectReason::InsufficientBalance),
            LedgerError::InsufficientBalance
        );
        assert_eq!(RejectReason::NegativeAmount.code(), "NEGATIVE_AMOUNT");
        assert_eq!(
            RejectReason::try_from(&LedgerError::InsufficientBalance),
            Ok(RejectReason::InsufficientBalance)
        );
        assert!(RejectReason::try_from(&LedgerError::LockTimeout).is_err());
    }
}
