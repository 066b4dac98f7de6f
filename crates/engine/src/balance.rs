//! Balance ledger.
//!
//! The one mapping from a transaction kind to its effect on a wallet's stored
//! balance. Every write path (create, update, delete, transfer cascade, debts)
//! goes through [`apply`] and [`revert`] so the mapping cannot drift between
//! callers.
//!
//! | kind                | effect on balance |
//! |---------------------|-------------------|
//! | `income`            | `+amount`         |
//! | `expense`           | `-amount`         |
//! | `transfer_in`       | `+amount`         |
//! | `transfer_out`      | `-amount`         |
//! | `saving_allocation` | none              |
//!
//! There is no floor: an expense larger than the balance leaves it negative.

use crate::{EngineError, ResultEngine, TransactionKind};

/// Signed change a transaction of `kind` makes to its wallet.
pub fn signed_delta(kind: TransactionKind, amount_minor: i64) -> i64 {
    match kind {
        TransactionKind::Income | TransactionKind::TransferIn => amount_minor,
        TransactionKind::Expense | TransactionKind::TransferOut => -amount_minor,
        TransactionKind::SavingAllocation => 0,
    }
}

/// Balance after recording a transaction.
pub fn apply(balance_minor: i64, kind: TransactionKind, amount_minor: i64) -> ResultEngine<i64> {
    balance_minor
        .checked_add(signed_delta(kind, amount_minor))
        .ok_or_else(overflow)
}

/// Balance after undoing a previously applied transaction.
pub fn revert(balance_minor: i64, kind: TransactionKind, amount_minor: i64) -> ResultEngine<i64> {
    balance_minor
        .checked_sub(signed_delta(kind, amount_minor))
        .ok_or_else(overflow)
}

fn overflow() -> EngineError {
    EngineError::InvalidAmount("wallet balance overflow".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const KINDS: [TransactionKind; 5] = [
        TransactionKind::Income,
        TransactionKind::Expense,
        TransactionKind::TransferIn,
        TransactionKind::TransferOut,
        TransactionKind::SavingAllocation,
    ];

    #[test]
    fn income_and_transfer_in_credit() {
        assert_eq!(apply(1000, TransactionKind::Income, 250).unwrap(), 1250);
        assert_eq!(apply(1000, TransactionKind::TransferIn, 250).unwrap(), 1250);
    }

    #[test]
    fn expense_and_transfer_out_debit() {
        assert_eq!(apply(1000, TransactionKind::Expense, 250).unwrap(), 750);
        assert_eq!(apply(1000, TransactionKind::TransferOut, 250).unwrap(), 750);
    }

    #[test]
    fn expense_may_go_negative() {
        assert_eq!(apply(100, TransactionKind::Expense, 250).unwrap(), -150);
    }

    #[test]
    fn saving_allocation_leaves_balance_alone() {
        assert_eq!(
            apply(1000, TransactionKind::SavingAllocation, 250).unwrap(),
            1000
        );
        assert_eq!(
            revert(1000, TransactionKind::SavingAllocation, 250).unwrap(),
            1000
        );
    }

    #[test]
    fn revert_undoes_apply_for_every_kind() {
        for kind in KINDS {
            for (balance, amount) in [(0, 1), (1000, 250), (-500, 999), (i64::MAX - 10, 5)] {
                let applied = apply(balance, kind, amount).unwrap();
                assert_eq!(revert(applied, kind, amount).unwrap(), balance, "{kind:?}");
                let reverted = revert(balance, kind, amount).unwrap();
                assert_eq!(apply(reverted, kind, amount).unwrap(), balance, "{kind:?}");
            }
        }
    }

    #[test]
    fn overflow_is_an_invalid_amount() {
        let err = apply(i64::MAX, TransactionKind::Income, 1).unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidAmount("wallet balance overflow".to_string())
        );
    }
}
