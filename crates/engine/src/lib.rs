//! Ledger consistency engine.
//!
//! Every operation that touches a transaction row and a wallet balance (and,
//! through them, a debt or a savings goal) runs as one database transaction:
//! either all of its writes land or none do.

pub use categories::{Category, CategoryKind, SystemCategory};
pub use commands::{
    ContributionCmd, NewCategoryCmd, NewDebtCmd, NewSavingGoalCmd, PayDebtCmd, TransactionInput,
    TransferCmd, UpdateCategoryCmd, UpdateDebtCmd,
};
pub use debt_payments::{DEFAULT_PAYMENT_NOTE, DebtPayment};
pub use debts::{Debt, DebtKind, DebtStatus};
pub use error::EngineError;
pub use ops::{Engine, EngineBuilder};
pub use saving_contributions::SavingContribution;
pub use saving_goals::SavingGoal;
pub use transactions::{Transaction, TransactionDetail, TransactionKind, TransferPair};
pub use wallets::{Wallet, WalletKind};

pub mod balance;
mod categories;
mod commands;
mod debt_payments;
mod debts;
mod error;
mod ops;
mod saving_contributions;
mod saving_goals;
mod transactions;
mod users;
mod util;
mod wallets;

pub type ResultEngine<T> = Result<T, EngineError>;
