use std::{future::Future, pin::Pin};

use sea_orm::{
    ActiveValue, ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbBackend,
    QueryFilter, Statement, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, TransactionKind, Wallet, balance, debt_payments,
    saving_contributions,
};

mod categories;
mod debts;
mod savings;
mod transactions;
mod transfers;
mod users;
mod wallets;

/// Boxed body of a unit of work, borrowing the engine and the open
/// database transaction.
pub(crate) type TxFuture<'a, T> = Pin<Box<dyn Future<Output = ResultEngine<T>> + Send + 'a>>;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Run `body` as one unit of work.
    ///
    /// Commits when the body returns `Ok`, rolls back otherwise and hands the
    /// body's error back unchanged. The body must issue every query through
    /// the transaction it is given.
    pub(crate) async fn with_tx<T, F>(&self, body: F) -> ResultEngine<T>
    where
        T: Send,
        F: for<'a> FnOnce(&'a Engine, &'a DatabaseTransaction) -> TxFuture<'a, T> + Send,
    {
        let db_tx = self.database.begin().await?;
        if let Err(err) = reserve_writer(&db_tx).await {
            if let Err(rollback_err) = db_tx.rollback().await {
                tracing::warn!(error = %rollback_err, "rollback failed");
            }
            return Err(err);
        }
        match body(self, &db_tx).await {
            Ok(value) => {
                db_tx.commit().await?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = db_tx.rollback().await {
                    tracing::warn!(error = %rollback_err, "rollback failed");
                }
                Err(err)
            }
        }
    }
}

/// Take SQLite's write lock before the unit of work reads anything.
///
/// A deferred transaction that reads and then writes cannot wait for a
/// concurrent writer: the upgrade fails at once with "database is locked".
/// A write as the first statement waits on the connection's busy timeout
/// instead, so concurrent units queue up. The statement matches no row.
async fn reserve_writer(db_tx: &DatabaseTransaction) -> ResultEngine<()> {
    let backend = db_tx.get_database_backend();
    if backend == DbBackend::Sqlite {
        db_tx
            .execute(Statement::from_string(
                backend,
                "UPDATE users SET username = username WHERE 0",
            ))
            .await?;
    }
    Ok(())
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
        })
    }
}

/// Load a wallet owned by `user_id`; anything else is `NotFound`.
async fn require_wallet<C: ConnectionTrait>(
    db: &C,
    user_id: &str,
    wallet_id: Uuid,
) -> ResultEngine<crate::wallets::Model> {
    crate::wallets::Entity::find_by_id(wallet_id)
        .filter(crate::wallets::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| EngineError::NotFound(format!("wallet {wallet_id}")))
}

async fn require_category<C: ConnectionTrait>(
    db: &C,
    user_id: &str,
    category_id: Uuid,
) -> ResultEngine<crate::categories::Model> {
    crate::categories::Entity::find_by_id(category_id)
        .filter(crate::categories::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| EngineError::NotFound(format!("category {category_id}")))
}

async fn require_transaction<C: ConnectionTrait>(
    db: &C,
    user_id: &str,
    transaction_id: Uuid,
) -> ResultEngine<crate::transactions::Model> {
    crate::transactions::Entity::find_by_id(transaction_id)
        .filter(crate::transactions::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| EngineError::NotFound(format!("transaction {transaction_id}")))
}

/// Wallet snapshot with `available_balance` filled in.
async fn wallet_snapshot<C: ConnectionTrait>(
    db: &C,
    model: crate::wallets::Model,
) -> ResultEngine<Wallet> {
    let earmarked = earmarked_minor(db, model.id).await?;
    Ok(Wallet::try_from(model)?.with_earmarked(earmarked))
}

/// Sum of savings contributions sourced from a wallet.
async fn earmarked_minor<C: ConnectionTrait>(db: &C, wallet_id: Uuid) -> ResultEngine<i64> {
    let contributions = saving_contributions::Entity::find()
        .filter(saving_contributions::Column::WalletId.eq(wallet_id))
        .all(db)
        .await?;
    contributions
        .iter()
        .try_fold(0i64, |acc, row| acc.checked_add(row.amount_minor))
        .ok_or_else(|| EngineError::InvalidAmount("earmarked total overflow".to_string()))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Effect {
    Apply,
    Revert,
}

/// Apply or revert one transaction's effect on a wallet's stored balance.
///
/// The wallet row is re-read on every call so several shifts against the
/// same wallet inside one unit of work compound correctly.
async fn shift_wallet_balance(
    db_tx: &DatabaseTransaction,
    wallet_id: Uuid,
    kind: TransactionKind,
    amount_minor: i64,
    effect: Effect,
) -> ResultEngine<i64> {
    let model = crate::wallets::Entity::find_by_id(wallet_id)
        .one(db_tx)
        .await?
        .ok_or_else(|| EngineError::NotFound(format!("wallet {wallet_id}")))?;
    let new_balance = match effect {
        Effect::Apply => balance::apply(model.balance, kind, amount_minor)?,
        Effect::Revert => balance::revert(model.balance, kind, amount_minor)?,
    };
    if new_balance != model.balance {
        let active = crate::wallets::ActiveModel {
            id: ActiveValue::Set(wallet_id),
            balance: ActiveValue::Set(new_balance),
            ..Default::default()
        };
        active.update(db_tx).await?;
    }
    Ok(new_balance)
}

/// Reject edits to transactions whose lifecycle belongs to a debt or a
/// savings contribution.
async fn ensure_free_standing(
    db_tx: &DatabaseTransaction,
    transaction_id: Uuid,
) -> ResultEngine<()> {
    let opening = crate::debts::Entity::find()
        .filter(crate::debts::Column::TransactionId.eq(transaction_id))
        .one(db_tx)
        .await?;
    let payment = debt_payments::Entity::find()
        .filter(debt_payments::Column::TransactionId.eq(transaction_id))
        .one(db_tx)
        .await?;
    if opening.is_some() || payment.is_some() {
        return Err(EngineError::Conflict(format!(
            "transaction {transaction_id} is managed by a debt"
        )));
    }
    let contribution = saving_contributions::Entity::find()
        .filter(saving_contributions::Column::TransactionId.eq(transaction_id))
        .one(db_tx)
        .await?;
    if contribution.is_some() {
        return Err(EngineError::Conflict(format!(
            "transaction {transaction_id} is managed by a savings contribution"
        )));
    }
    Ok(())
}
