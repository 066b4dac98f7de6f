use sea_orm::{ActiveValue, ConnectionTrait, DatabaseTransaction, prelude::*};
use uuid::Uuid;

use crate::{
    Category, EngineError, ResultEngine, Transaction, TransactionDetail, TransactionInput,
    transactions, util::normalize_optional_text,
};

use super::{
    Effect, Engine, ensure_free_standing, require_category, require_transaction, require_wallet,
    shift_wallet_balance, wallet_snapshot,
};

impl Engine {
    /// Records an income, expense or saving allocation and applies its
    /// effect to the wallet.
    ///
    /// Transfer halves are only created through [`Engine::transfer`].
    pub async fn create_transaction(
        &self,
        user_id: &str,
        input: TransactionInput,
    ) -> ResultEngine<TransactionDetail> {
        if input.kind.is_transfer() {
            return Err(EngineError::InvalidKind(
                "transfer transactions are created through transfer".to_string(),
            ));
        }
        let mut tx = Transaction::new(
            user_id.to_string(),
            input.wallet_id,
            input.category_id,
            input.kind,
            input.amount_minor,
            input.occurred_at,
        )?;
        tx.description = normalize_optional_text(input.description.as_deref());
        tx.attachment = normalize_optional_text(input.attachment.as_deref());
        let user_id = user_id.to_string();

        self.with_tx(|_engine, db_tx| {
            Box::pin(async move {
                require_wallet(db_tx, &user_id, tx.wallet_id).await?;
                require_category(db_tx, &user_id, tx.category_id).await?;

                transactions::ActiveModel::from(&tx).insert(db_tx).await?;
                let balance = shift_wallet_balance(
                    db_tx,
                    tx.wallet_id,
                    tx.kind,
                    tx.amount_minor,
                    Effect::Apply,
                )
                .await?;
                tracing::debug!(
                    transaction_id = %tx.id,
                    wallet_id = %tx.wallet_id,
                    balance,
                    "transaction created"
                );
                transaction_detail(db_tx, &user_id, tx).await
            })
        })
        .await
    }

    /// Rewrites a transaction and moves its balance effect accordingly.
    ///
    /// The old effect is reverted on the old wallet and the new one applied
    /// on the (possibly different) new wallet. Editing either half of a
    /// transfer carries amount, date and description over to the other half.
    pub async fn update_transaction(
        &self,
        user_id: &str,
        transaction_id: Uuid,
        input: TransactionInput,
    ) -> ResultEngine<TransactionDetail> {
        if input.amount_minor <= 0 {
            return Err(EngineError::InvalidAmount(
                "amount_minor must be > 0".to_string(),
            ));
        }
        let user_id = user_id.to_string();
        self.with_tx(|_engine, db_tx| {
            Box::pin(async move {
                let existing = require_transaction(db_tx, &user_id, transaction_id).await?;
                ensure_free_standing(db_tx, transaction_id).await?;
                let old = Transaction::try_from(existing)?;

                if old.kind.is_transfer() != input.kind.is_transfer()
                    || (old.kind.is_transfer() && old.kind != input.kind)
                {
                    return Err(EngineError::InvalidKind(format!(
                        "cannot change a {} transaction into {}",
                        old.kind.as_str(),
                        input.kind.as_str()
                    )));
                }
                require_wallet(db_tx, &user_id, input.wallet_id).await?;
                require_category(db_tx, &user_id, input.category_id).await?;

                shift_wallet_balance(
                    db_tx,
                    old.wallet_id,
                    old.kind,
                    old.amount_minor,
                    Effect::Revert,
                )
                .await?;

                let mut updated = old.clone();
                updated.wallet_id = input.wallet_id;
                updated.category_id = input.category_id;
                updated.kind = input.kind;
                updated.amount_minor = input.amount_minor;
                updated.occurred_at = input.occurred_at;
                updated.description = normalize_optional_text(input.description.as_deref());
                if let Some(attachment) = normalize_optional_text(input.attachment.as_deref()) {
                    updated.attachment = Some(attachment);
                }
                transactions::ActiveModel::from(&updated).update(db_tx).await?;

                shift_wallet_balance(
                    db_tx,
                    updated.wallet_id,
                    updated.kind,
                    updated.amount_minor,
                    Effect::Apply,
                )
                .await?;

                if let Some(related_id) = updated.related_transaction_id {
                    cascade_to_counterpart(db_tx, &user_id, related_id, &updated).await?;
                }

                tracing::debug!(transaction_id = %updated.id, "transaction updated");
                transaction_detail(db_tx, &user_id, updated).await
            })
        })
        .await
    }

    /// Reverts a transaction's effect and deletes it, together with its
    /// transfer counterpart when it has one.
    pub async fn delete_transaction(&self, user_id: &str, transaction_id: Uuid) -> ResultEngine<()> {
        let user_id = user_id.to_string();
        self.with_tx(|_engine, db_tx| {
            Box::pin(async move {
                let existing = require_transaction(db_tx, &user_id, transaction_id).await?;
                ensure_free_standing(db_tx, transaction_id).await?;
                let tx = Transaction::try_from(existing)?;

                revert_and_remove(db_tx, &tx).await?;

                if let Some(related_id) = tx.related_transaction_id
                    && let Some(counterpart) =
                        load_counterpart(db_tx, &user_id, tx.id, related_id).await?
                {
                    revert_and_remove(db_tx, &counterpart).await?;
                }

                tracing::debug!(transaction_id = %tx.id, "transaction deleted");
                Ok(())
            })
        })
        .await
    }

    /// Transaction with its wallet and category.
    pub async fn transaction(
        &self,
        user_id: &str,
        transaction_id: Uuid,
    ) -> ResultEngine<TransactionDetail> {
        let model = require_transaction(&self.database, user_id, transaction_id).await?;
        transaction_detail(&self.database, user_id, Transaction::try_from(model)?).await
    }
}

async fn revert_and_remove(db_tx: &DatabaseTransaction, tx: &Transaction) -> ResultEngine<()> {
    shift_wallet_balance(db_tx, tx.wallet_id, tx.kind, tx.amount_minor, Effect::Revert).await?;
    transactions::Entity::delete_by_id(tx.id).exec(db_tx).await?;
    Ok(())
}

/// The other half of a transfer.
///
/// A missing half is logged and skipped; a half owned by someone else is
/// `NotFound`, as if the caller had addressed it directly.
async fn load_counterpart(
    db_tx: &DatabaseTransaction,
    user_id: &str,
    transaction_id: Uuid,
    related_id: Uuid,
) -> ResultEngine<Option<Transaction>> {
    let Some(model) = transactions::Entity::find_by_id(related_id).one(db_tx).await? else {
        tracing::warn!(
            transaction_id = %transaction_id,
            related_id = %related_id,
            "transfer counterpart missing"
        );
        return Ok(None);
    };
    if model.user_id != user_id {
        return Err(EngineError::NotFound(format!("transaction {related_id}")));
    }
    Transaction::try_from(model).map(Some)
}

/// Bring the other half of a transfer in line with an edited half.
async fn cascade_to_counterpart(
    db_tx: &DatabaseTransaction,
    user_id: &str,
    related_id: Uuid,
    edited: &Transaction,
) -> ResultEngine<()> {
    let Some(counterpart) = load_counterpart(db_tx, user_id, edited.id, related_id).await? else {
        return Ok(());
    };

    shift_wallet_balance(
        db_tx,
        counterpart.wallet_id,
        counterpart.kind,
        counterpart.amount_minor,
        Effect::Revert,
    )
    .await?;
    shift_wallet_balance(
        db_tx,
        counterpart.wallet_id,
        counterpart.kind,
        edited.amount_minor,
        Effect::Apply,
    )
    .await?;

    transactions::ActiveModel {
        id: ActiveValue::Set(counterpart.id),
        amount_minor: ActiveValue::Set(edited.amount_minor),
        occurred_at: ActiveValue::Set(edited.occurred_at),
        description: ActiveValue::Set(edited.description.clone()),
        ..Default::default()
    }
    .update(db_tx)
    .await?;
    Ok(())
}

pub(super) async fn transaction_detail<C: ConnectionTrait>(
    db: &C,
    user_id: &str,
    transaction: Transaction,
) -> ResultEngine<TransactionDetail> {
    let wallet = require_wallet(db, user_id, transaction.wallet_id).await?;
    let wallet = wallet_snapshot(db, wallet).await?;
    let category = require_category(db, user_id, transaction.category_id).await?;
    Ok(TransactionDetail {
        transaction,
        wallet,
        category: Category::try_from(category)?,
    })
}

