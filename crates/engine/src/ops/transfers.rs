use sea_orm::prelude::*;
use uuid::Uuid;

use crate::{
    ResultEngine, SystemCategory, Transaction, TransactionKind, TransferCmd, TransferPair,
    transactions, util::normalize_optional_text,
};

use super::{Effect, Engine, require_wallet, shift_wallet_balance};

impl Engine {
    /// Moves money between two wallets of the same user.
    ///
    /// Records a `transfer_out` on the source and a `transfer_in` on the
    /// destination, each pointing at the other. `from == to` is accepted and
    /// nets to zero.
    pub async fn transfer(&self, user_id: &str, cmd: TransferCmd) -> ResultEngine<TransferPair> {
        let description = normalize_optional_text(cmd.description.as_deref());
        let mut outgoing = Transaction::new(
            user_id.to_string(),
            cmd.from_wallet_id,
            Uuid::nil(),
            TransactionKind::TransferOut,
            cmd.amount_minor,
            cmd.occurred_at,
        )?;
        let mut incoming = Transaction::new(
            user_id.to_string(),
            cmd.to_wallet_id,
            Uuid::nil(),
            TransactionKind::TransferIn,
            cmd.amount_minor,
            cmd.occurred_at,
        )?;
        outgoing.related_transaction_id = Some(incoming.id);
        incoming.related_transaction_id = Some(outgoing.id);
        outgoing.description = description.clone();
        incoming.description = description;

        let user_id = user_id.to_string();
        self.with_tx(|engine, db_tx| {
            Box::pin(async move {
                require_wallet(db_tx, &user_id, outgoing.wallet_id).await?;
                require_wallet(db_tx, &user_id, incoming.wallet_id).await?;
                let category = engine
                    .resolve_system_category(db_tx, &user_id, SystemCategory::Transfer)
                    .await?;
                outgoing.category_id = category.id;
                incoming.category_id = category.id;

                for half in [&outgoing, &incoming] {
                    transactions::ActiveModel::from(half).insert(db_tx).await?;
                    shift_wallet_balance(
                        db_tx,
                        half.wallet_id,
                        half.kind,
                        half.amount_minor,
                        Effect::Apply,
                    )
                    .await?;
                }

                tracing::debug!(
                    outgoing = %outgoing.id,
                    incoming = %incoming.id,
                    amount_minor = outgoing.amount_minor,
                    "transfer recorded"
                );
                Ok(TransferPair { outgoing, incoming })
            })
        })
        .await
    }
}
