use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder,
    prelude::*,
    sea_query::{Expr, Func},
};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, Wallet, WalletKind, debt_payments, debts, saving_contributions,
    transactions, users, util::normalize_required_name, wallets,
};

use super::{Engine, require_wallet, wallet_snapshot};

impl Engine {
    /// Return a wallet snapshot, `available_balance` included.
    pub async fn wallet(&self, user_id: &str, wallet_id: Uuid) -> ResultEngine<Wallet> {
        let model = require_wallet(&self.database, user_id, wallet_id).await?;
        wallet_snapshot(&self.database, model).await
    }

    /// Every wallet of the user, ordered by name.
    pub async fn wallets(&self, user_id: &str) -> ResultEngine<Vec<Wallet>> {
        let models = wallets::Entity::find()
            .filter(wallets::Column::UserId.eq(user_id))
            .order_by_asc(wallets::Column::Name)
            .all(&self.database)
            .await?;
        let mut out = Vec::with_capacity(models.len());
        for model in models {
            out.push(wallet_snapshot(&self.database, model).await?);
        }
        Ok(out)
    }

    /// Add a new wallet.
    ///
    /// `opening_balance_minor` is the wallet's initial state: it is stored
    /// as-is and no transaction is recorded for it.
    pub async fn new_wallet(
        &self,
        user_id: &str,
        name: &str,
        kind: WalletKind,
        opening_balance_minor: i64,
    ) -> ResultEngine<Wallet> {
        let name = normalize_required_name(name, "wallet")?;
        let user_id = user_id.to_string();
        self.with_tx(|_engine, db_tx| {
            Box::pin(async move {
                users::Entity::find_by_id(user_id.clone())
                    .one(db_tx)
                    .await?
                    .ok_or_else(|| EngineError::NotFound(format!("user {user_id}")))?;

                if name_taken(db_tx, &user_id, &name, None).await? {
                    return Err(EngineError::ExistingKey(name));
                }

                let wallet = Wallet::new(user_id, name, kind, opening_balance_minor);
                wallets::ActiveModel::from(&wallet).insert(db_tx).await?;
                tracing::debug!(wallet_id = %wallet.id, user = %wallet.user_id, "wallet created");
                Ok(wallet)
            })
        })
        .await
    }

    /// Renames a wallet and changes its kind.
    ///
    /// The balance is only ever moved by transactions, so it is not part of
    /// the update.
    pub async fn update_wallet(
        &self,
        user_id: &str,
        wallet_id: Uuid,
        name: &str,
        kind: WalletKind,
    ) -> ResultEngine<Wallet> {
        let name = normalize_required_name(name, "wallet")?;
        let user_id = user_id.to_string();
        self.with_tx(|_engine, db_tx| {
            Box::pin(async move {
                require_wallet(db_tx, &user_id, wallet_id).await?;
                if name_taken(db_tx, &user_id, &name, Some(wallet_id)).await? {
                    return Err(EngineError::ExistingKey(name));
                }

                let model = wallets::ActiveModel {
                    id: ActiveValue::Set(wallet_id),
                    name: ActiveValue::Set(name),
                    kind: ActiveValue::Set(kind.as_str().to_string()),
                    ..Default::default()
                }
                .update(db_tx)
                .await?;
                tracing::debug!(wallet_id = %wallet_id, "wallet updated");
                wallet_snapshot(db_tx, model).await
            })
        })
        .await
    }

    /// Deletes a wallet nothing refers to.
    ///
    /// A wallet with transactions, debts, debt payments or savings
    /// contributions is a `Conflict`: its balance is the sum of that history.
    pub async fn delete_wallet(&self, user_id: &str, wallet_id: Uuid) -> ResultEngine<()> {
        let user_id = user_id.to_string();
        self.with_tx(|_engine, db_tx| {
            Box::pin(async move {
                require_wallet(db_tx, &user_id, wallet_id).await?;

                let in_use = transactions::Entity::find()
                    .filter(transactions::Column::WalletId.eq(wallet_id))
                    .one(db_tx)
                    .await?
                    .is_some()
                    || debts::Entity::find()
                        .filter(debts::Column::WalletId.eq(wallet_id))
                        .one(db_tx)
                        .await?
                        .is_some()
                    || debt_payments::Entity::find()
                        .filter(debt_payments::Column::WalletId.eq(wallet_id))
                        .one(db_tx)
                        .await?
                        .is_some()
                    || saving_contributions::Entity::find()
                        .filter(saving_contributions::Column::WalletId.eq(wallet_id))
                        .one(db_tx)
                        .await?
                        .is_some();
                if in_use {
                    return Err(EngineError::Conflict(format!("wallet {wallet_id} is in use")));
                }

                wallets::Entity::delete_by_id(wallet_id).exec(db_tx).await?;
                tracing::debug!(wallet_id = %wallet_id, "wallet deleted");
                Ok(())
            })
        })
        .await
    }
}

/// Whether another wallet of the user already has `name`, ignoring case.
async fn name_taken(
    db_tx: &DatabaseTransaction,
    user_id: &str,
    name: &str,
    except: Option<Uuid>,
) -> ResultEngine<bool> {
    let mut query = wallets::Entity::find()
        .filter(wallets::Column::UserId.eq(user_id))
        .filter(
            Expr::expr(Func::lower(Expr::col(wallets::Column::Name))).eq(name.to_lowercase()),
        );
    if let Some(wallet_id) = except {
        query = query.filter(wallets::Column::Id.ne(wallet_id));
    }
    Ok(query.one(db_tx).await?.is_some())
}
