//! Debt ledger operations.
//!
//! Every operation keeps `remaining_minor ∈ [0, amount_minor]` and
//! `is_paid ⇔ remaining_minor == 0`, and moves wallet balances only through
//! the debt's opening or settlement kind.

use chrono::Utc;
use sea_orm::{
    ActiveValue, ConnectionTrait, DatabaseTransaction, QueryFilter, QueryOrder, prelude::*,
    sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    DEFAULT_PAYMENT_NOTE, Debt, DebtKind, DebtPayment, EngineError, NewDebtCmd, PayDebtCmd,
    ResultEngine, Transaction, UpdateDebtCmd, debt_payments, debts, transactions,
    util::{normalize_optional_text, normalize_required_name, require_positive_amount},
};

use super::{Effect, Engine, require_wallet, shift_wallet_balance};

impl Engine {
    /// Opens a debt (payable) or receivable and records its opening
    /// transaction against the wallet.
    pub async fn create_debt(&self, user_id: &str, cmd: NewDebtCmd) -> ResultEngine<Debt> {
        let name = normalize_required_name(&cmd.name, "debt")?;
        require_positive_amount(cmd.amount_minor, "amount_minor")?;
        let description = normalize_optional_text(cmd.description.as_deref());
        let user_id = user_id.to_string();
        self.with_tx(|engine, db_tx| {
            Box::pin(async move {
                require_wallet(db_tx, &user_id, cmd.wallet_id).await?;
                let category = engine
                    .resolve_system_category(db_tx, &user_id, cmd.kind.opening_category())
                    .await?;

                let mut debt = Debt {
                    id: Uuid::new_v4(),
                    user_id: user_id.clone(),
                    wallet_id: cmd.wallet_id,
                    transaction_id: Uuid::nil(),
                    name,
                    description,
                    amount_minor: cmd.amount_minor,
                    remaining_minor: cmd.amount_minor,
                    kind: cmd.kind,
                    is_paid: false,
                    due_date: cmd.due_date,
                    created_at: Utc::now(),
                    payments: Vec::new(),
                };

                let mut tx = Transaction::new(
                    user_id,
                    cmd.wallet_id,
                    category.id,
                    cmd.kind.opening_kind(),
                    cmd.amount_minor,
                    cmd.occurred_at,
                )?;
                tx.description = Some(debt.opening_description());
                transactions::ActiveModel::from(&tx).insert(db_tx).await?;
                shift_wallet_balance(db_tx, tx.wallet_id, tx.kind, tx.amount_minor, Effect::Apply)
                    .await?;

                debt.transaction_id = tx.id;
                debts::ActiveModel::from(&debt).insert(db_tx).await?;
                tracing::debug!(debt_id = %debt.id, kind = debt.kind.as_str(), "debt created");
                Ok(debt)
            })
        })
        .await
    }

    /// Records an installment: lowers `remaining_minor` and moves the money
    /// through the payment wallet in the settlement direction.
    pub async fn pay_debt(
        &self,
        user_id: &str,
        debt_id: Uuid,
        cmd: PayDebtCmd,
    ) -> ResultEngine<DebtPayment> {
        let note = normalize_optional_text(cmd.note.as_deref());
        let user_id = user_id.to_string();
        self.with_tx(|engine, db_tx| {
            Box::pin(async move {
                let mut debt = load_debt(db_tx, &user_id, debt_id).await?;
                if debt.is_paid {
                    return Err(EngineError::AlreadyPaid(format!("debt {debt_id}")));
                }
                if cmd.amount_minor <= 0 || cmd.amount_minor > debt.remaining_minor {
                    return Err(EngineError::InvalidAmount(format!(
                        "payment must be between 1 and {}",
                        debt.remaining_minor
                    )));
                }
                require_wallet(db_tx, &user_id, cmd.wallet_id).await?;

                debt.remaining_minor -= cmd.amount_minor;
                debt.is_paid = debt.remaining_minor == 0;
                save_progress(db_tx, &debt).await?;

                let category = engine
                    .resolve_system_category(db_tx, &user_id, debt.kind.settlement_category())
                    .await?;
                let mut tx = Transaction::new(
                    user_id,
                    cmd.wallet_id,
                    category.id,
                    debt.kind.settlement_kind(),
                    cmd.amount_minor,
                    cmd.paid_at,
                )?;
                tx.description = Some(debt.payment_description(note.as_deref()));
                transactions::ActiveModel::from(&tx).insert(db_tx).await?;
                shift_wallet_balance(db_tx, tx.wallet_id, tx.kind, tx.amount_minor, Effect::Apply)
                    .await?;

                let payment = DebtPayment {
                    id: Uuid::new_v4(),
                    debt_id,
                    transaction_id: tx.id,
                    wallet_id: cmd.wallet_id,
                    amount_minor: cmd.amount_minor,
                    paid_at: cmd.paid_at,
                    note: note.unwrap_or_else(|| DEFAULT_PAYMENT_NOTE.to_string()),
                };
                debt_payments::ActiveModel::from(&payment).insert(db_tx).await?;
                tracing::debug!(
                    debt_id = %debt_id,
                    payment_id = %payment.id,
                    remaining_minor = debt.remaining_minor,
                    "debt payment recorded"
                );
                Ok(payment)
            })
        })
        .await
    }

    /// Rewrites a debt's name, amount, wallet and dates.
    ///
    /// The opening effect moves from the old (wallet, amount) to the new one
    /// and the opening transaction is rewritten to match. What was already
    /// paid stays paid.
    pub async fn update_debt(
        &self,
        user_id: &str,
        debt_id: Uuid,
        cmd: UpdateDebtCmd,
    ) -> ResultEngine<Debt> {
        let name = normalize_required_name(&cmd.name, "debt")?;
        require_positive_amount(cmd.amount_minor, "amount_minor")?;
        let description = normalize_optional_text(cmd.description.as_deref());
        let user_id = user_id.to_string();
        self.with_tx(|_engine, db_tx| {
            Box::pin(async move {
                let mut debt = load_debt(db_tx, &user_id, debt_id).await?;
                let paid = debt.paid_minor();
                if cmd.amount_minor < paid {
                    return Err(EngineError::InvalidAmount(format!(
                        "amount_minor must be >= already paid {paid}"
                    )));
                }
                require_wallet(db_tx, &user_id, cmd.wallet_id).await?;

                let opening_kind = debt.kind.opening_kind();
                shift_wallet_balance(
                    db_tx,
                    debt.wallet_id,
                    opening_kind,
                    debt.amount_minor,
                    Effect::Revert,
                )
                .await?;
                shift_wallet_balance(
                    db_tx,
                    cmd.wallet_id,
                    opening_kind,
                    cmd.amount_minor,
                    Effect::Apply,
                )
                .await?;

                debt.name = name;
                debt.description = description;
                debt.wallet_id = cmd.wallet_id;
                debt.amount_minor = cmd.amount_minor;
                debt.remaining_minor = cmd.amount_minor - paid;
                debt.is_paid = debt.remaining_minor == 0;
                debt.due_date = cmd.due_date;
                debts::ActiveModel::from(&debt).update(db_tx).await?;

                match transactions::Entity::find_by_id(debt.transaction_id)
                    .one(db_tx)
                    .await?
                {
                    Some(_) => {
                        transactions::ActiveModel {
                            id: ActiveValue::Set(debt.transaction_id),
                            wallet_id: ActiveValue::Set(debt.wallet_id),
                            amount_minor: ActiveValue::Set(debt.amount_minor),
                            description: ActiveValue::Set(Some(debt.opening_description())),
                            ..Default::default()
                        }
                        .update(db_tx)
                        .await?;
                    }
                    None => tracing::warn!(
                        debt_id = %debt.id,
                        transaction_id = %debt.transaction_id,
                        "opening transaction missing, debt updated alone"
                    ),
                }

                tracing::debug!(debt_id = %debt.id, amount_minor = debt.amount_minor, "debt updated");
                Ok(debt)
            })
        })
        .await
    }

    /// Deletes a debt and its payment records.
    ///
    /// Only the outstanding `remaining_minor` is reverted on the debt's
    /// wallet. Payment transactions stay in the ledger as they are; the
    /// opening transaction is cut down to the settled amount, or removed when
    /// nothing was paid, so the remaining rows add up to the wallet balance.
    pub async fn delete_debt(&self, user_id: &str, debt_id: Uuid) -> ResultEngine<()> {
        let user_id = user_id.to_string();
        self.with_tx(|_engine, db_tx| {
            Box::pin(async move {
                let debt = load_debt(db_tx, &user_id, debt_id).await?;
                shift_wallet_balance(
                    db_tx,
                    debt.wallet_id,
                    debt.kind.opening_kind(),
                    debt.remaining_minor,
                    Effect::Revert,
                )
                .await?;
                debt_payments::Entity::delete_many()
                    .filter(debt_payments::Column::DebtId.eq(debt_id))
                    .exec(db_tx)
                    .await?;
                debts::Entity::delete_by_id(debt_id).exec(db_tx).await?;

                // The opening transaction keeps only the settled part, which
                // is exactly what is still applied to the wallet.
                let settled = debt.paid_minor();
                if settled == 0 {
                    transactions::Entity::delete_by_id(debt.transaction_id)
                        .exec(db_tx)
                        .await?;
                } else {
                    transactions::Entity::update_many()
                        .col_expr(transactions::Column::AmountMinor, Expr::value(settled))
                        .filter(transactions::Column::Id.eq(debt.transaction_id))
                        .exec(db_tx)
                        .await?;
                }
                tracing::debug!(debt_id = %debt_id, "debt deleted");
                Ok(())
            })
        })
        .await
    }

    /// Undoes one payment: its wallet effect, its share of progress, the
    /// payment row and its transaction.
    pub async fn delete_debt_payment(&self, user_id: &str, payment_id: Uuid) -> ResultEngine<()> {
        let user_id = user_id.to_string();
        self.with_tx(|_engine, db_tx| {
            Box::pin(async move {
                let payment: DebtPayment = debt_payments::Entity::find_by_id(payment_id)
                    .one(db_tx)
                    .await?
                    .ok_or_else(|| EngineError::NotFound(format!("debt payment {payment_id}")))?
                    .into();
                let debt_model = debts::Entity::find_by_id(payment.debt_id)
                    .one(db_tx)
                    .await?
                    .ok_or_else(|| EngineError::NotFound(format!("debt {}", payment.debt_id)))?;
                if debt_model.user_id != user_id {
                    return Err(EngineError::Unauthorized(format!(
                        "debt payment {payment_id}"
                    )));
                }
                let mut debt = Debt::try_from((debt_model, Vec::new()))?;

                shift_wallet_balance(
                    db_tx,
                    payment.wallet_id,
                    debt.kind.settlement_kind(),
                    payment.amount_minor,
                    Effect::Revert,
                )
                .await?;

                debt.remaining_minor = debt
                    .remaining_minor
                    .checked_add(payment.amount_minor)
                    .filter(|remaining| *remaining <= debt.amount_minor)
                    .ok_or_else(|| {
                        EngineError::InvalidAmount(format!(
                            "payment {payment_id} exceeds debt amount"
                        ))
                    })?;
                debt.is_paid = debt.remaining_minor == 0;
                save_progress(db_tx, &debt).await?;

                debt_payments::Entity::delete_by_id(payment_id)
                    .exec(db_tx)
                    .await?;
                transactions::Entity::delete_by_id(payment.transaction_id)
                    .exec(db_tx)
                    .await?;
                tracing::debug!(
                    debt_id = %debt.id,
                    payment_id = %payment_id,
                    remaining_minor = debt.remaining_minor,
                    "debt payment deleted"
                );
                Ok(())
            })
        })
        .await
    }

    /// A debt with its payments, oldest first.
    pub async fn debt(&self, user_id: &str, debt_id: Uuid) -> ResultEngine<Debt> {
        load_debt(&self.database, user_id, debt_id).await
    }

    /// The user's debts, newest first, optionally of one kind.
    pub async fn debts(&self, user_id: &str, kind: Option<DebtKind>) -> ResultEngine<Vec<Debt>> {
        let mut query = debts::Entity::find().filter(debts::Column::UserId.eq(user_id));
        if let Some(kind) = kind {
            query = query.filter(debts::Column::Kind.eq(kind.as_str()));
        }
        let models = query
            .order_by_desc(debts::Column::CreatedAt)
            .all(&self.database)
            .await?;
        let mut out = Vec::with_capacity(models.len());
        for model in models {
            let payments = load_payments(&self.database, model.id).await?;
            out.push(Debt::try_from((model, payments))?);
        }
        Ok(out)
    }
}

async fn load_debt<C: ConnectionTrait>(
    db: &C,
    user_id: &str,
    debt_id: Uuid,
) -> ResultEngine<Debt> {
    let model = debts::Entity::find_by_id(debt_id)
        .filter(debts::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| EngineError::NotFound(format!("debt {debt_id}")))?;
    let payments = load_payments(db, debt_id).await?;
    Debt::try_from((model, payments))
}

async fn load_payments<C: ConnectionTrait>(
    db: &C,
    debt_id: Uuid,
) -> ResultEngine<Vec<DebtPayment>> {
    Ok(debt_payments::Entity::find()
        .filter(debt_payments::Column::DebtId.eq(debt_id))
        .order_by_asc(debt_payments::Column::PaidAt)
        .all(db)
        .await?
        .into_iter()
        .map(DebtPayment::from)
        .collect())
}

async fn save_progress(db_tx: &DatabaseTransaction, debt: &Debt) -> ResultEngine<()> {
    debts::ActiveModel {
        id: ActiveValue::Set(debt.id),
        remaining_minor: ActiveValue::Set(debt.remaining_minor),
        is_paid: ActiveValue::Set(debt.is_paid),
        ..Default::default()
    }
    .update(db_tx)
    .await?;
    Ok(())
}
