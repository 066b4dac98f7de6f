use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_PAYMENT_NOTE: &str = "Pembayaran Cicilan";

/// One installment against a debt. Owns exactly one transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebtPayment {
    pub id: Uuid,
    pub debt_id: Uuid,
    pub transaction_id: Uuid,
    /// Wallet the money moved through; may differ from the debt's wallet.
    pub wallet_id: Uuid,
    pub amount_minor: i64,
    pub paid_at: DateTime<Utc>,
    pub note: String,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "debt_payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub debt_id: Uuid,
    #[sea_orm(unique)]
    pub transaction_id: Uuid,
    pub wallet_id: Uuid,
    pub amount_minor: i64,
    pub paid_at: DateTimeUtc,
    pub note: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::debts::Entity",
        from = "Column::DebtId",
        to = "super::debts::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Debt,
}

impl Related<super::debts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Debt.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&DebtPayment> for ActiveModel {
    fn from(payment: &DebtPayment) -> Self {
        Self {
            id: ActiveValue::Set(payment.id),
            debt_id: ActiveValue::Set(payment.debt_id),
            transaction_id: ActiveValue::Set(payment.transaction_id),
            wallet_id: ActiveValue::Set(payment.wallet_id),
            amount_minor: ActiveValue::Set(payment.amount_minor),
            paid_at: ActiveValue::Set(payment.paid_at),
            note: ActiveValue::Set(payment.note.clone()),
        }
    }
}

impl From<Model> for DebtPayment {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            debt_id: model.debt_id,
            transaction_id: model.transaction_id,
            wallet_id: model.wallet_id,
            amount_minor: model.amount_minor,
            paid_at: model.paid_at,
            note: model.note,
        }
    }
}
