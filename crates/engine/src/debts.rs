//! Debts and receivables.
//!
//! A payable debt is money the user borrowed (the opening transaction credits
//! the wallet); a receivable is money the user lent out (the opening
//! transaction debits it). Payments move the other way.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{DebtPayment, EngineError, ResultEngine, TransactionKind, categories::SystemCategory};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebtKind {
    Payable,
    Receivable,
}

impl DebtKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Payable => "payable",
            Self::Receivable => "receivable",
        }
    }

    /// Kind of the transaction recorded when the debt is opened.
    pub fn opening_kind(self) -> TransactionKind {
        match self {
            Self::Payable => TransactionKind::Income,
            Self::Receivable => TransactionKind::Expense,
        }
    }

    /// Kind of the transaction recorded for each payment.
    pub fn settlement_kind(self) -> TransactionKind {
        match self {
            Self::Payable => TransactionKind::Expense,
            Self::Receivable => TransactionKind::Income,
        }
    }

    pub(crate) fn opening_category(self) -> SystemCategory {
        match self {
            Self::Payable => SystemCategory::Debt,
            Self::Receivable => SystemCategory::Receivable,
        }
    }

    pub(crate) fn settlement_category(self) -> SystemCategory {
        match self {
            Self::Payable => SystemCategory::DebtRepayment,
            Self::Receivable => SystemCategory::ReceivableCollection,
        }
    }
}

impl TryFrom<&str> for DebtKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "payable" => Ok(Self::Payable),
            "receivable" => Ok(Self::Receivable),
            other => Err(EngineError::InvalidKind(format!(
                "invalid debt kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebtStatus {
    Open,
    PartiallyPaid,
    Paid,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Debt {
    pub id: Uuid,
    pub user_id: String,
    pub wallet_id: Uuid,
    /// Opening transaction recorded at creation.
    pub transaction_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub amount_minor: i64,
    pub remaining_minor: i64,
    pub kind: DebtKind,
    pub is_paid: bool,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub payments: Vec<DebtPayment>,
}

impl Debt {
    pub fn status(&self) -> DebtStatus {
        if self.is_paid {
            DebtStatus::Paid
        } else if self.remaining_minor < self.amount_minor {
            DebtStatus::PartiallyPaid
        } else {
            DebtStatus::Open
        }
    }

    pub fn paid_minor(&self) -> i64 {
        self.amount_minor - self.remaining_minor
    }

    /// Description written on the opening transaction.
    pub(crate) fn opening_description(&self) -> String {
        format!(
            "Debt/Receivable: {} - {}",
            self.name,
            self.description.as_deref().unwrap_or_default()
        )
    }

    /// Description written on a payment transaction.
    pub(crate) fn payment_description(&self, note: Option<&str>) -> String {
        match note {
            Some(note) => format!("Payment for: {} - {note}", self.name),
            None => format!(
                "Payment for: {} ({})",
                self.name,
                self.description.as_deref().unwrap_or_default()
            ),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "debts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: String,
    pub wallet_id: Uuid,
    pub transaction_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub amount_minor: i64,
    pub remaining_minor: i64,
    pub kind: String,
    pub is_paid: bool,
    pub due_date: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::debt_payments::Entity")]
    Payments,
    #[sea_orm(
        belongs_to = "super::wallets::Entity",
        from = "Column::WalletId",
        to = "super::wallets::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Wallet,
}

impl Related<super::debt_payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl Related<super::wallets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Wallet.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Debt> for ActiveModel {
    fn from(debt: &Debt) -> Self {
        Self {
            id: ActiveValue::Set(debt.id),
            user_id: ActiveValue::Set(debt.user_id.clone()),
            wallet_id: ActiveValue::Set(debt.wallet_id),
            transaction_id: ActiveValue::Set(debt.transaction_id),
            name: ActiveValue::Set(debt.name.clone()),
            description: ActiveValue::Set(debt.description.clone()),
            amount_minor: ActiveValue::Set(debt.amount_minor),
            remaining_minor: ActiveValue::Set(debt.remaining_minor),
            kind: ActiveValue::Set(debt.kind.as_str().to_string()),
            is_paid: ActiveValue::Set(debt.is_paid),
            due_date: ActiveValue::Set(debt.due_date),
            created_at: ActiveValue::Set(debt.created_at),
        }
    }
}

impl TryFrom<(Model, Vec<DebtPayment>)> for Debt {
    type Error = EngineError;

    fn try_from((model, payments): (Model, Vec<DebtPayment>)) -> ResultEngine<Self> {
        Ok(Self {
            id: model.id,
            user_id: model.user_id,
            wallet_id: model.wallet_id,
            transaction_id: model.transaction_id,
            name: model.name,
            description: model.description,
            amount_minor: model.amount_minor,
            remaining_minor: model.remaining_minor,
            kind: DebtKind::try_from(model.kind.as_str())?,
            is_paid: model.is_paid,
            due_date: model.due_date,
            created_at: model.created_at,
            payments,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn debt(amount_minor: i64, remaining_minor: i64) -> Debt {
        Debt {
            id: Uuid::new_v4(),
            user_id: "alice".to_string(),
            wallet_id: Uuid::new_v4(),
            transaction_id: Uuid::new_v4(),
            name: "Budi".to_string(),
            description: Some("motor".to_string()),
            amount_minor,
            remaining_minor,
            kind: DebtKind::Payable,
            is_paid: remaining_minor == 0,
            due_date: None,
            created_at: Utc::now(),
            payments: Vec::new(),
        }
    }

    #[test]
    fn status_follows_remaining() {
        assert_eq!(debt(500, 500).status(), DebtStatus::Open);
        assert_eq!(debt(500, 300).status(), DebtStatus::PartiallyPaid);
        assert_eq!(debt(500, 0).status(), DebtStatus::Paid);
        assert_eq!(debt(500, 300).paid_minor(), 200);
    }

    #[test]
    fn settlement_moves_money_opposite_to_opening() {
        assert_eq!(DebtKind::Payable.opening_kind(), TransactionKind::Income);
        assert_eq!(DebtKind::Payable.settlement_kind(), TransactionKind::Expense);
        assert_eq!(DebtKind::Receivable.opening_kind(), TransactionKind::Expense);
        assert_eq!(DebtKind::Receivable.settlement_kind(), TransactionKind::Income);
    }

    #[test]
    fn descriptions() {
        let debt = debt(500, 500);
        assert_eq!(debt.opening_description(), "Debt/Receivable: Budi - motor");
        assert_eq!(
            debt.payment_description(Some("cicilan 1")),
            "Payment for: Budi - cicilan 1"
        );
        assert_eq!(debt.payment_description(None), "Payment for: Budi (motor)");
    }
}
