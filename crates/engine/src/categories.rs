//! Category registry per user.
//!
//! Categories are keyed by `(user_id, kind, name_norm)`; the unique index on
//! that triple is what makes lazy creation of system categories safe under
//! concurrent callers.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryKind {
    Income,
    Expense,
    Transfer,
}

impl CategoryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Transfer => "transfer",
        }
    }
}

impl TryFrom<&str> for CategoryKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            "transfer" => Ok(Self::Transfer),
            other => Err(EngineError::InvalidKind(format!(
                "invalid category kind: {other}"
            ))),
        }
    }
}

/// Categories the engine creates on first use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SystemCategory {
    /// Both halves of a wallet-to-wallet transfer.
    Transfer,
    /// Money received as a loan ("Utang").
    Debt,
    /// Money lent out ("Piutang").
    Receivable,
    /// Paying back a loan ("Bayar Utang").
    DebtRepayment,
    /// Being paid back ("Terima Piutang").
    ReceivableCollection,
    /// Fallback for savings contributions ("Tabungan").
    Savings,
}

impl SystemCategory {
    pub fn name(self) -> &'static str {
        match self {
            Self::Transfer => "Transfer",
            Self::Debt => "Utang",
            Self::Receivable => "Piutang",
            Self::DebtRepayment => "Bayar Utang",
            Self::ReceivableCollection => "Terima Piutang",
            Self::Savings => "Tabungan",
        }
    }

    pub fn kind(self) -> CategoryKind {
        match self {
            Self::Transfer => CategoryKind::Transfer,
            Self::Debt | Self::ReceivableCollection => CategoryKind::Income,
            Self::Receivable | Self::DebtRepayment | Self::Savings => CategoryKind::Expense,
        }
    }

    /// The transfer category is matched by kind alone, so a user-defined
    /// transfer category is reused instead of creating "Transfer" next to it.
    pub fn match_name(self) -> Option<&'static str> {
        match self {
            Self::Transfer => None,
            other => Some(other.name()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub kind: CategoryKind,
    pub budget_limit_minor: Option<i64>,
    pub is_system: bool,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub name_norm: String,
    pub kind: String,
    pub budget_limit_minor: Option<i64>,
    pub is_system: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Username",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Category {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: model.id,
            user_id: model.user_id,
            name: model.name,
            kind: CategoryKind::try_from(model.kind.as_str())?,
            budget_limit_minor: model.budget_limit_minor,
            is_system: model.is_system,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_categories_carry_their_kind() {
        assert_eq!(SystemCategory::Transfer.kind(), CategoryKind::Transfer);
        assert_eq!(SystemCategory::Debt.kind(), CategoryKind::Income);
        assert_eq!(SystemCategory::Receivable.kind(), CategoryKind::Expense);
        assert_eq!(SystemCategory::DebtRepayment.kind(), CategoryKind::Expense);
        assert_eq!(
            SystemCategory::ReceivableCollection.kind(),
            CategoryKind::Income
        );
        assert_eq!(SystemCategory::Savings.kind(), CategoryKind::Expense);
    }

    #[test]
    fn only_transfer_matches_by_kind_alone() {
        assert_eq!(SystemCategory::Transfer.match_name(), None);
        assert_eq!(SystemCategory::Savings.match_name(), Some("Tabungan"));
    }
}
