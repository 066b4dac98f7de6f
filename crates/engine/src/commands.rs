//! Command structs for engine operations.
//!
//! These types group the parameters of write operations so call sites stay
//! readable. Required fields go through `new`, optional ones through
//! chained setters.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{CategoryKind, DebtKind, TransactionKind};

/// Field values for creating or updating a transaction.
#[derive(Clone, Debug)]
pub struct TransactionInput {
    pub wallet_id: Uuid,
    pub category_id: Uuid,
    pub kind: TransactionKind,
    pub amount_minor: i64,
    pub occurred_at: DateTime<Utc>,
    pub description: Option<String>,
    pub attachment: Option<String>,
}

impl TransactionInput {
    #[must_use]
    pub fn new(
        wallet_id: Uuid,
        category_id: Uuid,
        kind: TransactionKind,
        amount_minor: i64,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            wallet_id,
            category_id,
            kind,
            amount_minor,
            occurred_at,
            description: None,
            attachment: None,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn attachment(mut self, attachment: impl Into<String>) -> Self {
        self.attachment = Some(attachment.into());
        self
    }
}

/// Move money between two wallets of the same user.
#[derive(Clone, Debug)]
pub struct TransferCmd {
    pub from_wallet_id: Uuid,
    pub to_wallet_id: Uuid,
    pub amount_minor: i64,
    pub occurred_at: DateTime<Utc>,
    pub description: Option<String>,
}

impl TransferCmd {
    #[must_use]
    pub fn new(
        from_wallet_id: Uuid,
        to_wallet_id: Uuid,
        amount_minor: i64,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            from_wallet_id,
            to_wallet_id,
            amount_minor,
            occurred_at,
            description: None,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Open a debt or a receivable.
#[derive(Clone, Debug)]
pub struct NewDebtCmd {
    pub wallet_id: Uuid,
    pub name: String,
    pub kind: DebtKind,
    pub amount_minor: i64,
    pub occurred_at: DateTime<Utc>,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
}

impl NewDebtCmd {
    #[must_use]
    pub fn new(
        wallet_id: Uuid,
        name: impl Into<String>,
        kind: DebtKind,
        amount_minor: i64,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            wallet_id,
            name: name.into(),
            kind,
            amount_minor,
            occurred_at,
            description: None,
            due_date: None,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }
}

/// Record an installment against a debt.
#[derive(Clone, Debug)]
pub struct PayDebtCmd {
    pub wallet_id: Uuid,
    pub amount_minor: i64,
    pub paid_at: DateTime<Utc>,
    pub note: Option<String>,
}

impl PayDebtCmd {
    #[must_use]
    pub fn new(wallet_id: Uuid, amount_minor: i64, paid_at: DateTime<Utc>) -> Self {
        Self {
            wallet_id,
            amount_minor,
            paid_at,
            note: None,
        }
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Replace the editable fields of a debt.
#[derive(Clone, Debug)]
pub struct UpdateDebtCmd {
    pub wallet_id: Uuid,
    pub name: String,
    pub amount_minor: i64,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
}

impl UpdateDebtCmd {
    #[must_use]
    pub fn new(wallet_id: Uuid, name: impl Into<String>, amount_minor: i64) -> Self {
        Self {
            wallet_id,
            name: name.into(),
            amount_minor,
            description: None,
            due_date: None,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }
}

#[derive(Clone, Debug)]
pub struct NewSavingGoalCmd {
    pub name: String,
    pub target_minor: i64,
    pub category_id: Option<Uuid>,
    pub deadline: Option<DateTime<Utc>>,
}

impl NewSavingGoalCmd {
    #[must_use]
    pub fn new(name: impl Into<String>, target_minor: i64) -> Self {
        Self {
            name: name.into(),
            target_minor,
            category_id: None,
            deadline: None,
        }
    }

    #[must_use]
    pub fn category_id(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Earmark wallet funds toward a goal.
#[derive(Clone, Debug)]
pub struct ContributionCmd {
    pub goal_id: Uuid,
    pub wallet_id: Uuid,
    pub amount_minor: i64,
    pub occurred_at: DateTime<Utc>,
    pub description: Option<String>,
}

impl ContributionCmd {
    #[must_use]
    pub fn new(
        goal_id: Uuid,
        wallet_id: Uuid,
        amount_minor: i64,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            goal_id,
            wallet_id,
            amount_minor,
            occurred_at,
            description: None,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Clone, Debug)]
pub struct NewCategoryCmd {
    pub name: String,
    pub kind: CategoryKind,
    pub budget_limit_minor: Option<i64>,
}

impl NewCategoryCmd {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: CategoryKind) -> Self {
        Self {
            name: name.into(),
            kind,
            budget_limit_minor: None,
        }
    }

    #[must_use]
    pub fn budget_limit_minor(mut self, budget_limit_minor: i64) -> Self {
        self.budget_limit_minor = Some(budget_limit_minor);
        self
    }
}

/// New name and budget for an existing category. Kind is fixed at creation.
#[derive(Clone, Debug)]
pub struct UpdateCategoryCmd {
    pub name: String,
    /// `None` clears the budget.
    pub budget_limit_minor: Option<i64>,
}

impl UpdateCategoryCmd {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            budget_limit_minor: None,
        }
    }

    #[must_use]
    pub fn budget_limit_minor(mut self, budget_limit_minor: i64) -> Self {
        self.budget_limit_minor = Some(budget_limit_minor);
        self
    }
}
