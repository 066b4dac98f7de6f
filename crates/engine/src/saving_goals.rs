//! Savings goals.
//!
//! Progress is earmarking only: contributions raise `current_minor` and
//! reduce the source wallet's `available_balance`, never its `balance`.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavingGoal {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub target_minor: i64,
    pub current_minor: i64,
    pub is_achieved: bool,
    /// Category used for contribution transactions; "Tabungan" when unset.
    pub category_id: Option<Uuid>,
    pub deadline: Option<DateTime<Utc>>,
}

impl SavingGoal {
    pub fn new(user_id: String, name: String, target_minor: i64) -> ResultEngine<Self> {
        if target_minor <= 0 {
            return Err(EngineError::InvalidAmount(
                "target_minor must be > 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            name,
            target_minor,
            current_minor: 0,
            is_achieved: false,
            category_id: None,
            deadline: None,
        })
    }

    /// Record a contribution; `is_achieved` latches once the target is met.
    pub(crate) fn contribute(&mut self, amount_minor: i64) -> ResultEngine<()> {
        self.current_minor = self
            .current_minor
            .checked_add(amount_minor)
            .ok_or_else(|| EngineError::InvalidAmount("goal progress overflow".to_string()))?;
        self.is_achieved = self.current_minor >= self.target_minor;
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "saving_goals")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub target_minor: i64,
    pub current_minor: i64,
    pub is_achieved: bool,
    pub category_id: Option<Uuid>,
    pub deadline: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::saving_contributions::Entity")]
    Contributions,
}

impl Related<super::saving_contributions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contributions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&SavingGoal> for ActiveModel {
    fn from(goal: &SavingGoal) -> Self {
        Self {
            id: ActiveValue::Set(goal.id),
            user_id: ActiveValue::Set(goal.user_id.clone()),
            name: ActiveValue::Set(goal.name.clone()),
            target_minor: ActiveValue::Set(goal.target_minor),
            current_minor: ActiveValue::Set(goal.current_minor),
            is_achieved: ActiveValue::Set(goal.is_achieved),
            category_id: ActiveValue::Set(goal.category_id),
            deadline: ActiveValue::Set(goal.deadline),
        }
    }
}

impl From<Model> for SavingGoal {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            name: model.name,
            target_minor: model.target_minor,
            current_minor: model.current_minor,
            is_achieved: model.is_achieved,
            category_id: model.category_id,
            deadline: model.deadline,
        }
    }
}
