use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Funds earmarked from a wallet toward a goal.
///
/// Backed by one `saving_allocation` transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavingContribution {
    pub id: Uuid,
    pub goal_id: Uuid,
    pub wallet_id: Uuid,
    pub transaction_id: Uuid,
    pub amount_minor: i64,
    pub contributed_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "saving_contributions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub goal_id: Uuid,
    pub wallet_id: Uuid,
    #[sea_orm(unique)]
    pub transaction_id: Uuid,
    pub amount_minor: i64,
    pub contributed_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::saving_goals::Entity",
        from = "Column::GoalId",
        to = "super::saving_goals::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Goal,
}

impl Related<super::saving_goals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Goal.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&SavingContribution> for ActiveModel {
    fn from(contribution: &SavingContribution) -> Self {
        Self {
            id: ActiveValue::Set(contribution.id),
            goal_id: ActiveValue::Set(contribution.goal_id),
            wallet_id: ActiveValue::Set(contribution.wallet_id),
            transaction_id: ActiveValue::Set(contribution.transaction_id),
            amount_minor: ActiveValue::Set(contribution.amount_minor),
            contributed_at: ActiveValue::Set(contribution.contributed_at),
        }
    }
}

impl From<Model> for SavingContribution {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            goal_id: model.goal_id,
            wallet_id: model.wallet_id,
            transaction_id: model.transaction_id,
            amount_minor: model.amount_minor,
            contributed_at: model.contributed_at,
        }
    }
}
