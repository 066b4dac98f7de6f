use sea_orm::{ActiveValue, QueryFilter, QueryOrder, prelude::*};
use uuid::Uuid;

use crate::{
    ContributionCmd, EngineError, NewSavingGoalCmd, ResultEngine, SavingContribution, SavingGoal,
    SystemCategory, Transaction, TransactionKind, saving_contributions, saving_goals,
    transactions, users,
    util::{normalize_optional_text, normalize_required_name, require_positive_amount},
};

use super::{Effect, Engine, require_category, require_wallet, shift_wallet_balance};

impl Engine {
    pub async fn new_saving_goal(
        &self,
        user_id: &str,
        cmd: NewSavingGoalCmd,
    ) -> ResultEngine<SavingGoal> {
        let name = normalize_required_name(&cmd.name, "goal")?;
        let mut goal = SavingGoal::new(user_id.to_string(), name, cmd.target_minor)?;
        goal.category_id = cmd.category_id;
        goal.deadline = cmd.deadline;
        self.with_tx(|_engine, db_tx| {
            Box::pin(async move {
                users::Entity::find_by_id(goal.user_id.clone())
                    .one(db_tx)
                    .await?
                    .ok_or_else(|| EngineError::NotFound(format!("user {}", goal.user_id)))?;
                if let Some(category_id) = goal.category_id {
                    require_category(db_tx, &goal.user_id, category_id).await?;
                }
                saving_goals::ActiveModel::from(&goal).insert(db_tx).await?;
                tracing::debug!(goal_id = %goal.id, target_minor = goal.target_minor, "goal created");
                Ok(goal)
            })
        })
        .await
    }

    /// Earmarks wallet funds toward a goal.
    ///
    /// Records a `saving_allocation` transaction, which leaves the wallet's
    /// stored balance untouched and lowers its available balance instead.
    pub async fn add_contribution(
        &self,
        user_id: &str,
        cmd: ContributionCmd,
    ) -> ResultEngine<SavingContribution> {
        require_positive_amount(cmd.amount_minor, "amount_minor")?;
        let description = normalize_optional_text(cmd.description.as_deref());
        let user_id = user_id.to_string();
        self.with_tx(|engine, db_tx| {
            Box::pin(async move {
                let mut goal: SavingGoal = saving_goals::Entity::find_by_id(cmd.goal_id)
                    .filter(saving_goals::Column::UserId.eq(user_id.as_str()))
                    .one(db_tx)
                    .await?
                    .ok_or_else(|| EngineError::NotFound(format!("saving goal {}", cmd.goal_id)))?
                    .into();
                require_wallet(db_tx, &user_id, cmd.wallet_id).await?;

                let category_id = match goal.category_id {
                    Some(category_id) => {
                        require_category(db_tx, &user_id, category_id).await?.id
                    }
                    None => {
                        engine
                            .resolve_system_category(db_tx, &user_id, SystemCategory::Savings)
                            .await?
                            .id
                    }
                };

                let mut tx = Transaction::new(
                    user_id,
                    cmd.wallet_id,
                    category_id,
                    TransactionKind::SavingAllocation,
                    cmd.amount_minor,
                    cmd.occurred_at,
                )?;
                tx.description =
                    Some(description.unwrap_or_else(|| format!("Alokasi ke {}", goal.name)));
                transactions::ActiveModel::from(&tx).insert(db_tx).await?;
                shift_wallet_balance(db_tx, tx.wallet_id, tx.kind, tx.amount_minor, Effect::Apply)
                    .await?;

                let contribution = SavingContribution {
                    id: Uuid::new_v4(),
                    goal_id: goal.id,
                    wallet_id: cmd.wallet_id,
                    transaction_id: tx.id,
                    amount_minor: cmd.amount_minor,
                    contributed_at: cmd.occurred_at,
                };
                saving_contributions::ActiveModel::from(&contribution)
                    .insert(db_tx)
                    .await?;

                goal.contribute(cmd.amount_minor)?;
                saving_goals::ActiveModel {
                    id: ActiveValue::Set(goal.id),
                    current_minor: ActiveValue::Set(goal.current_minor),
                    is_achieved: ActiveValue::Set(goal.is_achieved),
                    ..Default::default()
                }
                .update(db_tx)
                .await?;
                tracing::debug!(
                    goal_id = %goal.id,
                    current_minor = goal.current_minor,
                    is_achieved = goal.is_achieved,
                    "contribution recorded"
                );
                Ok(contribution)
            })
        })
        .await
    }

    pub async fn saving_goal(&self, user_id: &str, goal_id: Uuid) -> ResultEngine<SavingGoal> {
        saving_goals::Entity::find_by_id(goal_id)
            .filter(saving_goals::Column::UserId.eq(user_id))
            .one(&self.database)
            .await?
            .map(SavingGoal::from)
            .ok_or_else(|| EngineError::NotFound(format!("saving goal {goal_id}")))
    }

    pub async fn saving_goals(&self, user_id: &str) -> ResultEngine<Vec<SavingGoal>> {
        Ok(saving_goals::Entity::find()
            .filter(saving_goals::Column::UserId.eq(user_id))
            .order_by_asc(saving_goals::Column::Name)
            .all(&self.database)
            .await?
            .into_iter()
            .map(SavingGoal::from)
            .collect())
    }

    /// Contributions toward a goal, oldest first.
    pub async fn contributions(
        &self,
        user_id: &str,
        goal_id: Uuid,
    ) -> ResultEngine<Vec<SavingContribution>> {
        let goal = self.saving_goal(user_id, goal_id).await?;
        Ok(saving_contributions::Entity::find()
            .filter(saving_contributions::Column::GoalId.eq(goal.id))
            .order_by_asc(saving_contributions::Column::ContributedAt)
            .all(&self.database)
            .await?
            .into_iter()
            .map(SavingContribution::from)
            .collect())
    }
}
