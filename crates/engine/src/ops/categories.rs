use sea_orm::{
    ActiveValue, DatabaseTransaction, DbErr, QueryFilter, QueryOrder, prelude::*,
    sea_query::OnConflict,
};
use uuid::Uuid;

use crate::{
    Category, CategoryKind, EngineError, NewCategoryCmd, ResultEngine, SystemCategory,
    UpdateCategoryCmd, categories, saving_goals, transactions, users,
    util::{normalize_category_display, normalize_category_key},
};

use super::{Engine, require_category};

impl Engine {
    /// Find the user's category for `system`, creating it on first use.
    ///
    /// Concurrent callers may all miss the first lookup; the unique index on
    /// `(user_id, kind, name_norm)` lets exactly one insert through and the
    /// others fall back to re-reading that row.
    pub(super) async fn resolve_system_category(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: &str,
        system: SystemCategory,
    ) -> ResultEngine<categories::Model> {
        if let Some(model) = find_matching(db_tx, user_id, system).await? {
            return Ok(model);
        }

        let name_norm = normalize_category_key(system.name())?;
        let active = categories::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            user_id: ActiveValue::Set(user_id.to_string()),
            name: ActiveValue::Set(system.name().to_string()),
            name_norm: ActiveValue::Set(name_norm.clone()),
            kind: ActiveValue::Set(system.kind().as_str().to_string()),
            budget_limit_minor: ActiveValue::Set(None),
            is_system: ActiveValue::Set(true),
        };
        match categories::Entity::insert(active)
            .on_conflict(
                OnConflict::columns([
                    categories::Column::UserId,
                    categories::Column::Kind,
                    categories::Column::NameNorm,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(db_tx)
            .await
        {
            Ok(_) | Err(DbErr::RecordNotInserted) => {}
            Err(err) => return Err(err.into()),
        }

        let model = categories::Entity::find()
            .filter(categories::Column::UserId.eq(user_id))
            .filter(categories::Column::Kind.eq(system.kind().as_str()))
            .filter(categories::Column::NameNorm.eq(name_norm))
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("category {}", system.name())))?;
        tracing::debug!(user = %user_id, category = %model.name, "system category resolved");
        Ok(model)
    }

    /// Create a user-defined category.
    pub async fn new_category(&self, user_id: &str, cmd: NewCategoryCmd) -> ResultEngine<Category> {
        let name = normalize_category_display(&cmd.name)?;
        let name_norm = normalize_category_key(&name)?;
        check_budget(cmd.budget_limit_minor)?;
        let user_id = user_id.to_string();
        self.with_tx(|_engine, db_tx| {
            Box::pin(async move {
                users::Entity::find_by_id(user_id.clone())
                    .one(db_tx)
                    .await?
                    .ok_or_else(|| EngineError::NotFound(format!("user {user_id}")))?;

                let exists = categories::Entity::find()
                    .filter(categories::Column::UserId.eq(user_id.as_str()))
                    .filter(categories::Column::Kind.eq(cmd.kind.as_str()))
                    .filter(categories::Column::NameNorm.eq(name_norm.as_str()))
                    .one(db_tx)
                    .await?
                    .is_some();
                if exists {
                    return Err(EngineError::ExistingKey(name));
                }

                let category = Category {
                    id: Uuid::new_v4(),
                    user_id,
                    name,
                    kind: cmd.kind,
                    budget_limit_minor: cmd.budget_limit_minor,
                    is_system: false,
                };
                categories::ActiveModel {
                    id: ActiveValue::Set(category.id),
                    user_id: ActiveValue::Set(category.user_id.clone()),
                    name: ActiveValue::Set(category.name.clone()),
                    name_norm: ActiveValue::Set(name_norm),
                    kind: ActiveValue::Set(category.kind.as_str().to_string()),
                    budget_limit_minor: ActiveValue::Set(category.budget_limit_minor),
                    is_system: ActiveValue::Set(false),
                }
                .insert(db_tx)
                .await?;
                Ok(category)
            })
        })
        .await
    }

    pub async fn category(&self, user_id: &str, category_id: Uuid) -> ResultEngine<Category> {
        Category::try_from(require_category(&self.database, user_id, category_id).await?)
    }

    /// Renames a category and sets or clears its budget.
    ///
    /// System categories keep their name, since the resolver finds them by
    /// it; only their budget can change.
    pub async fn update_category(
        &self,
        user_id: &str,
        category_id: Uuid,
        cmd: UpdateCategoryCmd,
    ) -> ResultEngine<Category> {
        let name = normalize_category_display(&cmd.name)?;
        let name_norm = normalize_category_key(&name)?;
        check_budget(cmd.budget_limit_minor)?;
        let user_id = user_id.to_string();
        self.with_tx(|_engine, db_tx| {
            Box::pin(async move {
                let current = require_category(db_tx, &user_id, category_id).await?;
                if current.name_norm != name_norm {
                    if current.is_system {
                        return Err(EngineError::Conflict(format!(
                            "system category {} cannot be renamed",
                            current.name
                        )));
                    }
                    let taken = categories::Entity::find()
                        .filter(categories::Column::UserId.eq(user_id.as_str()))
                        .filter(categories::Column::Kind.eq(current.kind.as_str()))
                        .filter(categories::Column::NameNorm.eq(name_norm.as_str()))
                        .one(db_tx)
                        .await?
                        .is_some();
                    if taken {
                        return Err(EngineError::ExistingKey(name));
                    }
                }

                let model = categories::ActiveModel {
                    id: ActiveValue::Set(category_id),
                    name: ActiveValue::Set(name),
                    name_norm: ActiveValue::Set(name_norm),
                    budget_limit_minor: ActiveValue::Set(cmd.budget_limit_minor),
                    ..Default::default()
                }
                .update(db_tx)
                .await?;
                tracing::debug!(category_id = %category_id, "category updated");
                Category::try_from(model)
            })
        })
        .await
    }

    /// Deletes a category no transaction or savings goal uses.
    pub async fn delete_category(&self, user_id: &str, category_id: Uuid) -> ResultEngine<()> {
        let user_id = user_id.to_string();
        self.with_tx(|_engine, db_tx| {
            Box::pin(async move {
                require_category(db_tx, &user_id, category_id).await?;
                let in_use = transactions::Entity::find()
                    .filter(transactions::Column::CategoryId.eq(category_id))
                    .one(db_tx)
                    .await?
                    .is_some()
                    || saving_goals::Entity::find()
                        .filter(saving_goals::Column::CategoryId.eq(category_id))
                        .one(db_tx)
                        .await?
                        .is_some();
                if in_use {
                    return Err(EngineError::Conflict(format!(
                        "category {category_id} is in use"
                    )));
                }
                categories::Entity::delete_by_id(category_id)
                    .exec(db_tx)
                    .await?;
                tracing::debug!(category_id = %category_id, "category deleted");
                Ok(())
            })
        })
        .await
    }

    /// Categories of the user, optionally restricted to one kind.
    pub async fn categories(
        &self,
        user_id: &str,
        kind: Option<CategoryKind>,
    ) -> ResultEngine<Vec<Category>> {
        let mut query = categories::Entity::find().filter(categories::Column::UserId.eq(user_id));
        if let Some(kind) = kind {
            query = query.filter(categories::Column::Kind.eq(kind.as_str()));
        }
        query
            .order_by_asc(categories::Column::Kind)
            .order_by_asc(categories::Column::NameNorm)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Category::try_from)
            .collect()
    }
}

async fn find_matching(
    db_tx: &DatabaseTransaction,
    user_id: &str,
    system: SystemCategory,
) -> ResultEngine<Option<categories::Model>> {
    let mut query = categories::Entity::find()
        .filter(categories::Column::UserId.eq(user_id))
        .filter(categories::Column::Kind.eq(system.kind().as_str()));
    if let Some(name) = system.match_name() {
        query = query.filter(categories::Column::NameNorm.eq(normalize_category_key(name)?));
    }
    Ok(query
        .order_by_asc(categories::Column::NameNorm)
        .one(db_tx)
        .await?)
}

fn check_budget(budget_limit_minor: Option<i64>) -> ResultEngine<()> {
    if let Some(limit) = budget_limit_minor
        && limit <= 0
    {
        return Err(EngineError::InvalidAmount(
            "budget_limit_minor must be > 0".to_string(),
        ));
    }
    Ok(())
}
