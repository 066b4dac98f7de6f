use chrono::Utc;
use sea_orm::{ActiveValue, prelude::*};

use crate::{EngineError, ResultEngine, users, util::normalize_required_name};

use super::Engine;

impl Engine {
    /// Register a user and return the stored username.
    pub async fn new_user(&self, username: &str) -> ResultEngine<String> {
        let username = normalize_required_name(username, "user")?;
        self.with_tx(|_engine, db_tx| {
            Box::pin(async move {
                if users::Entity::find_by_id(username.clone())
                    .one(db_tx)
                    .await?
                    .is_some()
                {
                    return Err(EngineError::ExistingKey(username));
                }
                users::ActiveModel {
                    username: ActiveValue::Set(username.clone()),
                    created_at: ActiveValue::Set(Utc::now()),
                }
                .insert(db_tx)
                .await?;
                tracing::debug!(user = %username, "user created");
                Ok(username)
            })
        })
        .await
    }
}
