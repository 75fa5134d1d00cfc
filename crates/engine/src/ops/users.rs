use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, SqlErr, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, User, users,
    util::{hash_password, normalize_email, verify_password},
};

use super::{Engine, with_tx};

impl Engine {
    /// Register a new account.
    ///
    /// The email is trimmed and lowercased; a second account with the same
    /// email fails with `ExistingKey`.
    pub async fn register_user(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> ResultEngine<User> {
        let email = normalize_email(email)?;
        if password.is_empty() {
            return Err(EngineError::InvalidInput(
                "password must not be empty".to_string(),
            ));
        }
        let name = name
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string);
        let now = Utc::now();

        // Insert first; duplicates are reported by the unique email index.
        with_tx!(self, |db_tx| {
            let model = users::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                email: ActiveValue::Set(email.clone()),
                password_hash: ActiveValue::Set(hash_password(password)),
                name: ActiveValue::Set(name),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
            }
            .insert(&db_tx)
            .await
            .map_err(|err| match err.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    EngineError::ExistingKey(email.clone())
                }
                _ => EngineError::from(err),
            })?;

            Ok(User::from(model))
        })
    }

    /// Resolve credentials to a user. Any mismatch is reported as not found.
    pub async fn authenticate(&self, email: &str, password: &str) -> ResultEngine<User> {
        let email = email.trim().to_lowercase();
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))?;
        if !verify_password(&model.password_hash, password) {
            return Err(EngineError::KeyNotFound("user not exists".to_string()));
        }
        Ok(User::from(model))
    }

    pub async fn user(&self, user_id: Uuid) -> ResultEngine<User> {
        users::Entity::find_by_id(user_id)
            .one(&self.database)
            .await?
            .map(User::from)
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))
    }
}
