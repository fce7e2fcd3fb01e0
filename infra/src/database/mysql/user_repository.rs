//! MySQL implementation of the UserRepository trait.

use async_trait::async_trait;
use sqlx::MySqlPool;
use tracing::debug;
use uuid::Uuid;

use cb_core::domain::entities::{User, VerificationToken};
use cb_core::errors::{AuthError, DomainError};
use cb_core::repositories::UserRepository;

use super::rows::{user_from_row, USER_COLUMNS};
use crate::database::connection::DatabasePool;
use crate::database::store_error;
use crate::database::transaction::{begin, within_deadline, TransactionSettings};

/// MySQL implementation of UserRepository
pub struct MySqlUserRepository {
    pool: MySqlPool,
    settings: TransactionSettings,
}

impl MySqlUserRepository {
    pub fn new(pool: &DatabasePool) -> Self {
        Self {
            pool: pool.get_pool().clone(),
            settings: pool.transaction_settings(),
        }
    }

    async fn find_one(&self, filter: &str, value: String) -> Result<Option<User>, DomainError> {
        let query = format!("SELECT {} FROM users u WHERE {} LIMIT 1", USER_COLUMNS, filter);

        let row = sqlx::query(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?;

        row.as_ref().map(user_from_row).transpose()
    }
}

#[async_trait]
impl UserRepository for MySqlUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        self.find_one("u.id = ?", id.to_string()).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        self.find_one("u.email = ?", email.to_string()).await
    }

    async fn create_pending(
        &self,
        user: &User,
        token: &VerificationToken,
    ) -> Result<(), DomainError> {
        within_deadline(&self.settings, "user.create_pending", async {
            let mut tx = begin(&self.pool, &self.settings, "user.create_pending").await?;

            let inserted = sqlx::query(
                r#"
                INSERT INTO users (
                    id, email, first_name, last_name, password_hash,
                    is_verified, created_at, updated_at, deleted_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(user.id.to_string())
            .bind(&user.email)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.password_hash)
            .bind(user.is_verified)
            .bind(user.created_at)
            .bind(user.updated_at)
            .bind(user.deleted_at)
            .execute(&mut *tx)
            .await;

            if let Err(e) = inserted {
                return match e {
                    sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                        debug!(user_id = %user.id, "Email already registered");
                        Err(AuthError::EmailAlreadyRegistered.into())
                    }
                    other => Err(store_error(other)),
                };
            }

            sqlx::query(
                "INSERT INTO verification_tokens (id, token, user_id, expires_at, created_at) \
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(token.id.to_string())
            .bind(&token.token)
            .bind(token.user_id.to_string())
            .bind(token.expires_at)
            .bind(token.created_at)
            .execute(&mut *tx)
            .await
            .map_err(store_error)?;

            tx.commit().await.map_err(store_error)
        })
        .await
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        // sessions and token rows go with the user via ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(store_error)?;

        Ok(result.rows_affected() > 0)
    }
}
