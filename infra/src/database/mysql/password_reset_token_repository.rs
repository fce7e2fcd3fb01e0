//! MySQL implementation of the PasswordResetTokenRepository trait.
//!
//! `password_reset_tokens.user_id` is unique, so a user holds at most one
//! reset token and issuing a new one overwrites the expired row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::MySqlPool;
use uuid::Uuid;

use cb_core::domain::entities::{PasswordResetToken, User};
use cb_core::errors::DomainError;
use cb_core::repositories::PasswordResetTokenRepository;

use super::rows::{reset_token_from_row, user_from_row, RESET_COLUMNS, USER_COLUMNS};
use crate::database::connection::DatabasePool;
use crate::database::store_error;
use crate::database::transaction::{begin, within_deadline, TransactionSettings};

/// MySQL implementation of PasswordResetTokenRepository
pub struct MySqlPasswordResetTokenRepository {
    pool: MySqlPool,
    settings: TransactionSettings,
}

impl MySqlPasswordResetTokenRepository {
    pub fn new(pool: &DatabasePool) -> Self {
        Self {
            pool: pool.get_pool().clone(),
            settings: pool.transaction_settings(),
        }
    }
}

#[async_trait]
impl PasswordResetTokenRepository for MySqlPasswordResetTokenRepository {
    async fn upsert_unless_active(
        &self,
        token: &PasswordResetToken,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let operation = "password_reset.upsert_unless_active";
        within_deadline(&self.settings, operation, async {
            let mut tx = begin(&self.pool, &self.settings, operation).await?;
            let user_id = token.user_id.to_string();

            // serialise concurrent requests for the same user
            let owner: Option<String> =
                sqlx::query_scalar("SELECT id FROM users WHERE id = ? FOR UPDATE")
                    .bind(&user_id)
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(store_error)?;
            if owner.is_none() {
                return Err(DomainError::NotFound {
                    resource: format!("user {}", token.user_id),
                });
            }

            let existing: Option<DateTime<Utc>> = sqlx::query_scalar(
                "SELECT expires_at FROM password_reset_tokens WHERE user_id = ?",
            )
            .bind(&user_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(store_error)?;
            if matches!(existing, Some(expires_at) if expires_at >= now) {
                return Ok(false);
            }

            sqlx::query(
                r#"
                INSERT INTO password_reset_tokens (id, token_digest, user_id, expires_at, created_at)
                VALUES (?, ?, ?, ?, ?)
                ON DUPLICATE KEY UPDATE
                    id = VALUES(id),
                    token_digest = VALUES(token_digest),
                    expires_at = VALUES(expires_at),
                    created_at = VALUES(created_at)
                "#,
            )
            .bind(token.id.to_string())
            .bind(&token.token_digest)
            .bind(&user_id)
            .bind(token.expires_at)
            .bind(token.created_at)
            .execute(&mut *tx)
            .await
            .map_err(store_error)?;

            tx.commit().await.map_err(store_error)?;
            Ok(true)
        })
        .await
    }

    async fn find_with_user_by_digest(
        &self,
        token_digest: &str,
    ) -> Result<Option<(PasswordResetToken, User)>, DomainError> {
        let query = format!(
            "SELECT {}, {} FROM password_reset_tokens t \
             JOIN users u ON u.id = t.user_id \
             WHERE t.token_digest = ? LIMIT 1",
            RESET_COLUMNS, USER_COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(token_digest)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?;

        match row {
            Some(row) => Ok(Some((reset_token_from_row(&row)?, user_from_row(&row)?))),
            None => Ok(None),
        }
    }

    async fn consume(
        &self,
        token_digest: &str,
        user_id: Uuid,
        new_password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let operation = "password_reset.consume";
        within_deadline(&self.settings, operation, async {
            let mut tx = begin(&self.pool, &self.settings, operation).await?;

            // a concurrent consume of the same token blocks on the row lock,
            // then deletes nothing
            let burned = sqlx::query(
                "DELETE FROM password_reset_tokens \
                 WHERE token_digest = ? AND user_id = ? AND expires_at >= ?",
            )
            .bind(token_digest)
            .bind(user_id.to_string())
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(store_error)?;
            if burned.rows_affected() != 1 {
                return Ok(false);
            }

            let updated =
                sqlx::query("UPDATE users SET password_hash = ?, updated_at = ? WHERE id = ?")
                    .bind(new_password_hash)
                    .bind(now)
                    .bind(user_id.to_string())
                    .execute(&mut *tx)
                    .await
                    .map_err(store_error)?;
            if updated.rows_affected() != 1 {
                return Ok(false);
            }

            tx.commit().await.map_err(store_error)?;
            Ok(true)
        })
        .await
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM password_reset_tokens WHERE expires_at < ?")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(store_error)?;

        Ok(result.rows_affected())
    }
}
