//! MySQL implementation of the VerificationTokenRepository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::MySqlPool;
use uuid::Uuid;

use cb_core::domain::entities::{User, VerificationToken};
use cb_core::errors::DomainError;
use cb_core::repositories::{PurgeCount, VerificationTokenRepository};

use super::rows::{user_from_row, verification_token_from_row, USER_COLUMNS, VERIFICATION_COLUMNS};
use crate::database::connection::DatabasePool;
use crate::database::store_error;
use crate::database::transaction::{begin, within_deadline, TransactionSettings};

/// MySQL implementation of VerificationTokenRepository
pub struct MySqlVerificationTokenRepository {
    pool: MySqlPool,
    settings: TransactionSettings,
}

impl MySqlVerificationTokenRepository {
    pub fn new(pool: &DatabasePool) -> Self {
        Self {
            pool: pool.get_pool().clone(),
            settings: pool.transaction_settings(),
        }
    }
}

#[async_trait]
impl VerificationTokenRepository for MySqlVerificationTokenRepository {
    async fn replace_for_user(&self, token: &VerificationToken) -> Result<(), DomainError> {
        let operation = "verification.replace_for_user";
        within_deadline(&self.settings, operation, async {
            let mut tx = begin(&self.pool, &self.settings, operation).await?;

            sqlx::query("DELETE FROM verification_tokens WHERE user_id = ?")
                .bind(token.user_id.to_string())
                .execute(&mut *tx)
                .await
                .map_err(store_error)?;

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

    async fn find_with_user(
        &self,
        token: &str,
    ) -> Result<Option<(VerificationToken, User)>, DomainError> {
        let query = format!(
            "SELECT {}, {} FROM verification_tokens t \
             JOIN users u ON u.id = t.user_id \
             WHERE t.token = ? LIMIT 1",
            VERIFICATION_COLUMNS, USER_COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?;

        match row {
            Some(row) => Ok(Some((
                verification_token_from_row(&row)?,
                user_from_row(&row)?,
            ))),
            None => Ok(None),
        }
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<VerificationToken>, DomainError> {
        let query = format!(
            "SELECT {} FROM verification_tokens t WHERE t.user_id = ? \
             ORDER BY t.created_at DESC LIMIT 1",
            VERIFICATION_COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?;

        row.as_ref().map(verification_token_from_row).transpose()
    }

    async fn confirm(
        &self,
        token_id: Uuid,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, DomainError> {
        let operation = "verification.confirm";
        within_deadline(&self.settings, operation, async {
            let mut tx = begin(&self.pool, &self.settings, operation).await?;

            // a concurrent confirm already took the row
            let deleted = sqlx::query("DELETE FROM verification_tokens WHERE id = ?")
                .bind(token_id.to_string())
                .execute(&mut *tx)
                .await
                .map_err(store_error)?;
            if deleted.rows_affected() == 0 {
                return Ok(None);
            }

            sqlx::query("UPDATE users SET is_verified = TRUE, updated_at = ? WHERE id = ?")
                .bind(now)
                .bind(user_id.to_string())
                .execute(&mut *tx)
                .await
                .map_err(store_error)?;

            let query = format!("SELECT {} FROM users u WHERE u.id = ?", USER_COLUMNS);
            let row = sqlx::query(&query)
                .bind(user_id.to_string())
                .fetch_optional(&mut *tx)
                .await
                .map_err(store_error)?;
            let user = match row {
                Some(row) => user_from_row(&row)?,
                None => return Ok(None),
            };

            tx.commit().await.map_err(store_error)?;
            Ok(Some(user))
        })
        .await
    }

    async fn purge(&self, token_id: Uuid, user_id: Uuid) -> Result<PurgeCount, DomainError> {
        let operation = "verification.purge";
        within_deadline(&self.settings, operation, async {
            let mut tx = begin(&self.pool, &self.settings, operation).await?;

            let tokens = sqlx::query("DELETE FROM verification_tokens WHERE id = ?")
                .bind(token_id.to_string())
                .execute(&mut *tx)
                .await
                .map_err(store_error)?
                .rows_affected();

            let users = sqlx::query("DELETE FROM users WHERE id = ? AND is_verified = FALSE")
                .bind(user_id.to_string())
                .execute(&mut *tx)
                .await
                .map_err(store_error)?
                .rows_affected();

            tx.commit().await.map_err(store_error)?;
            Ok(PurgeCount { tokens, users })
        })
        .await
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<PurgeCount, DomainError> {
        let operation = "verification.purge_expired";
        within_deadline(&self.settings, operation, async {
            let mut tx = begin(&self.pool, &self.settings, operation).await?;

            let owners: Vec<String> = sqlx::query_scalar(
                "SELECT DISTINCT user_id FROM verification_tokens WHERE expires_at < ? FOR UPDATE",
            )
            .bind(now)
            .fetch_all(&mut *tx)
            .await
            .map_err(store_error)?;

            let tokens = sqlx::query("DELETE FROM verification_tokens WHERE expires_at < ?")
                .bind(now)
                .execute(&mut *tx)
                .await
                .map_err(store_error)?
                .rows_affected();

            let mut users = 0;
            for owner in &owners {
                users += sqlx::query("DELETE FROM users WHERE id = ? AND is_verified = FALSE")
                    .bind(owner)
                    .execute(&mut *tx)
                    .await
                    .map_err(store_error)?
                    .rows_affected();
            }

            tx.commit().await.map_err(store_error)?;
            Ok(PurgeCount { tokens, users })
        })
        .await
    }
}
