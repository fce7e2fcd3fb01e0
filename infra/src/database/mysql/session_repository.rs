//! MySQL implementation of the SessionRepository trait.
//!
//! Device-limited inserts lock the owning `users` row first, so concurrent
//! logins of one user queue behind each other for the count-then-insert.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySql, MySqlPool, Transaction};
use tracing::debug;
use uuid::Uuid;

use cb_core::domain::entities::Session;
use cb_core::errors::DomainError;
use cb_core::repositories::{SessionInsert, SessionRepository};

use super::rows::{session_from_row, SESSION_COLUMNS};
use crate::database::connection::DatabasePool;
use crate::database::store_error;
use crate::database::transaction::{begin, within_deadline, TransactionSettings};

/// MySQL implementation of SessionRepository
pub struct MySqlSessionRepository {
    pool: MySqlPool,
    settings: TransactionSettings,
}

impl MySqlSessionRepository {
    pub fn new(pool: &DatabasePool) -> Self {
        Self {
            pool: pool.get_pool().clone(),
            settings: pool.transaction_settings(),
        }
    }

    async fn insert(
        tx: &mut Transaction<'static, MySql>,
        session: &Session,
    ) -> Result<(), DomainError> {
        sqlx::query(
            "INSERT INTO sessions (id, owner_id, refresh_token_hash, session_token_id, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(session.id.to_string())
        .bind(session.owner_id.to_string())
        .bind(&session.refresh_token_hash)
        .bind(&session.session_token_id)
        .bind(session.created_at)
        .execute(&mut **tx)
        .await
        .map_err(store_error)?;
        Ok(())
    }
}

#[async_trait]
impl SessionRepository for MySqlSessionRepository {
    async fn insert_within_limit(
        &self,
        session: &Session,
        limit: usize,
        stale_before: DateTime<Utc>,
    ) -> Result<SessionInsert, DomainError> {
        let operation = "session.insert_within_limit";
        within_deadline(&self.settings, operation, async {
            let mut tx = begin(&self.pool, &self.settings, operation).await?;
            let owner_id = session.owner_id.to_string();

            let owner: Option<String> =
                sqlx::query_scalar("SELECT id FROM users WHERE id = ? FOR UPDATE")
                    .bind(&owner_id)
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(store_error)?;
            if owner.is_none() {
                return Err(DomainError::NotFound {
                    resource: format!("user {}", session.owner_id),
                });
            }

            let active: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM sessions WHERE owner_id = ? AND created_at > ?",
            )
            .bind(&owner_id)
            .bind(stale_before)
            .fetch_one(&mut *tx)
            .await
            .map_err(store_error)?;

            let active = active.max(0) as usize;
            if active >= limit {
                // dropping the transaction releases the lock without writing
                return Ok(SessionInsert::LimitReached { active });
            }

            let stale = sqlx::query("DELETE FROM sessions WHERE owner_id = ? AND created_at <= ?")
                .bind(&owner_id)
                .bind(stale_before)
                .execute(&mut *tx)
                .await
                .map_err(store_error)?;
            if stale.rows_affected() > 0 {
                debug!(
                    user_id = %session.owner_id,
                    removed = stale.rows_affected(),
                    "Dropped stale sessions"
                );
            }

            Self::insert(&mut tx, session).await?;
            tx.commit().await.map_err(store_error)?;
            Ok(SessionInsert::Inserted)
        })
        .await
    }

    async fn replace(
        &self,
        old_hash: &str,
        owner_id: Uuid,
        replacement: &Session,
    ) -> Result<bool, DomainError> {
        let operation = "session.replace";
        within_deadline(&self.settings, operation, async {
            let mut tx = begin(&self.pool, &self.settings, operation).await?;

            let current: Option<(String, String)> = sqlx::query_as(
                "SELECT id, owner_id FROM sessions WHERE refresh_token_hash = ? FOR UPDATE",
            )
            .bind(old_hash)
            .fetch_optional(&mut *tx)
            .await
            .map_err(store_error)?;

            let session_id = match current {
                Some((id, owner)) if owner == owner_id.to_string() => id,
                _ => return Ok(false),
            };

            sqlx::query("DELETE FROM sessions WHERE id = ?")
                .bind(&session_id)
                .execute(&mut *tx)
                .await
                .map_err(store_error)?;
            Self::insert(&mut tx, replacement).await?;

            tx.commit().await.map_err(store_error)?;
            Ok(true)
        })
        .await
    }

    async fn find_by_hash(&self, refresh_token_hash: &str) -> Result<Option<Session>, DomainError> {
        let query = format!(
            "SELECT {} FROM sessions WHERE refresh_token_hash = ? LIMIT 1",
            SESSION_COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(refresh_token_hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?;

        row.as_ref().map(session_from_row).transpose()
    }

    async fn count_for_user(&self, user_id: Uuid) -> Result<usize, DomainError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sessions WHERE owner_id = ?")
            .bind(user_id.to_string())
            .fetch_one(&self.pool)
            .await
            .map_err(store_error)?;

        Ok(count.max(0) as usize)
    }

    async fn delete_by_hash(&self, refresh_token_hash: &str) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM sessions WHERE refresh_token_hash = ?")
            .bind(refresh_token_hash)
            .execute(&self.pool)
            .await
            .map_err(store_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_session(
        &self,
        session_token_id: &str,
        user_id: Uuid,
    ) -> Result<u64, DomainError> {
        let result =
            sqlx::query("DELETE FROM sessions WHERE session_token_id = ? AND owner_id = ?")
                .bind(session_token_id)
                .bind(user_id.to_string())
                .execute(&self.pool)
                .await
                .map_err(store_error)?;

        Ok(result.rows_affected())
    }

    async fn delete_all_for_user(&self, user_id: Uuid) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM sessions WHERE owner_id = ?")
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(store_error)?;

        Ok(result.rows_affected())
    }

    async fn delete_created_before(&self, cutoff: DateTime<Utc>) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM sessions WHERE created_at <= ?")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(store_error)?;

        Ok(result.rows_affected())
    }
}
