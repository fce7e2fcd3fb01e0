//! Row decoding shared by the MySQL repositories
//!
//! Ids are stored as `CHAR(36)`; timestamps as `DATETIME(6)` in UTC.

use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{Decode, MySql, Row, Type};
use uuid::Uuid;

use cb_core::domain::entities::{PasswordResetToken, Session, User, VerificationToken};
use cb_core::errors::DomainError;

pub(crate) const USER_COLUMNS: &str = "u.id, u.email, u.first_name, u.last_name, \
     u.password_hash, u.is_verified, u.created_at, u.updated_at, u.deleted_at";

pub(crate) const SESSION_COLUMNS: &str =
    "id, owner_id, refresh_token_hash, session_token_id, created_at";

/// Verification token columns, aliased so they can sit next to user columns
pub(crate) const VERIFICATION_COLUMNS: &str = "t.id AS token_id, t.token AS token_value, \
     t.user_id AS token_user_id, t.expires_at AS token_expires_at, \
     t.created_at AS token_created_at";

/// Reset token columns, aliased so they can sit next to user columns
pub(crate) const RESET_COLUMNS: &str = "t.id AS token_id, t.token_digest AS token_value, \
     t.user_id AS token_user_id, t.expires_at AS token_expires_at, \
     t.created_at AS token_created_at";

fn column<'r, T>(row: &'r MySqlRow, name: &str) -> Result<T, DomainError>
where
    T: Decode<'r, MySql> + Type<MySql>,
{
    row.try_get(name).map_err(|e| DomainError::Internal {
        message: format!("Failed to get {}: {}", name, e),
    })
}

fn uuid_column(row: &MySqlRow, name: &str) -> Result<Uuid, DomainError> {
    let raw: String = column(row, name)?;
    Uuid::parse_str(&raw).map_err(|e| DomainError::Internal {
        message: format!("Invalid UUID in {}: {}", name, e),
    })
}

pub(crate) fn user_from_row(row: &MySqlRow) -> Result<User, DomainError> {
    Ok(User {
        id: uuid_column(row, "id")?,
        email: column(row, "email")?,
        first_name: column(row, "first_name")?,
        last_name: column(row, "last_name")?,
        password_hash: column(row, "password_hash")?,
        is_verified: column(row, "is_verified")?,
        created_at: column::<DateTime<Utc>>(row, "created_at")?,
        updated_at: column::<DateTime<Utc>>(row, "updated_at")?,
        deleted_at: column::<Option<DateTime<Utc>>>(row, "deleted_at")?,
    })
}

pub(crate) fn session_from_row(row: &MySqlRow) -> Result<Session, DomainError> {
    Ok(Session {
        id: uuid_column(row, "id")?,
        owner_id: uuid_column(row, "owner_id")?,
        refresh_token_hash: column(row, "refresh_token_hash")?,
        session_token_id: column(row, "session_token_id")?,
        created_at: column::<DateTime<Utc>>(row, "created_at")?,
    })
}

pub(crate) fn verification_token_from_row(row: &MySqlRow) -> Result<VerificationToken, DomainError> {
    Ok(VerificationToken {
        id: uuid_column(row, "token_id")?,
        token: column(row, "token_value")?,
        user_id: uuid_column(row, "token_user_id")?,
        expires_at: column::<DateTime<Utc>>(row, "token_expires_at")?,
        created_at: column::<DateTime<Utc>>(row, "token_created_at")?,
    })
}

pub(crate) fn reset_token_from_row(row: &MySqlRow) -> Result<PasswordResetToken, DomainError> {
    Ok(PasswordResetToken {
        id: uuid_column(row, "token_id")?,
        token_digest: column(row, "token_value")?,
        user_id: uuid_column(row, "token_user_id")?,
        expires_at: column::<DateTime<Utc>>(row, "token_expires_at")?,
        created_at: column::<DateTime<Utc>>(row, "token_created_at")?,
    })
}
