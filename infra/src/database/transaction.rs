//! Transaction limits for the credential store
//!
//! Every multi-row repository operation runs as
//! `within_deadline(settings, op, async { begin(..) ... commit })`. When the
//! deadline fires the future is dropped, which drops the open transaction and
//! rolls it back.

use sqlx::{MySql, MySqlPool, Transaction};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

use cb_core::errors::DomainError;
use cb_shared::config::DatabaseConfig;

use super::store_error;

/// How long a transaction may wait for a connection and how long its body
/// may run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionSettings {
    pub max_wait: Duration,
    pub timeout: Duration,
}

impl Default for TransactionSettings {
    fn default() -> Self {
        Self::from(&DatabaseConfig::default())
    }
}

impl From<&DatabaseConfig> for TransactionSettings {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            max_wait: Duration::from_millis(config.transaction_max_wait_ms),
            timeout: Duration::from_millis(config.transaction_timeout_ms),
        }
    }
}

/// Open a transaction, waiting at most `settings.max_wait` for a connection
pub async fn begin(
    pool: &MySqlPool,
    settings: &TransactionSettings,
    operation: &str,
) -> Result<Transaction<'static, MySql>, DomainError> {
    match tokio::time::timeout(settings.max_wait, pool.begin()).await {
        Ok(result) => result.map_err(store_error),
        Err(_) => {
            warn!(operation, "Timed out waiting for a database connection");
            Err(DomainError::Timeout {
                operation: operation.to_string(),
            })
        }
    }
}

/// Run `body` under `settings.timeout`
pub async fn within_deadline<T, F>(
    settings: &TransactionSettings,
    operation: &str,
    body: F,
) -> Result<T, DomainError>
where
    F: Future<Output = Result<T, DomainError>>,
{
    match tokio::time::timeout(settings.timeout, body).await {
        Ok(result) => result,
        Err(_) => {
            warn!(operation, "Transaction exceeded its deadline, rolled back");
            Err(DomainError::Timeout {
                operation: operation.to_string(),
            })
        }
    }
}
