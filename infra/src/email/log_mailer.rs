//! Email sender that only records deliveries in the log
//!
//! Template rendering and SMTP transport belong to a mail service; this
//! sender stands in for it and never fails.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

use cb_core::errors::DomainError;
use cb_core::services::EmailSender;
use cb_shared::utils::email::mask_email;

/// `EmailSender` that logs the recipient and template
#[derive(Debug, Default)]
pub struct LogEmailSender {
    delivered: AtomicU64,
}

impl LogEmailSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of emails recorded so far
    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send(
        &self,
        to: &str,
        template: &str,
        context: serde_json::Value,
    ) -> Result<(), DomainError> {
        // the context carries single-use tokens, so only its keys are logged
        let fields: Vec<&str> = context
            .as_object()
            .map(|map| map.keys().map(String::as_str).collect())
            .unwrap_or_default();

        info!(to = %mask_email(to), template, ?fields, "Email dispatched");
        self.delivered.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
