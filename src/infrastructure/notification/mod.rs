//! Notification sender implementations

use async_trait::async_trait;
use tracing::info;

use crate::domain::{DomainError, NotificationSender};

/// Sender that only records the delivery request in the log.
///
/// The body carries a live token and is not logged.
#[derive(Debug, Clone, Default)]
pub struct TracingNotificationSender;

impl TracingNotificationSender {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationSender for TracingNotificationSender {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), DomainError> {
        info!(to = %to, subject = %subject, body_len = body.len(), "Notification requested");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_succeeds() {
        let sender = TracingNotificationSender::new();
        assert!(sender
            .send("ana@example.com", "Subject", "http://localhost/signup/token")
            .await
            .is_ok());
    }
}
