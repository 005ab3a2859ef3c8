//! Outbound notification seam

use std::fmt::Debug;

use async_trait::async_trait;

use crate::domain::DomainError;

/// Delivers a message to a recipient. Rendering and transport belong to the
/// implementation.
#[async_trait]
pub trait NotificationSender: Send + Sync + Debug {
    /// Failures are reported as [`DomainError::Upstream`]
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), DomainError>;
}
