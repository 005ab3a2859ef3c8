//! Forgot-password flow: request, validate, reset

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::info;

use crate::domain::user::{validate_email, validate_password, PASSWORD_FIELD};
use crate::domain::{Document, DomainError, Entity, TokenPayload, User, UserView};

use super::service::AccountLifecycleService;

impl AccountLifecycleService {
    /// Sends a reset link to an active account
    pub async fn request_password_reset(&self, email: &str) -> Result<(), DomainError> {
        validate_email(email)?;

        let user = self.require_active_user(email).await?;

        let now = self.clock.now();
        let payload = TokenPayload::issue(user.email(), now, self.config.reset_window());
        let token = self.codec.encode(&payload)?;

        self.notify(
            user.email(),
            &self.config.reset_subject,
            &self.config.reset_url,
            &token,
        )
        .await?;

        info!(email = %email, expiration = %payload.expiration, "Password reset token issued");
        Ok(())
    }

    /// View of the account the token was issued for
    pub async fn validate_reset_token(&self, token: &str) -> Result<UserView, DomainError> {
        let now = self.clock.now();
        let payload = self.open_reset_token(token, now)?;

        let user = self.require_active_user(&payload.email).await?;
        Ok(self.view(&user))
    }

    /// Replaces the password of the account the token was issued for.
    ///
    /// The account is fetched again, so one deactivated after the token was
    /// issued is not found.
    pub async fn reset_password(
        &self,
        token: &str,
        new_password: &str,
    ) -> Result<UserView, DomainError> {
        let now = self.clock.now();
        let payload = self.open_reset_token(token, now)?;

        let user = self.require_active_user(&payload.email).await?;
        validate_password(Some(new_password), self.config.min_password_length)?;

        let hash = self.hasher.hash(new_password)?;
        let mut patch = Document::new();
        patch.insert(PASSWORD_FIELD.to_string(), Value::String(hash));
        let user = self.users.update(user.id(), patch).await?;

        info!(email = %user.email(), id = %user.id(), "Password reset");
        Ok(self.view(&user))
    }

    /// A reset token never outlives the reset window. Longer-lived tokens
    /// were issued by another flow and are refused.
    fn open_reset_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<TokenPayload, DomainError> {
        let payload = self.open_token(token, now)?;

        if payload.expiration > now + self.config.reset_window() {
            return Err(DomainError::InvalidToken);
        }
        Ok(payload)
    }

    async fn require_active_user(&self, email: &str) -> Result<User, DomainError> {
        self.active_user(email)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("No active account for '{}'", email)))
    }
}
