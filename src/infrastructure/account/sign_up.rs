//! Sign-up flow: request, validate, complete

use tracing::info;

use crate::domain::user::{validate_email, validate_password, COMPANY_ALIAS_FIELD};
use crate::domain::{DomainError, Entity, TokenPayload, User, UserView};

use super::service::AccountLifecycleService;

/// What the user submits to finish signing up
#[derive(Clone, Default)]
pub struct SignUpCredentials {
    pub password: Option<String>,
    pub name: Option<String>,
    pub company_alias: Option<String>,
}

impl std::fmt::Debug for SignUpCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignUpCredentials")
            .field("password", &self.password.as_ref().map(|_| "[hidden]"))
            .field("name", &self.name)
            .field("company_alias", &self.company_alias)
            .finish()
    }
}

impl SignUpCredentials {
    pub fn new(password: impl Into<String>) -> Self {
        Self {
            password: Some(password.into()),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_company_alias(mut self, company_alias: impl Into<String>) -> Self {
        self.company_alias = Some(company_alias.into());
        self
    }
}

impl AccountLifecycleService {
    /// Sends a confirmation link to `email`. Nothing is persisted.
    pub async fn request_sign_up(&self, email: &str) -> Result<(), DomainError> {
        validate_email(email)?;

        let now = self.clock.now();
        let payload = TokenPayload::issue(email, now, self.config.sign_up_window());
        let token = self.codec.encode(&payload)?;

        self.notify(
            email,
            &self.config.sign_up_subject,
            &self.config.sign_up_url,
            &token,
        )
        .await?;

        info!(email = %email, expiration = %payload.expiration, "Sign-up token issued");
        Ok(())
    }

    /// Blank view carrying the token's email, for the sign-up form
    pub async fn validate_sign_up_token(&self, token: &str) -> Result<UserView, DomainError> {
        let now = self.clock.now();
        let payload = self.open_token(token, now)?;

        Ok(UserView::draft(payload.email))
    }

    /// Creates the account for the token's email.
    ///
    /// Checks run in a fixed order: expiration, then uniqueness among active
    /// users, then password strength. Administrators are not self-appointed,
    /// so the main company alias is refused.
    pub async fn complete_sign_up(
        &self,
        token: &str,
        credentials: SignUpCredentials,
    ) -> Result<UserView, DomainError> {
        let now = self.clock.now();
        let payload = self.open_token(token, now)?;

        if self.active_user(&payload.email).await?.is_some() {
            return Err(DomainError::conflict(format!(
                "An account already exists for '{}'",
                payload.email
            )));
        }

        validate_password(
            credentials.password.as_deref(),
            self.config.min_password_length,
        )?;
        if credentials.company_alias.as_deref().is_some_and(|alias| {
            !self.config.main_company_alias.is_empty() && alias == self.config.main_company_alias
        }) {
            return Err(DomainError::invalid_field(
                COMPANY_ALIAS_FIELD,
                "Company alias is reserved",
            ));
        }

        let password = credentials.password.as_deref().unwrap_or_default();
        let hash = self.hasher.hash(password)?;

        let user = User::new(payload.email, hash)
            .with_name(credentials.name)
            .with_company_alias(credentials.company_alias);
        let user = self.users.create(user).await?;

        info!(email = %user.email(), id = %user.id(), "Sign-up completed");
        Ok(self.view(&user))
    }
}
