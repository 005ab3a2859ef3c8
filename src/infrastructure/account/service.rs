use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::config::AccountConfig;
use crate::domain::user::EMAIL_FIELD;
use crate::domain::{
    Clock, DocumentStore, DomainError, Filter, NotificationSender, PasswordHasher, TokenCodec,
    TokenPayload, User, UserView,
};
use crate::infrastructure::repository::GenericRepository;

/// Orchestrates the sign-up and password-reset flows over the users
/// collection
#[derive(Debug)]
pub struct AccountLifecycleService {
    pub(super) users: GenericRepository<User>,
    pub(super) codec: Arc<dyn TokenCodec>,
    pub(super) hasher: Arc<dyn PasswordHasher>,
    pub(super) notifier: Arc<dyn NotificationSender>,
    pub(super) clock: Arc<dyn Clock>,
    pub(super) config: AccountConfig,
    decoy_hash: String,
}

/// Never assigned to an account. Its hash stands in for unknown users.
const DECOY_PASSWORD: &str = "decoy-password-never-assigned";

impl AccountLifecycleService {
    /// Fails with a configuration error when `config` is unusable
    pub fn new(
        store: Arc<dyn DocumentStore>,
        codec: Arc<dyn TokenCodec>,
        hasher: Arc<dyn PasswordHasher>,
        notifier: Arc<dyn NotificationSender>,
        clock: Arc<dyn Clock>,
        config: AccountConfig,
    ) -> Result<Self, DomainError> {
        config.validate()?;

        let decoy_hash = hasher.hash(DECOY_PASSWORD)?;
        let users = GenericRepository::new(store, config.users_collection.clone(), clock.clone());

        Ok(Self {
            users,
            codec,
            hasher,
            notifier,
            clock,
            config,
            decoy_hash,
        })
    }

    /// The underlying user repository
    pub fn users(&self) -> &GenericRepository<User> {
        &self.users
    }

    /// Looks up the active user and checks the password.
    ///
    /// Unknown emails, deactivated accounts and wrong passwords are not told
    /// apart.
    pub async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<UserView, DomainError> {
        let user = self.active_user(email).await?;
        // unknown emails still pay for a comparison
        let stored = user
            .as_ref()
            .map_or(self.decoy_hash.as_str(), |user| user.password_hash());
        let matches = self.hasher.compare(password, stored);

        match user {
            Some(user) if matches => Ok(self.view(&user)),
            _ => Err(DomainError::invalid_field(
                "credentials",
                "Invalid email or password",
            )),
        }
    }

    pub(super) async fn active_user(&self, email: &str) -> Result<Option<User>, DomainError> {
        self.users.find_one(Filter::all().eq(EMAIL_FIELD, email)).await
    }

    /// Decodes `token` and rejects it if it expired before `now`
    pub(super) fn open_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<TokenPayload, DomainError> {
        let payload = self.codec.decode(token)?;
        payload.ensure_valid_at(now)?;
        Ok(payload)
    }

    pub(super) async fn notify(
        &self,
        to: &str,
        subject: &str,
        base_url: &str,
        token: &str,
    ) -> Result<(), DomainError> {
        let link = format!("{}/{}", base_url.trim_end_matches('/'), token);

        self.notifier
            .send(to, subject, &link)
            .await
            .inspect_err(|e| warn!(to = %to, error = %e, "Failed to send notification"))
    }

    pub(super) fn view(&self, user: &User) -> UserView {
        user.view(&self.config.main_company_alias)
    }
}
