use chrono::Duration;
use serde::Deserialize;

use crate::domain::DomainError;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub storage: StorageSettings,
    pub accounts: AccountConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

/// Document store selection
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// `memory` or `postgres`
    pub backend: String,
    pub url: Option<String>,
    pub max_connections: u32,
    /// Table holding every collection when the backend is postgres
    pub table: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: "memory".to_string(),
            url: None,
            max_connections: 10,
            table: "documents".to_string(),
        }
    }
}

/// Account lifecycle settings
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct AccountConfig {
    /// Symmetric secret the token key is derived from
    pub token_secret: String,
    pub sign_up_window_minutes: i64,
    pub reset_window_minutes: i64,
    pub min_password_length: usize,
    pub users_collection: String,
    /// Users whose company alias equals this one are administrators
    pub main_company_alias: String,
    /// Base URLs the token is appended to in notifications
    pub sign_up_url: String,
    pub reset_url: String,
    pub sign_up_subject: String,
    pub reset_subject: String,
}

impl std::fmt::Debug for AccountConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountConfig")
            .field("token_secret", &"[hidden]")
            .field("sign_up_window_minutes", &self.sign_up_window_minutes)
            .field("reset_window_minutes", &self.reset_window_minutes)
            .field("min_password_length", &self.min_password_length)
            .field("users_collection", &self.users_collection)
            .field("main_company_alias", &self.main_company_alias)
            .field("sign_up_url", &self.sign_up_url)
            .field("reset_url", &self.reset_url)
            .finish()
    }
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            token_secret: String::new(),
            sign_up_window_minutes: 24 * 60,
            reset_window_minutes: 60,
            min_password_length: 6,
            users_collection: "users".to_string(),
            main_company_alias: String::new(),
            sign_up_url: "http://localhost:3000/signup".to_string(),
            reset_url: "http://localhost:3000/auth/forgot".to_string(),
            sign_up_subject: "Confirm your registration".to_string(),
            reset_subject: "Password recovery".to_string(),
        }
    }
}

impl AccountConfig {
    /// Defaults with the given token secret
    pub fn new(token_secret: impl Into<String>) -> Self {
        Self {
            token_secret: token_secret.into(),
            ..Default::default()
        }
    }

    pub fn sign_up_window(&self) -> Duration {
        Duration::minutes(self.sign_up_window_minutes)
    }

    pub fn reset_window(&self) -> Duration {
        Duration::minutes(self.reset_window_minutes)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.token_secret.is_empty() {
            return Err(DomainError::configuration("accounts.token_secret must be set"));
        }

        if self.sign_up_window_minutes <= 0 || self.reset_window_minutes <= 0 {
            return Err(DomainError::configuration("Token windows must be positive"));
        }

        if self.min_password_length == 0 {
            return Err(DomainError::configuration(
                "accounts.min_password_length must be at least 1",
            ));
        }

        if self.users_collection.is_empty() {
            return Err(DomainError::configuration("accounts.users_collection must be set"));
        }

        Ok(())
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
