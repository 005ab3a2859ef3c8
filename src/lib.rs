//! Account DAO
//!
//! A generic data-access layer with soft delete and pagination over a
//! document store, plus a stateless token-based account lifecycle:
//! - Typed repositories scoped to active records
//! - In-memory and PostgreSQL (JSONB) document stores
//! - Encrypted, time-boxed sign-up and password-reset tokens
//! - Argon2 credential hashing

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use tracing::info;

use domain::SystemClock;
use infrastructure::account::AccountLifecycleService;
use infrastructure::notification::TracingNotificationSender;
use infrastructure::storage::StorageFactory;
use infrastructure::token::AesGcmTokenCodec;
use infrastructure::user::Argon2Hasher;

/// Wire the account lifecycle service from configuration
pub async fn create_account_service(config: &AppConfig) -> anyhow::Result<AccountLifecycleService> {
    info!("Storage backend: {}", config.storage.backend);
    let store = StorageFactory::create(&config.storage).await?;

    let codec = AesGcmTokenCodec::new(&config.accounts.token_secret)?;

    let service = AccountLifecycleService::new(
        store,
        Arc::new(codec),
        Arc::new(Argon2Hasher::new()),
        Arc::new(TracingNotificationSender::new()),
        Arc::new(SystemClock),
        config.accounts.clone(),
    )?;

    Ok(service)
}
