//! Storage factory for runtime backend selection

use std::sync::Arc;

use crate::config::StorageSettings;
use crate::domain::storage::DocumentStore;
use crate::domain::DomainError;

use super::in_memory::InMemoryDocumentStore;
use super::postgres::{PostgresConfig, PostgresDocumentStore};

/// Supported storage types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageType {
    /// In-memory storage (for testing/development)
    InMemory,
    /// PostgreSQL storage
    Postgres,
}

impl StorageType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "memory" | "inmemory" | "in-memory" | "in_memory" => Some(Self::InMemory),
            "postgres" | "postgresql" | "pg" => Some(Self::Postgres),
            _ => None,
        }
    }
}

/// Factory for creating document stores
#[derive(Debug)]
pub struct StorageFactory;

impl StorageFactory {
    /// Creates a store based on the settings
    pub async fn create(settings: &StorageSettings) -> Result<Arc<dyn DocumentStore>, DomainError> {
        let storage_type = StorageType::from_str(&settings.backend).ok_or_else(|| {
            DomainError::configuration(format!("Unknown storage backend '{}'", settings.backend))
        })?;

        match storage_type {
            StorageType::InMemory => Ok(Self::create_in_memory()),
            StorageType::Postgres => {
                let url = settings.url.as_deref().ok_or_else(|| {
                    DomainError::configuration("Postgres storage requires a url")
                })?;
                let config =
                    PostgresConfig::new(url).with_max_connections(settings.max_connections);

                let store: Arc<dyn DocumentStore> =
                    Self::create_postgres(&config, &settings.table).await?;
                Ok(store)
            }
        }
    }

    /// Creates an in-memory store
    pub fn create_in_memory() -> Arc<dyn DocumentStore> {
        Arc::new(InMemoryDocumentStore::new())
    }

    /// Creates a PostgreSQL store and ensures its table exists
    pub async fn create_postgres(
        config: &PostgresConfig,
        table_name: &str,
    ) -> Result<Arc<PostgresDocumentStore>, DomainError> {
        let store = PostgresDocumentStore::connect(config, table_name).await?;
        store.ensure_table().await?;
        Ok(Arc::new(store))
    }
}
