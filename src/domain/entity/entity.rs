//! Entity capability shared by every persisted record

use std::fmt::Debug;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

pub const ID_FIELD: &str = "id";
pub const ACTIVE_FIELD: &str = "active";
pub const CREATED_AT_FIELD: &str = "createdAt";
pub const UPDATED_AT_FIELD: &str = "updatedAt";

/// Fields every stored record carries, whatever its collection.
///
/// Flattened into the concrete entity so the stored document keeps them at
/// the top level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityMeta {
    /// Store-assigned identifier, empty until the record is created
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// Cleared by soft delete
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_active() -> bool {
    true
}

impl Default for EntityMeta {
    fn default() -> Self {
        Self {
            id: String::new(),
            active: true,
            created_at: None,
            updated_at: None,
        }
    }
}

/// A record type the generic repository can manage
pub trait Entity: Clone + Debug + Send + Sync + Serialize + DeserializeOwned + 'static {
    fn meta(&self) -> &EntityMeta;

    /// Schema-declared required fields, in addition to `active` and `createdAt`
    fn required_fields() -> &'static [&'static str] {
        &[]
    }

    fn id(&self) -> &str {
        &self.meta().id
    }

    fn is_active(&self) -> bool {
        self.meta().active
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.meta().created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.meta().updated_at
    }
}
