//! In-memory document store implementation

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::entity::ID_FIELD;
use crate::domain::storage::{Document, DocumentStore, Filter, Query};
use crate::domain::DomainError;

/// Thread-safe in-memory document store
///
/// Useful for testing and development. Data is lost when the process terminates.
/// Documents keep insertion order, which is the order unsorted queries return.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl InMemoryDocumentStore {
    /// Creates a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store with one collection pre-populated.
    ///
    /// Documents are taken as given; those without an `id` are skipped.
    pub fn with_documents(collection: &str, documents: Vec<Document>) -> Self {
        let documents = documents
            .into_iter()
            .filter(|d| document_id(d).is_some())
            .collect();

        let mut collections = HashMap::new();
        collections.insert(collection.to_string(), documents);

        Self {
            collections: RwLock::new(collections),
        }
    }
}

fn document_id(document: &Document) -> Option<&str> {
    document.get(ID_FIELD).and_then(Value::as_str)
}

fn lock_error(e: impl std::fmt::Display) -> DomainError {
    DomainError::storage(format!("Failed to acquire lock: {}", e))
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn find(&self, collection: &str, id: &str) -> Result<Option<Document>, DomainError> {
        let collections = self.collections.read().map_err(lock_error)?;

        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| document_id(d) == Some(id)))
            .cloned())
    }

    async fn find_all(&self, collection: &str, query: &Query) -> Result<Vec<Document>, DomainError> {
        query.filter.validate()?;

        let collections = self.collections.read().map_err(lock_error)?;
        let Some(docs) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut matched: Vec<&Document> = docs.iter().filter(|d| query.filter.matches(d)).collect();

        if !query.order.is_empty() {
            matched.sort_by(|a, b| query.compare(a, b));
        }

        Ok(matched
            .into_iter()
            .skip(query.offset.unwrap_or(0))
            .take(query.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<usize, DomainError> {
        filter.validate()?;

        let collections = self.collections.read().map_err(lock_error)?;

        Ok(collections
            .get(collection)
            .map_or(0, |docs| docs.iter().filter(|d| filter.matches(d)).count()))
    }

    async fn create(&self, collection: &str, mut document: Document) -> Result<Document, DomainError> {
        let id = match document.get(ID_FIELD) {
            None | Some(Value::Null) => Uuid::new_v4().to_string(),
            Some(Value::String(id)) if !id.is_empty() => id.clone(),
            Some(_) => {
                return Err(DomainError::invalid_field(
                    ID_FIELD,
                    "Document id must be a non-empty string",
                ));
            }
        };
        document.insert(ID_FIELD.to_string(), Value::String(id.clone()));

        let mut collections = self.collections.write().map_err(lock_error)?;
        let docs = collections.entry(collection.to_string()).or_default();

        if docs.iter().any(|d| document_id(d) == Some(id.as_str())) {
            return Err(DomainError::conflict(format!(
                "Document '{}' already exists in '{}'",
                id, collection
            )));
        }

        docs.push(document.clone());
        Ok(document)
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: Document,
    ) -> Result<Document, DomainError> {
        if let Some(patched_id) = patch.get(ID_FIELD) {
            if patched_id.as_str() != Some(id) {
                return Err(DomainError::bad_request("Document id cannot be changed"));
            }
        }

        let mut collections = self.collections.write().map_err(lock_error)?;
        let document = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|d| document_id(d) == Some(id)))
            .ok_or_else(|| {
                DomainError::not_found(format!("Document '{}' not found in '{}'", id, collection))
            })?;

        for (key, value) in patch {
            document.insert(key, value);
        }

        Ok(document.clone())
    }
}
