//! Document store trait definition

use std::fmt::Debug;

use async_trait::async_trait;

use crate::domain::DomainError;

use super::filter::{Document, Filter};
use super::query::Query;

/// Schemaless collection store the repositories are built on.
///
/// Implementations assign `id` on create when the document has none and
/// merge patches shallowly on update. Writes are atomic per document.
#[async_trait]
pub trait DocumentStore: Send + Sync + Debug {
    /// Retrieves a document by id
    async fn find(&self, collection: &str, id: &str) -> Result<Option<Document>, DomainError>;

    /// Retrieves the documents matching the query, ordered and windowed
    async fn find_all(&self, collection: &str, query: &Query) -> Result<Vec<Document>, DomainError>;

    /// Counts documents matching the filter
    async fn count(&self, collection: &str, filter: &Filter) -> Result<usize, DomainError> {
        Ok(self
            .find_all(collection, &Query::new(filter.clone()))
            .await?
            .len())
    }

    /// Inserts a document, returns it with its assigned id
    async fn create(&self, collection: &str, document: Document) -> Result<Document, DomainError>;

    /// Merges a patch into an existing document, returns the merged document
    async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: Document,
    ) -> Result<Document, DomainError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Wraps a store to count calls and inject failures
    #[derive(Debug)]
    pub struct InstrumentedStore {
        inner: Arc<dyn DocumentStore>,
        should_fail: AtomicBool,
        find_all_calls: AtomicUsize,
        writes: AtomicUsize,
    }

    impl InstrumentedStore {
        pub fn new(inner: Arc<dyn DocumentStore>) -> Self {
            Self {
                inner,
                should_fail: AtomicBool::new(false),
                find_all_calls: AtomicUsize::new(0),
                writes: AtomicUsize::new(0),
            }
        }

        pub fn set_should_fail(&self, fail: bool) {
            self.should_fail.store(fail, Ordering::SeqCst);
        }

        pub fn find_all_calls(&self) -> usize {
            self.find_all_calls.load(Ordering::SeqCst)
        }

        pub fn writes(&self) -> usize {
            self.writes.load(Ordering::SeqCst)
        }

        fn check_should_fail(&self) -> Result<(), DomainError> {
            if self.should_fail.load(Ordering::SeqCst) {
                return Err(DomainError::storage("Mock store configured to fail"));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl DocumentStore for InstrumentedStore {
        async fn find(&self, collection: &str, id: &str) -> Result<Option<Document>, DomainError> {
            self.check_should_fail()?;
            self.inner.find(collection, id).await
        }

        async fn find_all(
            &self,
            collection: &str,
            query: &Query,
        ) -> Result<Vec<Document>, DomainError> {
            self.find_all_calls.fetch_add(1, Ordering::SeqCst);
            self.check_should_fail()?;
            self.inner.find_all(collection, query).await
        }

        async fn count(&self, collection: &str, filter: &Filter) -> Result<usize, DomainError> {
            self.check_should_fail()?;
            self.inner.count(collection, filter).await
        }

        async fn create(
            &self,
            collection: &str,
            document: Document,
        ) -> Result<Document, DomainError> {
            self.check_should_fail()?;
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.create(collection, document).await
        }

        async fn update(
            &self,
            collection: &str,
            id: &str,
            patch: Document,
        ) -> Result<Document, DomainError> {
            self.check_should_fail()?;
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.update(collection, id, patch).await
        }
    }
}
