//! Typed CRUD with soft delete over one document-store collection

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use tracing::debug;

use crate::domain::entity::{ACTIVE_FIELD, CREATED_AT_FIELD, ID_FIELD, UPDATED_AT_FIELD};
use crate::domain::{
    Clock, Document, DocumentStore, DomainError, Entity, Filter, PageRequest, PaginatedResult,
    Query,
};

/// Repository for one entity type stored in one collection.
///
/// Every standard read is scoped to `active = true`. The `*_including_inactive`
/// methods are the only way around that scope.
pub struct GenericRepository<T: Entity> {
    store: Arc<dyn DocumentStore>,
    collection: String,
    clock: Arc<dyn Clock>,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> fmt::Debug for GenericRepository<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenericRepository")
            .field("collection", &self.collection)
            .field("store", &self.store)
            .finish()
    }
}

impl<T: Entity> Clone for GenericRepository<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            collection: self.collection.clone(),
            clock: Arc::clone(&self.clock),
            _entity: PhantomData,
        }
    }
}

fn active_only(filter: Filter) -> Filter {
    filter.and(Filter::all().eq(ACTIVE_FIELD, true))
}

fn is_active(document: &Document) -> bool {
    document.get(ACTIVE_FIELD).and_then(Value::as_bool) == Some(true)
}

fn timestamp(at: DateTime<Utc>) -> Value {
    Value::String(at.to_rfc3339_opts(SecondsFormat::Nanos, true))
}

fn is_missing(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

impl<T: Entity> GenericRepository<T> {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        collection: impl Into<String>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            collection: collection.into(),
            clock,
            _entity: PhantomData,
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    fn to_document(entity: &T) -> Result<Document, DomainError> {
        match serde_json::to_value(entity) {
            Ok(Value::Object(document)) => Ok(document),
            Ok(_) => Err(DomainError::internal("Entity did not serialize to an object")),
            Err(e) => Err(DomainError::internal(format!("Failed to serialize entity: {}", e))),
        }
    }

    fn from_document(&self, document: Document) -> Result<T, DomainError> {
        serde_json::from_value(Value::Object(document)).map_err(|e| {
            DomainError::internal(format!(
                "Malformed document in '{}': {}",
                self.collection, e
            ))
        })
    }

    fn validate_required(document: &Document) -> Result<(), DomainError> {
        let required = [ACTIVE_FIELD, CREATED_AT_FIELD]
            .into_iter()
            .chain(T::required_fields().iter().copied());

        for field in required {
            if is_missing(document.get(field)) {
                return Err(DomainError::invalid_field(
                    field,
                    format!("Field '{}' is required", field),
                ));
            }
        }

        Ok(())
    }

    /// Deserializing the candidate document catches fields of the wrong type
    fn validate_shape(document: &Document) -> Result<(), DomainError> {
        serde_json::from_value::<T>(Value::Object(document.clone()))
            .map(|_| ())
            .map_err(|e| DomainError::validation(e.to_string()))
    }

    async fn find_active_document(&self, id: &str) -> Result<Document, DomainError> {
        self.store
            .find(&self.collection, id)
            .await?
            .filter(is_active)
            .ok_or_else(|| {
                DomainError::not_found(format!("'{}' not found in '{}'", id, self.collection))
            })
    }

    /// Active record by id
    pub async fn find(&self, id: &str) -> Result<T, DomainError> {
        let document = self.find_active_document(id).await?;
        self.from_document(document)
    }

    /// Active records matching the filter
    pub async fn find_all(&self, filter: Filter) -> Result<Vec<T>, DomainError> {
        self.query(Query::new(active_only(filter))).await
    }

    /// First active record matching the filter, if any
    pub async fn find_one(&self, filter: Filter) -> Result<Option<T>, DomainError> {
        let query = Query::new(active_only(filter)).with_limit(1);
        Ok(self.query(query).await?.into_iter().next())
    }

    /// Record by id whatever its active flag
    pub async fn find_including_inactive(&self, id: &str) -> Result<T, DomainError> {
        let document = self.store.find(&self.collection, id).await?.ok_or_else(|| {
            DomainError::not_found(format!("'{}' not found in '{}'", id, self.collection))
        })?;
        self.from_document(document)
    }

    /// Records matching the filter whatever their active flag
    pub async fn find_all_including_inactive(&self, filter: Filter) -> Result<Vec<T>, DomainError> {
        self.query(Query::new(filter)).await
    }

    async fn query(&self, query: Query) -> Result<Vec<T>, DomainError> {
        self.store
            .find_all(&self.collection, &query)
            .await?
            .into_iter()
            .map(|document| self.from_document(document))
            .collect()
    }

    /// Persists a new active record. Any id on `entity` is discarded in
    /// favour of a store-assigned one.
    pub async fn create(&self, entity: T) -> Result<T, DomainError> {
        let now = self.clock.now();
        let mut document = Self::to_document(&entity)?;

        // ids are always store-generated
        document.remove(ID_FIELD);

        document.insert(ACTIVE_FIELD.to_string(), Value::Bool(true));
        document.insert(CREATED_AT_FIELD.to_string(), timestamp(now));
        document.insert(UPDATED_AT_FIELD.to_string(), timestamp(now));

        Self::validate_required(&document)?;

        let created = self.store.create(&self.collection, document).await?;
        let entity = self.from_document(created)?;

        debug!(collection = %self.collection, id = %entity.id(), "Created record");
        Ok(entity)
    }

    /// Merges a patch into an active record.
    ///
    /// `id`, `active` and `createdAt` are not patchable and are dropped from
    /// the patch. The merged record must still satisfy the required fields.
    pub async fn update(&self, id: &str, mut patch: Document) -> Result<T, DomainError> {
        let now = self.clock.now();
        let existing = self.find_active_document(id).await?;

        patch.remove(ID_FIELD);
        patch.remove(ACTIVE_FIELD);
        patch.remove(CREATED_AT_FIELD);
        patch.insert(UPDATED_AT_FIELD.to_string(), timestamp(now));

        let mut merged = existing;
        for (key, value) in &patch {
            merged.insert(key.clone(), value.clone());
        }
        Self::validate_required(&merged)?;
        Self::validate_shape(&merged)?;

        let updated = self.store.update(&self.collection, id, patch).await?;
        let entity = self.from_document(updated)?;

        debug!(collection = %self.collection, id = %id, "Updated record");
        Ok(entity)
    }

    /// Writes every field of an already created entity
    pub async fn save(&self, entity: &T) -> Result<T, DomainError> {
        if entity.id().is_empty() {
            return Err(DomainError::invalid_field(
                ID_FIELD,
                "Only created records can be saved",
            ));
        }

        let document = Self::to_document(entity)?;
        self.update(entity.id(), document).await
    }

    /// Soft delete: the record stays in the store with `active = false`
    pub async fn delete(&self, id: &str) -> Result<bool, DomainError> {
        let now = self.clock.now();
        self.find_active_document(id).await?;

        let mut patch = Document::new();
        patch.insert(ACTIVE_FIELD.to_string(), Value::Bool(false));
        patch.insert(UPDATED_AT_FIELD.to_string(), timestamp(now));
        self.store.update(&self.collection, id, patch).await?;

        debug!(collection = %self.collection, id = %id, "Deactivated record");
        Ok(true)
    }

    /// One window of the active records matching the filter.
    ///
    /// `total` is counted with the same scoped filter as the window.
    pub async fn paginated_query(
        &self,
        filter: &Filter,
        page: &PageRequest,
    ) -> Result<PaginatedResult<T>, DomainError> {
        let scoped = active_only(filter.clone());
        let total = self.store.count(&self.collection, &scoped).await?;

        let query = Query::new(scoped)
            .with_order(page.order().to_vec())
            .with_offset(page.offset())
            .with_limit(page.limit());
        let result = self.query(query).await?;

        Ok(PaginatedResult {
            page: page.page(),
            total,
            result,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clock::mock::FixedClock;
    use crate::domain::storage::mock::InstrumentedStore;
    use crate::domain::storage::{Condition, OrderBy};
    use crate::domain::{EntityMeta, ErrorKind};
    use crate::infrastructure::storage::InMemoryDocumentStore;
    use chrono::Duration;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Car {
        #[serde(flatten)]
        meta: EntityMeta,
        model: String,
        year: i64,
    }

    impl Car {
        fn new(model: &str, year: i64) -> Self {
            Self {
                meta: EntityMeta::default(),
                model: model.to_string(),
                year,
            }
        }
    }

    impl Entity for Car {
        fn meta(&self) -> &EntityMeta {
            &self.meta
        }

        fn required_fields() -> &'static [&'static str] {
            &["model"]
        }
    }

    struct Fixture {
        repository: GenericRepository<Car>,
        store: Arc<InstrumentedStore>,
        clock: Arc<FixedClock>,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InstrumentedStore::new(Arc::new(InMemoryDocumentStore::new())));
        let clock = Arc::new(FixedClock::default());
        let repository = GenericRepository::new(store.clone(), "cars", clock.clone());
        Fixture {
            repository,
            store,
            clock,
        }
    }

    fn patch(value: Value) -> Document {
        value.as_object().unwrap().clone()
    }

    #[tokio::test]
    async fn test_created_record_is_active_with_id_and_timestamps() {
        let f = fixture();

        let car = f.repository.create(Car::new("beetle", 1970)).await.unwrap();

        assert!(car.is_active());
        assert!(!car.id().is_empty());
        assert_eq!(car.created_at(), Some(f.clock.now()));
        assert_eq!(car.updated_at(), Some(f.clock.now()));
    }

    #[tokio::test]
    async fn test_created_ids_are_unique() {
        let f = fixture();

        let a = f.repository.create(Car::new("a", 1)).await.unwrap();
        let b = f.repository.create(Car::new("b", 2)).await.unwrap();

        assert_ne!(a.id(), b.id());
    }

    #[tokio::test]
    async fn test_create_ignores_caller_id() {
        let f = fixture();
        let first = f.repository.create(Car::new("a", 1)).await.unwrap();

        let mut car = Car::new("b", 2);
        car.meta.id = first.id().to_string();
        let second = f.repository.create(car).await.unwrap();

        assert_ne!(second.id(), first.id());
        assert_eq!(f.repository.find(first.id()).await.unwrap().model, "a");
    }

    #[tokio::test]
    async fn test_create_ignores_caller_active_flag() {
        let f = fixture();
        let mut car = Car::new("a", 1);
        car.meta.active = false;

        let created = f.repository.create(car).await.unwrap();
        assert!(created.is_active());
    }

    #[tokio::test]
    async fn test_create_rejects_missing_required_field() {
        let f = fixture();

        let error = f.repository.create(Car::new("", 1)).await.unwrap_err();

        assert_eq!(error.kind(), ErrorKind::Validation);
        assert_eq!(error.field(), Some("model"));
        assert_eq!(f.store.writes(), 0);
    }

    #[tokio::test]
    async fn test_delete_then_find_is_not_found() {
        let f = fixture();
        let car = f.repository.create(Car::new("a", 1)).await.unwrap();

        assert!(f.repository.delete(car.id()).await.unwrap());

        let error = f.repository.find(car.id()).await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_delete_twice_is_not_found() {
        let f = fixture();
        let car = f.repository.create(Car::new("a", 1)).await.unwrap();
        f.repository.delete(car.id()).await.unwrap();

        let error = f.repository.delete(car.id()).await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::NotFound);

        let missing = f.repository.delete("nope").await.unwrap_err();
        assert_eq!(missing.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_inactive_records_only_visible_through_bypass() {
        let f = fixture();
        let kept = f.repository.create(Car::new("kept", 1)).await.unwrap();
        let gone = f.repository.create(Car::new("gone", 2)).await.unwrap();
        f.repository.delete(gone.id()).await.unwrap();

        let active = f.repository.find_all(Filter::all()).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id(), kept.id());

        // a caller filter on `active` cannot widen the scope
        let inactive = f
            .repository
            .find_all(Filter::all().eq("active", false))
            .await
            .unwrap();
        assert!(inactive.is_empty());

        let everything = f
            .repository
            .find_all_including_inactive(Filter::all())
            .await
            .unwrap();
        assert_eq!(everything.len(), 2);

        let found = f.repository.find_including_inactive(gone.id()).await.unwrap();
        assert!(!found.is_active());
    }

    #[tokio::test]
    async fn test_find_one_returns_first_active_match() {
        let f = fixture();
        f.repository.create(Car::new("a", 1)).await.unwrap();

        let found = f.repository.find_one(Filter::all().eq("model", "a")).await.unwrap();
        assert_eq!(found.unwrap().year, 1);

        let none = f.repository.find_one(Filter::all().eq("model", "z")).await.unwrap();
        assert!(none.is_none());
    }

    #[tokio::test]
    async fn test_second_page_of_twenty_five() {
        let f = fixture();
        for year in 1..=25 {
            f.repository.create(Car::new("beetle", year)).await.unwrap();
        }

        let page = f
            .repository
            .paginated_query(&Filter::all(), &PageRequest::new(2, 10))
            .await
            .unwrap();

        assert_eq!(page.page, 2);
        assert_eq!(page.result.len(), 10);
        assert_eq!(page.total, 25);
        assert_eq!(page.result[0].year, 11);
    }

    #[tokio::test]
    async fn test_pagination_total_uses_scoped_filter() {
        let f = fixture();
        for year in 1..=12 {
            let car = f.repository.create(Car::new("beetle", year)).await.unwrap();
            if year % 4 == 0 {
                f.repository.delete(car.id()).await.unwrap();
            }
        }
        f.repository.create(Car::new("golf", 99)).await.unwrap();

        let filter = Filter::all().eq("model", "beetle");
        let request = PageRequest::new(1, 5).with_order(vec![OrderBy::desc("year")]);
        let page = f.repository.paginated_query(&filter, &request).await.unwrap();

        assert_eq!(page.total, 9);
        let years: Vec<i64> = page.result.iter().map(|c| c.year).collect();
        assert_eq!(years, vec![11, 10, 9, 7, 6]);
    }

    #[tokio::test]
    async fn test_last_partial_page() {
        let f = fixture();
        for year in 1..=25 {
            f.repository.create(Car::new("beetle", year)).await.unwrap();
        }

        let page = f
            .repository
            .paginated_query(&Filter::all(), &PageRequest::new(3, 10))
            .await
            .unwrap();
        assert_eq!(page.result.len(), 5);
        assert_eq!(page.total, 25);
    }

    #[tokio::test]
    async fn test_update_merges_and_touches_updated_at() {
        let f = fixture();
        let car = f.repository.create(Car::new("a", 1)).await.unwrap();
        let created_at = car.created_at();
        f.clock.advance(Duration::minutes(5));

        let updated = f
            .repository
            .update(car.id(), patch(json!({"year": 2, "createdAt": null, "active": false})))
            .await
            .unwrap();

        assert_eq!(updated.year, 2);
        assert_eq!(updated.model, "a");
        assert!(updated.is_active());
        assert_eq!(updated.created_at(), created_at);
        assert_eq!(updated.updated_at(), Some(f.clock.now()));
    }

    #[tokio::test]
    async fn test_update_rejects_invalid_merge() {
        let f = fixture();
        let car = f.repository.create(Car::new("a", 1)).await.unwrap();
        let writes = f.store.writes();

        let cleared = f
            .repository
            .update(car.id(), patch(json!({"model": null})))
            .await
            .unwrap_err();
        assert_eq!(cleared.field(), Some("model"));

        let mistyped = f
            .repository
            .update(car.id(), patch(json!({"year": "nineteen"})))
            .await
            .unwrap_err();
        assert_eq!(mistyped.kind(), ErrorKind::Validation);

        assert_eq!(f.store.writes(), writes);
    }

    #[tokio::test]
    async fn test_update_inactive_is_not_found() {
        let f = fixture();
        let car = f.repository.create(Car::new("a", 1)).await.unwrap();
        f.repository.delete(car.id()).await.unwrap();

        let error = f
            .repository
            .update(car.id(), patch(json!({"year": 3})))
            .await
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_save_writes_whole_entity() {
        let f = fixture();
        let mut car = f.repository.create(Car::new("a", 1)).await.unwrap();
        car.model = "b".to_string();

        let saved = f.repository.save(&car).await.unwrap();
        assert_eq!(saved.model, "b");
        assert_eq!(f.repository.find(car.id()).await.unwrap().model, "b");

        let unsaved = f.repository.save(&Car::new("x", 1)).await.unwrap_err();
        assert_eq!(unsaved.field(), Some("id"));
    }

    #[tokio::test]
    async fn test_malformed_filter_propagates_bad_request() {
        let f = fixture();
        let filter = Filter::all().condition(Condition::gte("year", json!([1, 2])));

        let error = f.repository.find_all(filter.clone()).await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::BadRequest);

        let error = f
            .repository
            .paginated_query(&filter, &PageRequest::default())
            .await
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::BadRequest);
    }

    #[tokio::test]
    async fn test_store_failure_is_upstream() {
        let f = fixture();
        f.store.set_should_fail(true);

        let error = f.repository.create(Car::new("a", 1)).await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Upstream);
    }
}
