//! PostgreSQL document store with connection pooling

use std::fmt::Debug;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{Postgres, QueryBuilder, Row};
use uuid::Uuid;

use crate::domain::entity::{CREATED_AT_FIELD, ID_FIELD};
use crate::domain::storage::{
    Document, DocumentStore, Filter, FilterOperator, Query, SortDirection,
};
use crate::domain::DomainError;

static TABLE_NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]{0,62}$").unwrap());

/// PostgreSQL storage configuration
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of connections to maintain
    pub min_connections: u32,
    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,
    /// Idle timeout in seconds
    pub idle_timeout_secs: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/account_dao".to_string(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout_secs: 30,
            idle_timeout_secs: 600,
        }
    }
}

impl PostgresConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn with_min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }
}

/// Document store backed by a single JSONB table.
///
/// Rows are `(collection, id, data)`; filters compile to parameterised
/// `data -> $field` comparisons.
pub struct PostgresDocumentStore {
    pool: PgPool,
    table_name: String,
}

impl Debug for PostgresDocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresDocumentStore")
            .field("table_name", &self.table_name)
            .finish()
    }
}

impl PostgresDocumentStore {
    /// Creates a store over an existing pool
    pub fn new(pool: PgPool, table_name: impl Into<String>) -> Result<Self, DomainError> {
        let table_name = table_name.into();

        if !TABLE_NAME_PATTERN.is_match(&table_name) {
            return Err(DomainError::configuration(format!(
                "Invalid table name '{}'",
                table_name
            )));
        }

        Ok(Self { pool, table_name })
    }

    /// Creates a store with its own connection pool
    pub async fn connect(
        config: &PostgresConfig,
        table_name: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(std::time::Duration::from_secs(config.connect_timeout_secs))
            .idle_timeout(std::time::Duration::from_secs(config.idle_timeout_secs))
            .connect(&config.url)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to connect to PostgreSQL: {}", e)))?;

        Self::new(pool, table_name)
    }

    /// Returns a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Ensures the documents table exists
    pub async fn ensure_table(&self) -> Result<(), DomainError> {
        let query = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                collection VARCHAR(255) NOT NULL,
                id VARCHAR(255) NOT NULL,
                data JSONB NOT NULL,
                PRIMARY KEY (collection, id)
            )
            "#,
            self.table_name
        );

        sqlx::query(&query)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to create table: {}", e)))?;

        Ok(())
    }

    fn select<'a>(&self, columns: &str, collection: &str) -> QueryBuilder<'a, Postgres> {
        let mut builder = QueryBuilder::new(format!(
            "SELECT {} FROM {} WHERE collection = ",
            columns, self.table_name
        ));
        builder.push_bind(collection.to_string());
        builder
    }
}

/// Appends `AND <condition>` for every condition in the filter
fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &Filter) {
    for condition in filter.conditions() {
        builder.push(" AND ");

        match condition.operator {
            FilterOperator::Eq | FilterOperator::Ne => {
                builder.push("COALESCE(data -> ");
                builder.push_bind(condition.field.clone());
                builder.push(", 'null'::jsonb) ");
                builder.push(if condition.operator == FilterOperator::Eq {
                    "="
                } else {
                    "<>"
                });
                builder.push(" ");
                builder.push_bind(condition.value.clone());
            }
            FilterOperator::In => {
                builder.push_bind(condition.value.clone());
                builder.push(" @> jsonb_build_array(COALESCE(data -> ");
                builder.push_bind(condition.field.clone());
                builder.push(", 'null'::jsonb))");
            }
            op => {
                // jsonb orders across types; restrict to same-typed operands
                builder.push("(jsonb_typeof(data -> ");
                builder.push_bind(condition.field.clone());
                builder.push(") = jsonb_typeof(");
                builder.push_bind(condition.value.clone());
                builder.push(") AND (data -> ");
                builder.push_bind(condition.field.clone());
                builder.push(format!(") {} ", op));
                builder.push_bind(condition.value.clone());
                builder.push(")");
            }
        }
    }
}

/// Caller sort keys, then creation time and primary key so that windows
/// over equal keys never overlap
fn push_window(builder: &mut QueryBuilder<'_, Postgres>, query: &Query) {
    builder.push(" ORDER BY ");

    let mut keys = builder.separated(", ");
    for key in &query.order {
        keys.push("data -> ");
        keys.push_bind_unseparated(key.field.clone());
        keys.push_unseparated(match key.direction {
            SortDirection::Asc => " ASC NULLS FIRST",
            SortDirection::Desc => " DESC NULLS LAST",
        });
    }
    keys.push("data -> ");
    keys.push_bind_unseparated(CREATED_AT_FIELD.to_string());
    keys.push_unseparated(" ASC NULLS FIRST");
    keys.push("id ASC");

    if let Some(offset) = query.offset {
        builder.push(" OFFSET ");
        builder.push_bind(i64::try_from(offset).unwrap_or(i64::MAX));
    }

    if let Some(limit) = query.limit {
        builder.push(" LIMIT ");
        builder.push_bind(i64::try_from(limit).unwrap_or(i64::MAX));
    }
}

fn row_document(row: &PgRow) -> Result<Document, DomainError> {
    let data: Value = row
        .try_get("data")
        .map_err(|e| DomainError::storage(format!("Failed to read document: {}", e)))?;

    match data {
        Value::Object(document) => Ok(document),
        _ => Err(DomainError::storage("Stored document is not a JSON object")),
    }
}

#[async_trait]
impl DocumentStore for PostgresDocumentStore {
    async fn find(&self, collection: &str, id: &str) -> Result<Option<Document>, DomainError> {
        let mut builder = self.select("data", collection);
        builder.push(" AND id = ");
        builder.push_bind(id.to_string());

        let row = builder
            .build()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to find document: {}", e)))?;

        row.as_ref().map(row_document).transpose()
    }

    async fn find_all(&self, collection: &str, query: &Query) -> Result<Vec<Document>, DomainError> {
        query.filter.validate()?;

        let mut builder = self.select("data", collection);
        push_filter(&mut builder, &query.filter);
        push_window(&mut builder, query);

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to query documents: {}", e)))?;

        rows.iter().map(row_document).collect()
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<usize, DomainError> {
        filter.validate()?;

        let mut builder = self.select("COUNT(*) AS count", collection);
        push_filter(&mut builder, filter);

        let row = builder
            .build()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to count documents: {}", e)))?;

        let count: i64 = row
            .try_get("count")
            .map_err(|e| DomainError::storage(format!("Failed to read count: {}", e)))?;
        Ok(usize::try_from(count).unwrap_or(0))
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

        let query = format!(
            "INSERT INTO {} (collection, id, data) VALUES ($1, $2, $3)",
            self.table_name
        );

        sqlx::query(&query)
            .bind(collection)
            .bind(&id)
            .bind(Value::Object(document.clone()))
            .execute(&self.pool)
            .await
            .map_err(|e| {
                let unique_violation = e
                    .as_database_error()
                    .is_some_and(|db| db.is_unique_violation());
                if unique_violation {
                    DomainError::conflict(format!(
                        "Document '{}' already exists in '{}'",
                        id, collection
                    ))
                } else {
                    DomainError::storage(format!("Failed to create document: {}", e))
                }
            })?;

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

        let query = format!(
            r#"
            UPDATE {}
            SET data = data || $3
            WHERE collection = $1 AND id = $2
            RETURNING data
            "#,
            self.table_name
        );

        let row = sqlx::query(&query)
            .bind(collection)
            .bind(id)
            .bind(Value::Object(patch))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to update document: {}", e)))?;

        match row {
            Some(row) => row_document(&row),
            None => Err(DomainError::not_found(format!(
                "Document '{}' not found in '{}'",
                id, collection
            ))),
        }
    }
}
