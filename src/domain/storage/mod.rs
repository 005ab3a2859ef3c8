//! Storage domain - schemaless document store abstraction and its query language

mod filter;
mod query;
mod repository;

pub use filter::{Condition, Document, Filter, FilterOperator};
pub use query::{
    OrderBy, PageRequest, PaginatedResult, Query, SortDirection, DEFAULT_LIMIT, DEFAULT_PAGE,
};
pub use repository::DocumentStore;

#[cfg(test)]
pub use repository::mock;
