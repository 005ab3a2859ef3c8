//! Query window, ordering and pagination types

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::filter::{compare_scalar, Document, Filter};

pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_LIMIT: usize = 10;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Sort key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    pub field: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl OrderBy {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }

    /// Parse `"field"` (ascending) or `"-field"` (descending)
    pub fn parse(key: &str) -> Self {
        match key.strip_prefix('-') {
            Some(field) => Self::desc(field),
            None => Self::asc(key),
        }
    }

    pub fn compare(&self, a: &Document, b: &Document) -> Ordering {
        let ordering = compare_values(a.get(&self.field), b.get(&self.field));
        match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// Total order over JSON values for sorting: missing/null, booleans,
/// numbers, strings, then everything else.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(value: Option<&Value>) -> u8 {
        match value {
            None | Some(Value::Null) => 0,
            Some(Value::Bool(_)) => 1,
            Some(Value::Number(_)) => 2,
            Some(Value::String(_)) => 3,
            Some(_) => 4,
        }
    }

    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(x), Some(y)) => compare_scalar(x, y).unwrap_or_else(|| rank(a).cmp(&rank(b))),
        _ => rank(a).cmp(&rank(b)),
    }
}

/// A filtered, ordered window over a collection
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filter: Filter,
    pub order: Vec<OrderBy>,
    pub offset: Option<usize>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new(filter: Filter) -> Self {
        Self {
            filter,
            ..Default::default()
        }
    }

    pub fn with_order(mut self, order: Vec<OrderBy>) -> Self {
        self.order = order;
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Compare two documents by every sort key in turn
    pub fn compare(&self, a: &Document, b: &Document) -> Ordering {
        self.order
            .iter()
            .map(|key| key.compare(a, b))
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

/// Page selection for paginated queries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    page: usize,
    limit: usize,
    order: Vec<OrderBy>,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            order: Vec::new(),
        }
    }
}

impl PageRequest {
    /// Zero page or limit fall back to the defaults
    pub fn new(page: usize, limit: usize) -> Self {
        Self {
            page: if page == 0 { DEFAULT_PAGE } else { page },
            limit: if limit == 0 { DEFAULT_LIMIT } else { limit },
            order: Vec::new(),
        }
    }

    pub fn with_order(mut self, order: Vec<OrderBy>) -> Self {
        self.order = order;
        self
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn order(&self) -> &[OrderBy] {
        &self.order
    }

    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.limit)
    }
}

/// One page of results plus the size of the whole matching set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginatedResult<T> {
    /// 1-based page number
    pub page: usize,
    /// Records matching the filter, ignoring the window
    pub total: usize,
    pub result: Vec<T>,
}

impl<T> PaginatedResult<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PaginatedResult<U> {
        PaginatedResult {
            page: self.page,
            total: self.total,
            result: self.result.into_iter().map(f).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_order_by_parse() {
        assert_eq!(OrderBy::parse("email"), OrderBy::asc("email"));
        assert_eq!(OrderBy::parse("-createdAt"), OrderBy::desc("createdAt"));
    }

    #[test]
    fn test_compare_multiple_keys() {
        let query = Query::default().with_order(vec![OrderBy::asc("team"), OrderBy::desc("age")]);
        let a = doc(json!({"team": "a", "age": 30}));
        let b = doc(json!({"team": "a", "age": 40}));
        let c = doc(json!({"team": "b", "age": 10}));

        assert_eq!(query.compare(&b, &a), Ordering::Less);
        assert_eq!(query.compare(&a, &c), Ordering::Less);
    }

    #[test]
    fn test_missing_sorts_first() {
        let key = OrderBy::asc("name");
        let named = doc(json!({"name": "x"}));
        let unnamed = doc(json!({}));
        assert_eq!(key.compare(&unnamed, &named), Ordering::Less);
    }

    #[test]
    fn test_page_request_defaults_and_offset() {
        let page = PageRequest::default();
        assert_eq!((page.page(), page.limit(), page.offset()), (1, 10, 0));

        let page = PageRequest::new(3, 20);
        assert_eq!(page.offset(), 40);

        let page = PageRequest::new(0, 0);
        assert_eq!((page.page(), page.limit()), (1, 10));
    }

    #[test]
    fn test_paginated_result_map() {
        let page = PaginatedResult {
            page: 2,
            total: 5,
            result: vec![1, 2],
        };
        let mapped = page.map(|n| n * 10);
        assert_eq!(mapped.result, vec![10, 20]);
        assert_eq!(mapped.total, 5);
    }
}
