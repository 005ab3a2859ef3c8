//! Predicate language for document queries

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::DomainError;

/// Untyped stored record
pub type Document = serde_json::Map<String, Value>;

/// Comparison operators for filter conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    /// Equal to
    Eq,
    /// Not equal to
    Ne,
    /// Greater than
    Gt,
    /// Greater than or equal to
    Gte,
    /// Less than
    Lt,
    /// Less than or equal to
    Lte,
    /// In list of values
    In,
}

impl FilterOperator {
    /// Parse the symbolic form used in JSON filters
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "==" | "===" | "eq" => Some(Self::Eq),
            "!=" | "!==" | "ne" => Some(Self::Ne),
            ">" | "gt" => Some(Self::Gt),
            ">=" | "gte" => Some(Self::Gte),
            "<" | "lt" => Some(Self::Lt),
            "<=" | "lte" => Some(Self::Lte),
            "in" => Some(Self::In),
            _ => None,
        }
    }

    pub fn is_ordering(&self) -> bool {
        matches!(self, Self::Gt | Self::Gte | Self::Lt | Self::Lte)
    }
}

impl std::fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Eq => write!(f, "="),
            Self::Ne => write!(f, "!="),
            Self::Gt => write!(f, ">"),
            Self::Gte => write!(f, ">="),
            Self::Lt => write!(f, "<"),
            Self::Lte => write!(f, "<="),
            Self::In => write!(f, "in"),
        }
    }
}

/// A single field comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub field: String,
    pub operator: FilterOperator,
    pub value: Value,
}

impl Condition {
    pub fn new(field: impl Into<String>, operator: FilterOperator, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, FilterOperator::Eq, value)
    }

    pub fn ne(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, FilterOperator::Ne, value)
    }

    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, FilterOperator::Gt, value)
    }

    pub fn gte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, FilterOperator::Gte, value)
    }

    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, FilterOperator::Lt, value)
    }

    pub fn lte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, FilterOperator::Lte, value)
    }

    pub fn in_list(field: impl Into<String>, values: Vec<Value>) -> Self {
        Self::new(field, FilterOperator::In, Value::Array(values))
    }

    /// Reject conditions no document could be evaluated against
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.field.is_empty() {
            return Err(DomainError::bad_request("Filter field name cannot be empty"));
        }

        match self.operator {
            FilterOperator::In if !self.value.is_array() => Err(DomainError::bad_request(
                format!("Operator 'in' on '{}' requires a list", self.field),
            )),
            op if op.is_ordering() && !(self.value.is_number() || self.value.is_string()) => {
                Err(DomainError::bad_request(format!(
                    "Operator '{}' on '{}' requires a number or string",
                    op, self.field
                )))
            }
            _ => Ok(()),
        }
    }

    /// Evaluate against a document; missing fields compare as null
    pub fn matches(&self, document: &Document) -> bool {
        let actual = document.get(&self.field).unwrap_or(&Value::Null);

        match self.operator {
            FilterOperator::Eq => actual == &self.value,
            FilterOperator::Ne => actual != &self.value,
            FilterOperator::In => self
                .value
                .as_array()
                .is_some_and(|values| values.iter().any(|v| v == actual)),
            FilterOperator::Gt => compare_scalar(actual, &self.value) == Some(Ordering::Greater),
            FilterOperator::Gte => matches!(
                compare_scalar(actual, &self.value),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            FilterOperator::Lt => compare_scalar(actual, &self.value) == Some(Ordering::Less),
            FilterOperator::Lte => matches!(
                compare_scalar(actual, &self.value),
                Some(Ordering::Less | Ordering::Equal)
            ),
        }
    }
}

/// Numbers compare numerically, strings lexicographically; anything else is
/// incomparable.
pub(crate) fn compare_scalar(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// Conjunction of conditions. The empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    /// Filter that matches every document
    pub fn all() -> Self {
        Self::default()
    }

    pub fn condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Add an equality condition
    pub fn eq(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.condition(Condition::eq(field, value))
    }

    /// Conjoin another filter onto this one
    pub fn and(mut self, other: Filter) -> Self {
        self.conditions.extend(other.conditions);
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        self.conditions.iter().try_for_each(Condition::validate)
    }

    pub fn matches(&self, document: &Document) -> bool {
        self.conditions.iter().all(|c| c.matches(document))
    }

    /// Parse the JSON filter syntax.
    ///
    /// Accepts `{ "field": value }` for equality or
    /// `{ "field": { ">=": value, ... } }` for operators, optionally wrapped
    /// in `{ "where": { ... } }`.
    pub fn from_json(value: &Value) -> Result<Self, DomainError> {
        let object = value
            .as_object()
            .ok_or_else(|| DomainError::bad_request("Filter must be a JSON object"))?;

        let clauses = match object.get("where") {
            Some(Value::Object(inner)) if object.len() == 1 => inner,
            Some(_) if object.len() == 1 => {
                return Err(DomainError::bad_request("'where' must be a JSON object"));
            }
            _ => object,
        };

        let mut filter = Self::all();

        for (field, clause) in clauses {
            match clause {
                Value::Object(ops) => {
                    if ops.is_empty() {
                        return Err(DomainError::bad_request(format!(
                            "Empty operator set for field '{}'",
                            field
                        )));
                    }

                    for (symbol, operand) in ops {
                        let operator = FilterOperator::from_symbol(symbol).ok_or_else(|| {
                            DomainError::bad_request(format!(
                                "Unknown operator '{}' for field '{}'",
                                symbol, field
                            ))
                        })?;
                        filter = filter.condition(Condition::new(
                            field.as_str(),
                            operator,
                            operand.clone(),
                        ));
                    }
                }
                other => filter = filter.eq(field.as_str(), other.clone()),
            }
        }

        filter.validate()?;
        Ok(filter)
    }
}
