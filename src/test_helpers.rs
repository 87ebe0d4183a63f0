//! Scripted executor for exercising catalog mappings without a server
//!
//! [`MockExecutor`] answers each query with the first scripted response whose
//! pattern is a substring of the SQL, and records every statement it receives.

use crate::connection::ConnectionError;
use crate::error::CatalogError;
use crate::executor::CatalogExecutor;
use crate::row::{CatalogRow, Oid};
use std::cell::RefCell;

/// A single typed column value held by a [`MockRow`]
#[derive(Debug, Clone, PartialEq)]
pub enum MockValue {
    Oid(Oid),
    Text(String),
    Bool(bool),
    Int(i64),
    Null,
}

/// A result row built column by column
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MockRow {
    columns: Vec<(String, MockValue)>,
}

impl MockRow {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, column: &str, value: MockValue) -> Self {
        self.columns.push((column.to_string(), value));
        self
    }

    #[must_use]
    pub fn oid(self, column: &str, value: Oid) -> Self {
        self.with(column, MockValue::Oid(value))
    }

    #[must_use]
    pub fn text(self, column: &str, value: &str) -> Self {
        self.with(column, MockValue::Text(value.to_string()))
    }

    #[must_use]
    pub fn bool(self, column: &str, value: bool) -> Self {
        self.with(column, MockValue::Bool(value))
    }

    #[must_use]
    pub fn int(self, column: &str, value: i64) -> Self {
        self.with(column, MockValue::Int(value))
    }

    #[must_use]
    pub fn null(self, column: &str) -> Self {
        self.with(column, MockValue::Null)
    }

    fn value(&self, column: &str) -> Result<&MockValue, CatalogError> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
            .ok_or_else(|| CatalogError::decode(column, "column not found"))
    }

    fn mismatch(column: &str, expected: &str, actual: &MockValue) -> CatalogError {
        match actual {
            MockValue::Null => CatalogError::decode(column, "unexpected NULL"),
            other => CatalogError::decode(column, format!("expected {expected}, got {other:?}")),
        }
    }
}

impl CatalogRow for MockRow {
    fn get_oid(&self, column: &str) -> Result<Oid, CatalogError> {
        match self.value(column)? {
            MockValue::Oid(v) => Ok(*v),
            other => Err(Self::mismatch(column, "oid", other)),
        }
    }

    fn get_string(&self, column: &str) -> Result<String, CatalogError> {
        match self.value(column)? {
            MockValue::Text(v) => Ok(v.clone()),
            other => Err(Self::mismatch(column, "text", other)),
        }
    }

    fn get_bool(&self, column: &str) -> Result<bool, CatalogError> {
        match self.value(column)? {
            MockValue::Bool(v) => Ok(*v),
            other => Err(Self::mismatch(column, "bool", other)),
        }
    }

    fn get_i16(&self, column: &str) -> Result<i16, CatalogError> {
        match self.value(column)? {
            MockValue::Int(v) => i16::try_from(*v)
                .map_err(|_| CatalogError::decode(column, format!("{v} out of range for int2"))),
            other => Err(Self::mismatch(column, "int2", other)),
        }
    }

    fn get_i64(&self, column: &str) -> Result<i64, CatalogError> {
        match self.value(column)? {
            MockValue::Int(v) => Ok(*v),
            other => Err(Self::mismatch(column, "int8", other)),
        }
    }
}

enum Response {
    Rows(Vec<MockRow>),
    Error(String),
    Disconnect,
}

/// Executor that replays scripted responses
#[derive(Default)]
pub struct MockExecutor {
    responses: Vec<(String, Response)>,
    executed: RefCell<Vec<String>>,
}

impl MockExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer queries containing `pattern` with `rows`
    #[must_use]
    pub fn respond(mut self, pattern: &str, rows: Vec<MockRow>) -> Self {
        self.responses.push((pattern.to_string(), Response::Rows(rows)));
        self
    }

    /// Fail queries containing `pattern` with a query error
    #[must_use]
    pub fn fail(mut self, pattern: &str, message: &str) -> Self {
        self.responses
            .push((pattern.to_string(), Response::Error(message.to_string())));
        self
    }

    /// Drop the connection when a query contains `pattern`
    #[must_use]
    pub fn disconnect(mut self, pattern: &str) -> Self {
        self.responses.push((pattern.to_string(), Response::Disconnect));
        self
    }

    /// Append `other`'s scripted responses after this executor's own
    #[must_use]
    pub fn merge(mut self, other: MockExecutor) -> Self {
        self.responses.extend(other.responses);
        self
    }

    /// Every statement executed so far, in order
    pub fn executed(&self) -> Vec<String> {
        self.executed.borrow().clone()
    }

    fn lookup(&self, query: &str) -> Result<Vec<MockRow>, CatalogError> {
        self.executed.borrow_mut().push(query.to_string());
        match self.responses.iter().find(|(pattern, _)| query.contains(pattern.as_str())) {
            Some((_, Response::Rows(rows))) => Ok(rows.clone()),
            Some((_, Response::Error(message))) => Err(CatalogError::Query(message.clone())),
            Some((_, Response::Disconnect)) => Err(ConnectionError::Closed.into()),
            None => Err(CatalogError::Query(format!("no scripted response for query: {query}"))),
        }
    }
}

impl CatalogExecutor for MockExecutor {
    type Row = MockRow;

    fn query_all(&self, query: &str) -> Result<Vec<MockRow>, CatalogError> {
        self.lookup(query)
    }

    fn query_one(&self, query: &str) -> Result<MockRow, CatalogError> {
        let mut rows = self.lookup(query)?;
        if rows.len() != 1 {
            return Err(CatalogError::Query(format!(
                "query returned {} rows, expected exactly one",
                rows.len()
            )));
        }
        Ok(rows.remove(0))
    }
}
