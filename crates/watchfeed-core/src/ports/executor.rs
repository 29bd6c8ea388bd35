use crate::{error::ExecutorError, query::SelectQuery, value::Value};
use derive_more::Display;
use std::{collections::BTreeMap, sync::Arc};

///
/// BackendKind
///
/// Storage backend family; consulted only for backend-specific hints.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum BackendKind {
    #[display("mysql")]
    MySql,

    #[display("postgres")]
    Postgres,

    #[display("sqlite")]
    Sqlite,

    #[display("other")]
    Other,
}

///
/// ListJoin
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum ListJoin {
    #[display("AND")]
    And,

    #[display("OR")]
    Or,
}

///
/// QueryExecutor
///
/// Read-side database handle. Renders condition fragments in the backend's
/// dialect and runs compiled selects.
///

pub trait QueryExecutor: Send + Sync {
    fn select(&self, query: &SelectQuery) -> Result<Vec<Row>, ExecutorError>;

    /// Combine condition fragments into one parenthesized expression.
    fn make_list(&self, parts: &[String], join: ListJoin) -> String;

    /// Render a string literal.
    fn quote(&self, value: &str) -> String;

    /// Convert a caller timestamp into the backend's storage format.
    fn timestamp(&self, value: &str) -> String;

    fn bit_and(&self, column: &str, mask: u32) -> String;

    fn backend_kind(&self) -> BackendKind;
}

///
/// ConnectionProvider
///

pub trait ConnectionProvider: Send + Sync {
    /// Handle to a read replica, held for the duration of one call.
    fn replica(&self) -> Result<Arc<dyn QueryExecutor>, ExecutorError>;
}

///
/// Row
///
/// One result row with named column access.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Row {
    columns: BTreeMap<String, Value>,
}

impl Row {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            columns: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.columns.insert(column.into(), value.into());
        self
    }

    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns.get(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            columns: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        }
    }
}
