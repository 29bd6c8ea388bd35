use crate::{
    ports::{JoinContribution, WhereContribution},
    query::Direction,
    value::Value,
};
use derive_more::Display;

///
/// TableRef
///
/// Table reference with the alias it is addressed by in the select.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TableRef {
    pub alias: String,
    pub name: String,
}

impl TableRef {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();

        Self {
            alias: name.clone(),
            name,
        }
    }

    #[must_use]
    pub fn aliased(alias: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            name: name.into(),
        }
    }
}

///
/// SelectField
///
/// Output column. `expr` is set when the column is computed or read through
/// a different source expression than its output name.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SelectField {
    pub name: String,
    pub expr: Option<String>,
}

impl SelectField {
    #[must_use]
    pub fn column(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expr: None,
        }
    }

    #[must_use]
    pub fn aliased(name: impl Into<String>, expr: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expr: Some(expr.into()),
        }
    }
}

///
/// JoinKind
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum JoinKind {
    #[display("JOIN")]
    Inner,

    #[display("LEFT JOIN")]
    Left,
}

///
/// JoinClause
///
/// Join of one aliased table; `on` fragments are ANDed by the executor.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct JoinClause {
    pub table: String,
    pub kind: JoinKind,
    pub on: Vec<String>,
}

impl JoinClause {
    #[must_use]
    pub fn inner<I, S>(table: impl Into<String>, on: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            table: table.into(),
            kind: JoinKind::Inner,
            on: on.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn left<I, S>(table: impl Into<String>, on: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            table: table.into(),
            kind: JoinKind::Left,
            on: on.into_iter().map(Into::into).collect(),
        }
    }
}

///
/// Condition
///
/// One WHERE term; the executor ANDs all terms together. Structured terms
/// leave literal rendering to the executor.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Condition {
    Equals { column: String, value: Value },
    In { column: String, values: Vec<Value> },
    Expr(String),
}

impl Condition {
    #[must_use]
    pub fn equals(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Equals {
            column: column.into(),
            value: value.into(),
        }
    }

    #[must_use]
    pub fn any_of<I, V>(column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::In {
            column: column.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn expr(fragment: impl Into<String>) -> Self {
        Self::Expr(fragment.into())
    }
}

///
/// OrderTerm
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OrderTerm {
    pub column: String,
    pub direction: Direction,
}

impl OrderTerm {
    #[must_use]
    pub fn new(column: impl Into<String>, direction: Direction) -> Self {
        Self {
            column: column.into(),
            direction,
        }
    }
}

///
/// SelectOptions
///
/// Backend options. `extra` carries opaque option flags added by extensions.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SelectOptions {
    pub order_by: Vec<OrderTerm>,
    pub limit: Option<u32>,
    pub extra: Vec<String>,
}

///
/// SelectQuery
///
/// Fully compiled read: the single value handed to the executor and to
/// pre-query extensions.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SelectQuery {
    pub caller: String,
    pub tables: Vec<TableRef>,
    pub fields: Vec<SelectField>,
    pub conditions: Vec<Condition>,
    pub options: SelectOptions,
    pub joins: Vec<JoinClause>,
}

impl SelectQuery {
    #[must_use]
    pub fn new(caller: impl Into<String>) -> Self {
        Self {
            caller: caller.into(),
            ..Self::default()
        }
    }

    /// Add a table unless its alias is already present.
    pub fn push_table(&mut self, table: TableRef) {
        if !self.has_table(&table.alias) {
            self.tables.push(table);
        }
    }

    /// Add a field unless its output name is already selected.
    pub fn push_field(&mut self, field: SelectField) {
        if !self.has_field(&field.name) {
            self.fields.push(field);
        }
    }

    /// Add a join unless the table is already joined.
    pub fn push_join(&mut self, join: JoinClause) {
        if !self.joins.iter().any(|existing| existing.table == join.table) {
            self.joins.push(join);
        }
    }

    pub fn push_condition(&mut self, condition: Condition) {
        self.conditions.push(condition);
    }

    /// Merge a collaborator's tables and joins; fields are left to the caller.
    pub fn merge_join(&mut self, contribution: &JoinContribution) {
        for table in &contribution.tables {
            self.push_table(table.clone());
        }
        for join in &contribution.joins {
            self.push_join(join.clone());
        }
    }

    /// Merge a collaborator's condition together with what it depends on.
    pub fn merge_where(&mut self, contribution: WhereContribution, negate: bool) {
        for table in contribution.tables {
            self.push_table(table);
        }
        for join in contribution.joins {
            self.push_join(join);
        }

        let condition = if negate {
            format!("NOT({})", contribution.condition)
        } else {
            contribution.condition
        };
        self.push_condition(Condition::Expr(condition));
    }

    #[must_use]
    pub fn has_table(&self, alias: &str) -> bool {
        self.tables.iter().any(|table| table.alias == alias)
    }

    #[must_use]
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|field| field.name == name)
    }

    /// Output names of the selected fields, in select order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|field| field.name.as_str())
    }
}
