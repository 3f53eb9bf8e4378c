//! Compiles a structured column filter into a parameterized predicate.
//!
//! Column names are written into the SQL text as given. Only build filters
//! from column names of the scanned schema, never from client input.

use crate::sql::Value;
use indexmap::IndexMap;
use serde::de::{Deserializer, IgnoredAny, MapAccess, Visitor};
use serde_derive::Deserialize;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Gt,
    Lt,
    Gte,
    Lte,
}

impl FilterOp {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "eq" => Some(FilterOp::Eq),
            "gt" => Some(FilterOp::Gt),
            "lt" => Some(FilterOp::Lt),
            "gte" => Some(FilterOp::Gte),
            "lte" => Some(FilterOp::Lte),
            _ => None,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            FilterOp::Eq => "=",
            FilterOp::Gt => ">",
            FilterOp::Lt => "<",
            FilterOp::Gte => ">=",
            FilterOp::Lte => "<=",
        }
    }
}

/// The constraint on one column. It holds a single operator: setting a
/// second one replaces the first (last writer wins).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ColumnFilter {
    constraint: Option<(FilterOp, Value)>,
}

impl ColumnFilter {
    pub fn new(op: FilterOp, value: impl Into<Value>) -> Self {
        Self {
            constraint: Some((op, value.into())),
        }
    }

    /// A null value leaves the current constraint in place.
    pub fn set(&mut self, op: FilterOp, value: impl Into<Value>) {
        let value = value.into();
        if !value.is_null() {
            self.constraint = Some((op, value));
        }
    }

    pub fn with(mut self, op: FilterOp, value: impl Into<Value>) -> Self {
        self.set(op, value);
        self
    }

    pub fn constraint(&self) -> Option<(FilterOp, &Value)> {
        self.constraint.as_ref().map(|(op, value)| (*op, value))
    }
}

impl<'de> serde::Deserialize<'de> for ColumnFilter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ColumnFilterVisitor;

        impl<'de> Visitor<'de> for ColumnFilterVisitor {
            type Value = ColumnFilter;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of filter operators to values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<ColumnFilter, A::Error> {
                let mut filter = ColumnFilter::default();
                while let Some(key) = map.next_key::<String>()? {
                    match FilterOp::from_key(&key) {
                        Some(op) => filter.set(op, map.next_value::<Value>()?),
                        None => {
                            map.next_value::<IgnoredAny>()?;
                        }
                    }
                }
                Ok(filter)
            }
        }

        deserializer.deserialize_map(ColumnFilterVisitor)
    }
}

/// Column name to constraint, applied in insertion order.
pub type Filter = IndexMap<String, ColumnFilter>;

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct QueryArgs {
    #[serde(default)]
    pub filter: Option<Filter>,
    #[serde(default)]
    pub limit: Option<u64>,
}

impl QueryArgs {
    pub fn new(filter: Option<Filter>, limit: Option<u64>) -> Self {
        Self { filter, limit }
    }
}

/// Appends ` and <column><op>$<n>` for every constrained column and
/// ` limit <n>` if set. Placeholders continue after the `args` already bound
/// to `base`. Never fails; an empty query leaves `base` untouched.
pub fn sql(base: &str, mut args: Vec<Value>, query: &QueryArgs) -> (String, Vec<Value>) {
    let mut sql = String::from(base);

    if let Some(filter) = &query.filter {
        for (column, column_filter) in filter.iter() {
            if let Some((op, value)) = column_filter.constraint() {
                args.push(value.clone());

                sql.push_str(" and ");
                sql.push_str(column);
                sql.push_str(op.as_sql());
                sql.push('$');
                sql.push_str(&args.len().to_string());
            }
        }
    }

    if let Some(limit) = query.limit {
        sql.push_str(" limit ");
        sql.push_str(&limit.to_string());
    }

    (sql, args)
}
