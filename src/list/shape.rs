//! Query shape handed to store adapters, plus response pagination metadata.

use crate::sql::BindValue;
use serde::{Serialize, Serializer};

/// Page size. `Unbounded` is requested with `limit=-1` and disables the count query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Limit {
    Bounded(u32),
    Unbounded,
}

impl Limit {
    pub fn get(self) -> Option<u32> {
        match self {
            Limit::Bounded(n) => Some(n),
            Limit::Unbounded => None,
        }
    }

    /// Wire form: the page size, or -1 when unbounded.
    pub fn as_i64(self) -> i64 {
        match self {
            Limit::Bounded(n) => i64::from(n),
            Limit::Unbounded => -1,
        }
    }
}

impl Serialize for Limit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.as_i64())
    }
}

/// Ascending order on an allow-listed column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderClause {
    pub column: &'static str,
}

/// Exact-match condition on a known column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Condition {
    pub column: &'static str,
    pub value: BindValue,
}

/// Conjunction of exact-match conditions. Column names only ever come from
/// static allow-lists, never from the client.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    pub fn new() -> Self {
        Filter::default()
    }

    pub fn and(mut self, column: &'static str, value: impl Into<BindValue>) -> Self {
        self.push(column, value);
        self
    }

    pub fn push(&mut self, column: &'static str, value: impl Into<BindValue>) {
        self.conditions.push(Condition {
            column,
            value: value.into(),
        });
    }

    /// Append every condition of `other`.
    pub fn extend(&mut self, other: Filter) {
        self.conditions.extend(other.conditions);
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

/// Case-insensitive substring search on one column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Search {
    pub column: &'static str,
    pub term: String,
}

impl Search {
    /// `ILIKE` pattern with `%`, `_` and `\` escaped.
    pub fn like_pattern(&self) -> String {
        let mut out = String::with_capacity(self.term.len() + 2);
        out.push('%');
        for c in self.term.chars() {
            if matches!(c, '%' | '_' | '\\') {
                out.push('\\');
            }
            out.push(c);
        }
        out.push('%');
        out
    }

    pub fn matches(&self, value: &str) -> bool {
        value.to_lowercase().contains(&self.term.to_lowercase())
    }
}

/// Validated list query: what to select, in what order, and which window.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryShape {
    pub offset: u64,
    pub limit: Limit,
    pub order: Vec<OrderClause>,
    pub filter: Filter,
    pub search: Option<Search>,
    pub include_deleted: bool,
}

impl QueryShape {
    /// Bounded lists count matching rows first; unbounded lists report the
    /// number of rows returned instead.
    pub fn needs_count(&self) -> bool {
        matches!(self.limit, Limit::Bounded(_))
    }

    /// Total to report once `returned` rows came back and `counted` holds the
    /// count query result, if one was issued.
    pub fn total(&self, counted: Option<i64>, returned: usize) -> i64 {
        counted.unwrap_or_else(|| i64::try_from(returned).unwrap_or(i64::MAX))
    }
}

/// Page window as resolved from the request, kept for the response envelope.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: Limit,
}

impl PageRequest {
    pub fn meta(&self, total: i64) -> PageMeta {
        PageMeta {
            page: self.page,
            limit: self.limit,
            total,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub page: u32,
    pub limit: Limit,
    pub total: i64,
}
