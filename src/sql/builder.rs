//! Builds parameterized SELECT, INSERT, UPDATE and DELETE statements for an [`Entity`].
//! Identifiers come from entity metadata and validated config; values are always parameters.

use crate::list::QueryShape;
use crate::model::Entity;
use crate::sql::BindValue;

const STAMP_COLUMNS: [&str; 3] = ["created_at", "updated_at", "deleted_at"];

/// Quote identifier for PostgreSQL.
pub(crate) fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Full qualified table name.
pub fn qualified_table(schema: &str, table: &str) -> String {
    format!("{}.{}", quoted(schema), quoted(table))
}

#[derive(Debug, Default)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<BindValue>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf::default()
    }

    /// Bind `v` and return its placeholder.
    fn push_param(&mut self, v: BindValue) -> String {
        self.params.push(v);
        format!("${}", self.params.len())
    }
}

/// `id`, the writable fields, then the timestamps.
fn column_list<E: Entity>() -> String {
    std::iter::once("id")
        .chain(E::FIELDS.iter().copied())
        .chain(STAMP_COLUMNS)
        .map(quoted)
        .collect::<Vec<_>>()
        .join(", ")
}

fn where_clause(q: &mut QueryBuf, shape: &QueryShape) -> String {
    let mut parts = Vec::new();
    if !shape.include_deleted {
        parts.push(format!("{} IS NULL", quoted("deleted_at")));
    }
    for cond in shape.filter.conditions() {
        let ph = q.push_param(cond.value.clone());
        parts.push(format!("{} = {}", quoted(cond.column), ph));
    }
    if let Some(search) = &shape.search {
        let ph = q.push_param(BindValue::Text(search.like_pattern()));
        parts.push(format!("{} ILIKE {}", quoted(search.column), ph));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", parts.join(" AND "))
    }
}

/// SELECT by id. Caller binds the id as `$1`. Soft-deleted rows match only when `unscoped`.
pub fn select_by_id<E: Entity>(schema: &str, unscoped: bool) -> QueryBuf {
    let mut q = QueryBuf::new();
    let scope = if unscoped {
        String::new()
    } else {
        format!(" AND {} IS NULL", quoted("deleted_at"))
    };
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = $1{}",
        column_list::<E>(),
        qualified_table(schema, E::TABLE),
        quoted("id"),
        scope
    );
    q
}

/// SELECT one page. Rows are ordered by the requested column, then by id so pages are stable.
/// LIMIT is omitted when unbounded and OFFSET when zero.
pub fn select_list<E: Entity>(schema: &str, shape: &QueryShape) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_sql = where_clause(&mut q, shape);
    let order: Vec<String> = shape
        .order
        .iter()
        .map(|o| o.column)
        .chain(std::iter::once("id"))
        .map(quoted)
        .collect();
    let limit_clause = shape.limit.get().map(|n| format!(" LIMIT {}", n)).unwrap_or_default();
    let offset_clause = if shape.offset > 0 {
        format!(" OFFSET {}", shape.offset)
    } else {
        String::new()
    };
    q.sql = format!(
        "SELECT {} FROM {}{} ORDER BY {}{}{}",
        column_list::<E>(),
        qualified_table(schema, E::TABLE),
        where_sql,
        order.join(", "),
        limit_clause,
        offset_clause
    );
    q
}

/// SELECT live rows whose integer `column` is any of the ids bound as `$1` (a `BIGINT[]`), by id.
pub fn select_related<E: Entity>(schema: &str, column: &str) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = ANY($1) AND {} IS NULL ORDER BY {}",
        column_list::<E>(),
        qualified_table(schema, E::TABLE),
        quoted(column),
        quoted("deleted_at"),
        quoted("id")
    );
    q
}

/// COUNT of every row matching the shape's filter, ignoring the page window.
pub fn count<E: Entity>(schema: &str, shape: &QueryShape) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_sql = where_clause(&mut q, shape);
    q.sql = format!(
        "SELECT COUNT(*) FROM {}{}",
        qualified_table(schema, E::TABLE),
        where_sql
    );
    q
}

/// INSERT the writable fields; id and timestamps come from column defaults.
pub fn insert<E: Entity>(schema: &str, entity: &E) -> QueryBuf {
    let mut q = QueryBuf::new();
    let cols: Vec<String> = E::FIELDS.iter().map(|c| quoted(c)).collect();
    let placeholders: Vec<String> = entity.values().into_iter().map(|v| q.push_param(v)).collect();
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        qualified_table(schema, E::TABLE),
        cols.join(", "),
        placeholders.join(", "),
        column_list::<E>()
    );
    q
}

/// UPDATE every writable field of a live row and bump `updated_at`.
/// Returns no row when the id is missing or soft-deleted.
pub fn update<E: Entity>(schema: &str, entity: &E) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut sets = Vec::new();
    for (col, v) in E::FIELDS.iter().zip(entity.values()) {
        let ph = q.push_param(v);
        sets.push(format!("{} = {}", quoted(col), ph));
    }
    sets.push(format!("{} = NOW()", quoted("updated_at")));
    let id = q.push_param(BindValue::Int(entity.id()));
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = {} AND {} IS NULL RETURNING {}",
        qualified_table(schema, E::TABLE),
        sets.join(", "),
        quoted("id"),
        id,
        quoted("deleted_at"),
        column_list::<E>()
    );
    q
}

/// Mark live rows where `column = $1` as deleted.
pub fn soft_delete(schema: &str, table: &str, column: &str) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!(
        "UPDATE {} SET {} = NOW() WHERE {} = $1 AND {} IS NULL",
        qualified_table(schema, table),
        quoted("deleted_at"),
        quoted(column),
        quoted("deleted_at")
    );
    q
}

/// Permanently remove rows where `column = $1`, deleted or not.
pub fn hard_delete(schema: &str, table: &str, column: &str) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!(
        "DELETE FROM {} WHERE {} = $1",
        qualified_table(schema, table),
        quoted(column)
    );
    q
}
