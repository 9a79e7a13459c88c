//! List planning: turns a raw [`ListRequest`] into a validated [`QueryShape`]
//! (offset, limit, allow-listed order, typed filter) for the store adapters.
//!
//! Policies:
//! - page < 1 is clamped to 1;
//! - limit absent or 0 uses the configured default, -1 is unbounded, any other
//!   value below 1 is rejected, values above the configured maximum are clamped;
//! - an order key outside the entity's allow-list is dropped silently;
//! - a filter value that does not parse as its field's kind is rejected.

mod request;
mod shape;

pub use request::*;
pub use shape::*;

use crate::config::ListConfig;
use crate::error::AppError;
use crate::sql::BindValue;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Int,
    Text,
}

/// A column clients may filter on by exact match.
#[derive(Clone, Copy, Debug)]
pub struct FilterField {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FilterField {
    pub const fn int(name: &'static str) -> Self {
        FilterField { name, kind: FieldKind::Int }
    }

    pub const fn text(name: &'static str) -> Self {
        FilterField { name, kind: FieldKind::Text }
    }

    fn parse(&self, raw: &str) -> Result<BindValue, AppError> {
        match self.kind {
            FieldKind::Int => raw
                .trim()
                .parse::<i64>()
                .map(BindValue::Int)
                .map_err(|_| AppError::invalid_parameter(self.name)),
            FieldKind::Text => Ok(BindValue::Text(raw.trim().to_string())),
        }
    }
}

/// Per-entity listing rules.
#[derive(Clone, Copy, Debug)]
pub struct ListSpec {
    pub orderable: &'static [&'static str],
    pub filterable: &'static [FilterField],
    pub search_column: Option<&'static str>,
}

/// Plan one list query. Pure; execution belongs to the store adapter.
pub fn plan(
    request: ListRequest,
    rules: &ListSpec,
    config: &ListConfig,
) -> Result<(QueryShape, PageRequest), AppError> {
    let req = request.normalized(rules.orderable);
    let page = page_number(req.page)?;
    let limit = resolve_limit(req.limit, config)?;

    let order = rules
        .orderable
        .iter()
        .find(|c| **c == req.order_by)
        .map(|c| OrderClause { column: *c })
        .into_iter()
        .collect();

    let mut filter = Filter::new();
    for (key, raw) in &req.filters {
        if let Some(field) = rules.filterable.iter().find(|f| f.name == key.as_str()) {
            filter.push(field.name, field.parse(raw)?);
        }
    }

    let search = match rules.search_column {
        Some(column) if !req.search.is_empty() => Some(Search {
            column,
            term: req.search,
        }),
        _ => None,
    };

    let shape = QueryShape {
        offset: offset(page, limit),
        limit,
        order,
        filter,
        search,
        include_deleted: req.include_deleted,
    };
    Ok((shape, PageRequest { page, limit }))
}

fn page_number(page: i64) -> Result<u32, AppError> {
    u32::try_from(page.max(1)).map_err(|_| AppError::invalid_parameter("page"))
}

fn resolve_limit(limit: i64, config: &ListConfig) -> Result<Limit, AppError> {
    match limit {
        -1 => Ok(Limit::Unbounded),
        0 => Ok(Limit::Bounded(config.default_limit)),
        n if n < 0 => Err(AppError::invalid_parameter("limit")),
        n => Ok(Limit::Bounded(
            u32::try_from(n).unwrap_or(u32::MAX).min(config.max_limit),
        )),
    }
}

/// `limit * (page - 1)`, or 0 on the first page and for unbounded lists.
pub fn offset(page: u32, limit: Limit) -> u64 {
    match limit {
        Limit::Bounded(n) if page != 1 => u64::from(n) * u64::from(page.saturating_sub(1)),
        _ => 0,
    }
}
