//! Persisted records. Every entity has an `i64` identity, its scalar fields and
//! the shared [`Timestamps`]; a set `deleted_at` marks a soft-deleted row.

mod card;
mod user;

pub use card::Card;
pub use user::User;

use crate::sql::BindValue;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Timestamps {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Table metadata and field access shared by the store adapters.
pub trait Entity: Clone + Debug + Send + Sync + Unpin + 'static {
    const TABLE: &'static str;
    /// Singular name used in error messages.
    const RESOURCE: &'static str;
    /// Writable columns, in bind order. Excludes `id` and the timestamps.
    const FIELDS: &'static [&'static str];
    /// `(table, foreign key)` pairs whose rows are deleted together with this one.
    const CASCADE: &'static [(&'static str, &'static str)] = &[];

    fn id(&self) -> i64;
    fn set_id(&mut self, id: i64);
    fn stamps(&self) -> &Timestamps;
    fn stamps_mut(&mut self) -> &mut Timestamps;

    /// Value of `id` or of a column in [`Entity::FIELDS`].
    fn field(&self, column: &str) -> Option<BindValue>;

    fn is_deleted(&self) -> bool {
        self.stamps().deleted_at.is_some()
    }

    /// Values of [`Entity::FIELDS`], in order.
    fn values(&self) -> Vec<BindValue> {
        Self::FIELDS.iter().filter_map(|c| self.field(c)).collect()
    }
}
