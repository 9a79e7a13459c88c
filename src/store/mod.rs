//! Persistence port and its adapters.

mod memory;
mod postgres;
pub mod schema;

pub use memory::MemoryRepository;
pub use postgres::PgRepository;

use crate::list::QueryShape;
use crate::model::Entity;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("no matching row")]
    NotFound,
    #[error("database error: {0}")]
    Db(#[source] sqlx::Error),
    #[error("commit failed: {0}")]
    Commit(#[source] sqlx::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound)
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            e => StoreError::Db(e),
        }
    }
}

/// Storage for one entity type. Reads exclude soft-deleted rows unless stated otherwise.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Repository<E: Entity>: Send + Sync {
    /// Insert and return the row with its id and timestamps.
    async fn create(&self, entity: E) -> Result<E, StoreError>;

    /// Write every field of a live row and bump `updated_at`.
    async fn update(&self, entity: E) -> Result<E, StoreError>;

    async fn get_by_id(&self, id: i64) -> Result<E, StoreError>;

    /// Like [`Repository::get_by_id`] but also returns soft-deleted rows.
    async fn get_by_id_unscoped(&self, id: i64) -> Result<E, StoreError>;

    /// Soft delete, or remove the row for good when `unscoped`.
    async fn delete(&self, entity: &E, unscoped: bool) -> Result<(), StoreError>;

    /// One page of matching rows and the total to report for it.
    async fn get_list(&self, shape: &QueryShape) -> Result<(Vec<E>, i64), StoreError>;

    /// Live rows whose integer `column` is one of `ids`, ordered by id.
    async fn get_related(&self, column: &str, ids: Vec<i64>) -> Result<Vec<E>, StoreError>;
}
