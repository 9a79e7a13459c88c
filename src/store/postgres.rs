//! PostgreSQL adapter. Statements come from [`crate::sql`]; rows decode through `FromRow`.

use crate::list::QueryShape;
use crate::model::Entity;
use crate::sql::{
    count, hard_delete, insert, select_by_id, select_list, select_related, soft_delete, update, QueryBuf,
};
use crate::store::{Repository, StoreError};
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool};
use std::marker::PhantomData;

pub struct PgRepository<E> {
    pool: PgPool,
    schema: String,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for PgRepository<E> {
    fn clone(&self) -> Self {
        PgRepository {
            pool: self.pool.clone(),
            schema: self.schema.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E> PgRepository<E>
where
    E: Entity + for<'r> FromRow<'r, PgRow>,
{
    pub fn new(pool: PgPool, schema: impl Into<String>) -> Self {
        PgRepository {
            pool,
            schema: schema.into(),
            _entity: PhantomData,
        }
    }

    async fn fetch_optional(&self, q: QueryBuf) -> Result<Option<E>, StoreError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query_as::<_, E>(&q.sql);
        for p in q.params {
            query = query.bind(p);
        }
        Ok(query.fetch_optional(&self.pool).await?)
    }

    async fn fetch_one(&self, q: QueryBuf) -> Result<E, StoreError> {
        self.fetch_optional(q).await?.ok_or(StoreError::NotFound)
    }

    async fn fetch_by_id(&self, id: i64, unscoped: bool) -> Result<E, StoreError> {
        let mut q = select_by_id::<E>(&self.schema, unscoped);
        q.params.push(id.into());
        self.fetch_one(q).await
    }
}

#[async_trait]
impl<E> Repository<E> for PgRepository<E>
where
    E: Entity + for<'r> FromRow<'r, PgRow>,
{
    async fn create(&self, entity: E) -> Result<E, StoreError> {
        self.fetch_one(insert(&self.schema, &entity)).await
    }

    async fn update(&self, entity: E) -> Result<E, StoreError> {
        self.fetch_one(update(&self.schema, &entity)).await
    }

    async fn get_by_id(&self, id: i64) -> Result<E, StoreError> {
        self.fetch_by_id(id, false).await
    }

    async fn get_by_id_unscoped(&self, id: i64) -> Result<E, StoreError> {
        self.fetch_by_id(id, true).await
    }

    /// Children listed in [`Entity::CASCADE`] go first, all in one transaction.
    async fn delete(&self, entity: &E, unscoped: bool) -> Result<(), StoreError> {
        let statement: fn(&str, &str, &str) -> QueryBuf =
            if unscoped { hard_delete } else { soft_delete };
        let mut targets: Vec<(&str, &str)> = E::CASCADE.to_vec();
        targets.push((E::TABLE, "id"));

        let mut tx = self.pool.begin().await?;
        for (table, column) in targets {
            let q = statement(&self.schema, table, column);
            tracing::debug!(sql = %q.sql, id = entity.id(), "query (tx)");
            sqlx::query(&q.sql).bind(entity.id()).execute(&mut *tx).await?;
        }
        tx.commit().await.map_err(StoreError::Commit)
    }

    async fn get_list(&self, shape: &QueryShape) -> Result<(Vec<E>, i64), StoreError> {
        let counted = if shape.needs_count() {
            let q = count::<E>(&self.schema, shape);
            tracing::debug!(sql = %q.sql, params = ?q.params, "query");
            let mut query = sqlx::query_as::<_, (i64,)>(&q.sql);
            for p in q.params {
                query = query.bind(p);
            }
            Some(query.fetch_one(&self.pool).await?.0)
        } else {
            None
        };

        let q = select_list::<E>(&self.schema, shape);
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query_as::<_, E>(&q.sql);
        for p in q.params {
            query = query.bind(p);
        }
        let rows = query.fetch_all(&self.pool).await?;
        let total = shape.total(counted, rows.len());
        Ok((rows, total))
    }

    async fn get_related(&self, column: &str, ids: Vec<i64>) -> Result<Vec<E>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let q = select_related::<E>(&self.schema, column);
        tracing::debug!(sql = %q.sql, ids = ?ids, "query");
        Ok(sqlx::query_as::<_, E>(&q.sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?)
    }
}
