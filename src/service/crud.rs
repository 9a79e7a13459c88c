//! Generic CRUD orchestration over a [`Repository`]. Every store error is
//! reclassified into exactly one [`AppError`] kind before it leaves here.

use crate::config::ListConfig;
use crate::error::{AppError, Operation};
use crate::list::{plan, Filter, ListRequest, ListSpec, PageMeta};
use crate::model::Entity;
use crate::service::merge::{merge, Patch};
use crate::store::{Repository, StoreError};
use serde::Serialize;
use std::sync::Arc;

/// An entity the generic service can create, patch and list.
pub trait Resource: Entity + Serialize {
    /// Create payload.
    type Draft: Send + 'static;
    /// Partial-update payload.
    type Patch: Patch<Self> + Send + 'static;
    const LIST: ListSpec;

    /// Validate required fields and build an unsaved entity.
    fn from_draft(draft: Self::Draft) -> Result<Self, AppError>;
}

#[derive(Clone, Debug, Serialize)]
pub struct ListResponse<E> {
    pub rows: Vec<E>,
    pub meta: PageMeta,
}

impl<E> ListResponse<E> {
    /// Same page with each row converted.
    pub fn map_rows<T>(self, f: impl FnMut(E) -> T) -> ListResponse<T> {
        ListResponse {
            rows: self.rows.into_iter().map(f).collect(),
            meta: self.meta,
        }
    }
}

pub struct CrudService<E> {
    repo: Arc<dyn Repository<E>>,
    list: ListConfig,
}

impl<E> Clone for CrudService<E> {
    fn clone(&self) -> Self {
        CrudService {
            repo: Arc::clone(&self.repo),
            list: self.list,
        }
    }
}

impl<E: Resource> CrudService<E> {
    pub fn new(repo: Arc<dyn Repository<E>>, list: ListConfig) -> Self {
        CrudService { repo, list }
    }

    pub async fn create(&self, draft: E::Draft) -> Result<E, AppError> {
        let entity = E::from_draft(draft)?;
        self.insert(entity).await
    }

    /// Persist an already validated entity.
    pub async fn insert(&self, entity: E) -> Result<E, AppError> {
        self.repo
            .create(entity)
            .await
            .map_err(|e| AppError::persistence(Operation::Create, E::RESOURCE, e))
    }

    pub async fn get_by_id(&self, id: i64) -> Result<E, AppError> {
        self.repo.get_by_id(id).await.map_err(read_error::<E>)
    }

    /// Read including soft-deleted rows.
    pub async fn get_by_id_unscoped(&self, id: i64) -> Result<E, AppError> {
        self.repo.get_by_id_unscoped(id).await.map_err(read_error::<E>)
    }

    pub async fn update(&self, id: i64, patch: E::Patch) -> Result<E, AppError> {
        let existing = self.get_by_id(id).await?;
        let merged = merge(&existing, patch)?;
        self.save(merged).await
    }

    /// Write a merged entity back.
    pub async fn save(&self, entity: E) -> Result<E, AppError> {
        self.repo
            .update(entity)
            .await
            .map_err(|e| AppError::persistence(Operation::Update, E::RESOURCE, e))
    }

    /// Soft delete.
    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        let entity = self.get_by_id(id).await?;
        self.remove(&entity, false).await
    }

    /// Hard delete. Also removes rows that were already soft-deleted.
    pub async fn purge(&self, id: i64) -> Result<(), AppError> {
        let entity = self.get_by_id_unscoped(id).await?;
        self.remove(&entity, true).await
    }

    pub async fn remove(&self, entity: &E, unscoped: bool) -> Result<(), AppError> {
        self.repo.delete(entity, unscoped).await.map_err(|e| match e {
            StoreError::Commit(_) => AppError::commit(e),
            e => AppError::persistence(Operation::Delete, E::RESOURCE, e),
        })
    }

    /// Live rows whose `column` holds one of `ids`, for embedding in another resource.
    pub async fn get_related(&self, column: &str, ids: Vec<i64>) -> Result<Vec<E>, AppError> {
        self.repo
            .get_related(column, ids)
            .await
            .map_err(|e| AppError::persistence(Operation::Read, E::RESOURCE, e))
    }

    /// List with `scope` conditions added after the client's filters.
    pub async fn get_list(
        &self,
        request: ListRequest,
        scope: Filter,
    ) -> Result<ListResponse<E>, AppError> {
        let (mut shape, page) = plan(request, &E::LIST, &self.list)?;
        shape.filter.extend(scope);
        let (rows, total) = self
            .repo
            .get_list(&shape)
            .await
            .map_err(|e| AppError::persistence(Operation::Read, E::RESOURCE, e))?;
        Ok(ListResponse {
            rows,
            meta: page.meta(total),
        })
    }
}

fn read_error<E: Entity>(e: StoreError) -> AppError {
    if e.is_not_found() {
        AppError::not_found(E::RESOURCE)
    } else {
        AppError::persistence(Operation::Read, E::RESOURCE, e)
    }
}
