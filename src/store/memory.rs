//! In-process adapter with the same scoping, filter, order and count behaviour
//! as [`super::PgRepository`]. Used by tests and when no database is configured.

use crate::list::QueryShape;
use crate::model::Entity;
use crate::sql::BindValue;
use crate::store::{Repository, StoreError};
use async_trait::async_trait;
use chrono::Utc;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex, MutexGuard};

struct Rows<E> {
    by_id: BTreeMap<i64, E>,
    last_id: i64,
}

/// Rows of another table that follow a parent into deletion.
trait Children: Send + Sync {
    fn table(&self) -> &'static str;
    fn delete_owned(&self, column: &str, owner: i64, unscoped: bool) -> Result<(), StoreError>;
}

pub struct MemoryRepository<E> {
    rows: Mutex<Rows<E>>,
    count_queries: AtomicUsize,
    children: Vec<Arc<dyn Children>>,
}

impl<E> Default for MemoryRepository<E> {
    fn default() -> Self {
        MemoryRepository {
            rows: Mutex::new(Rows {
                by_id: BTreeMap::new(),
                last_id: 0,
            }),
            count_queries: AtomicUsize::new(0),
            children: Vec::new(),
        }
    }
}

impl<E: Entity> MemoryRepository<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the store holding child rows named in [`Entity::CASCADE`].
    pub fn with_child<C: Entity>(mut self, child: Arc<MemoryRepository<C>>) -> Self {
        self.children.push(child);
        self
    }

    /// Number of count queries run by [`Repository::get_list`] so far.
    pub fn count_queries(&self) -> usize {
        self.count_queries.load(AtomicOrdering::Relaxed)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Rows<E>>, StoreError> {
        self.rows
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))
    }

    fn find(&self, id: i64, unscoped: bool) -> Result<E, StoreError> {
        let rows = self.lock()?;
        rows.by_id
            .get(&id)
            .filter(|e| unscoped || !e.is_deleted())
            .cloned()
            .ok_or(StoreError::NotFound)
    }
}

impl<E: Entity> Children for MemoryRepository<E> {
    fn table(&self) -> &'static str {
        E::TABLE
    }

    fn delete_owned(&self, column: &str, owner: i64, unscoped: bool) -> Result<(), StoreError> {
        let mut rows = self.lock()?;
        let owned = BindValue::Int(owner);
        if unscoped {
            rows.by_id.retain(|_, e| e.field(column).as_ref() != Some(&owned));
            return Ok(());
        }
        let now = Utc::now();
        rows.by_id
            .values_mut()
            .filter(|e| !e.is_deleted() && e.field(column).as_ref() == Some(&owned))
            .for_each(|e| e.stamps_mut().deleted_at = Some(now));
        Ok(())
    }
}

fn matches<E: Entity>(entity: &E, shape: &QueryShape) -> bool {
    if !shape.include_deleted && entity.is_deleted() {
        return false;
    }
    let filtered = shape
        .filter
        .conditions()
        .iter()
        .all(|c| entity.field(c.column).as_ref() == Some(&c.value));
    let searched = shape.search.as_ref().map_or(true, |s| {
        entity
            .field(s.column)
            .and_then(|v| v.as_text().map(|t| s.matches(t)))
            .unwrap_or(false)
    });
    filtered && searched
}

fn compare<E: Entity>(a: &E, b: &E, column: &str) -> Ordering {
    match column {
        "created_at" => a.stamps().created_at.cmp(&b.stamps().created_at),
        "updated_at" => a.stamps().updated_at.cmp(&b.stamps().updated_at),
        _ => a.field(column).cmp(&b.field(column)),
    }
}

#[async_trait]
impl<E: Entity> Repository<E> for MemoryRepository<E> {
    async fn create(&self, mut entity: E) -> Result<E, StoreError> {
        let mut rows = self.lock()?;
        rows.last_id += 1;
        let now = Utc::now();
        entity.set_id(rows.last_id);
        let stamps = entity.stamps_mut();
        stamps.created_at = now;
        stamps.updated_at = now;
        stamps.deleted_at = None;
        rows.by_id.insert(entity.id(), entity.clone());
        Ok(entity)
    }

    async fn update(&self, mut entity: E) -> Result<E, StoreError> {
        let mut rows = self.lock()?;
        let stored = rows
            .by_id
            .get_mut(&entity.id())
            .filter(|e| !e.is_deleted())
            .ok_or(StoreError::NotFound)?;
        let mut stamps = stored.stamps().clone();
        stamps.updated_at = Utc::now();
        *entity.stamps_mut() = stamps;
        *stored = entity.clone();
        Ok(entity)
    }

    async fn get_by_id(&self, id: i64) -> Result<E, StoreError> {
        self.find(id, false)
    }

    async fn get_by_id_unscoped(&self, id: i64) -> Result<E, StoreError> {
        self.find(id, true)
    }

    /// Children listed in [`Entity::CASCADE`] follow the row, provided their store was
    /// registered with [`MemoryRepository::with_child`].
    async fn delete(&self, entity: &E, unscoped: bool) -> Result<(), StoreError> {
        let mut rows = self.lock()?;
        let id = entity.id();
        match rows.by_id.get(&id) {
            Some(e) if unscoped || !e.is_deleted() => {}
            _ => return Err(StoreError::NotFound),
        }
        for (table, column) in E::CASCADE {
            for child in self.children.iter().filter(|c| c.table() == *table) {
                child.delete_owned(column, id, unscoped)?;
            }
        }
        if unscoped {
            rows.by_id.remove(&id);
        } else if let Some(stored) = rows.by_id.get_mut(&id) {
            stored.stamps_mut().deleted_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn get_related(&self, column: &str, ids: Vec<i64>) -> Result<Vec<E>, StoreError> {
        let rows = self.lock()?;
        let wanted: Vec<BindValue> = ids.into_iter().map(BindValue::Int).collect();
        Ok(rows
            .by_id
            .values()
            .filter(|e| !e.is_deleted() && e.field(column).is_some_and(|v| wanted.contains(&v)))
            .cloned()
            .collect())
    }

    async fn get_list(&self, shape: &QueryShape) -> Result<(Vec<E>, i64), StoreError> {
        let rows = self.lock()?;
        let mut matched: Vec<&E> = rows.by_id.values().filter(|e| matches(*e, shape)).collect();
        matched.sort_by(|a, b| {
            shape
                .order
                .iter()
                .map(|o| compare(*a, *b, o.column))
                .find(|o| o.is_ne())
                .unwrap_or_else(|| a.id().cmp(&b.id()))
        });

        let counted = if shape.needs_count() {
            self.count_queries.fetch_add(1, AtomicOrdering::Relaxed);
            Some(i64::try_from(matched.len()).unwrap_or(i64::MAX))
        } else {
            None
        };

        let skip = usize::try_from(shape.offset).unwrap_or(usize::MAX);
        let take = shape
            .limit
            .get()
            .map_or(usize::MAX, |n| usize::try_from(n).unwrap_or(usize::MAX));
        let page: Vec<E> = matched.into_iter().skip(skip).take(take).cloned().collect();
        let total = shape.total(counted, page.len());
        Ok((page, total))
    }
}
