//! Shared application state for all routes.

use crate::config::AppConfig;
use crate::model::{Card, User};
use crate::service::{CardService, UserService};
use crate::store::{MemoryRepository, PgRepository, Repository};
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub users: UserService,
    pub cards: CardService,
    /// Present when backed by PostgreSQL; probed by `/ready`.
    pub pool: Option<PgPool>,
    /// Bearer key required on `/api` when set.
    pub api_key: Option<Arc<str>>,
}

impl AppState {
    pub fn new(
        users: Arc<dyn Repository<User>>,
        cards: Arc<dyn Repository<Card>>,
        config: &AppConfig,
        pool: Option<PgPool>,
    ) -> Self {
        AppState {
            users: UserService::new(Arc::clone(&users), config.list),
            cards: CardService::new(cards, users, config.list),
            pool,
            api_key: config.api_key.as_deref().map(Arc::from),
        }
    }

    pub fn postgres(pool: PgPool, config: &AppConfig) -> Self {
        let users = Arc::new(PgRepository::<User>::new(pool.clone(), config.schema.clone()));
        let cards = Arc::new(PgRepository::<Card>::new(pool.clone(), config.schema.clone()));
        Self::new(users, cards, config, Some(pool))
    }

    /// Memory store; deleting a user takes their cards along as in PostgreSQL.
    pub fn in_memory(config: &AppConfig) -> Self {
        let cards = Arc::new(MemoryRepository::<Card>::new());
        let users = Arc::new(MemoryRepository::<User>::new().with_child(Arc::clone(&cards)));
        Self::new(users, cards, config, None)
    }
}
