//! cardbook: users and their cards over a generic list/filter/paginate/soft-delete repository.

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod list;
pub mod model;
pub mod response;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;

pub use config::{AppConfig, ListConfig};
pub use error::{AppError, ConfigError, ErrorKind, Operation};
pub use extractors::USER_ID_HEADER;
pub use model::{Card, Entity, User};
pub use routes::{api_routes, app, common_routes};
pub use service::{CardService, CrudService, UserService};
pub use state::AppState;
pub use store::schema::{ensure_database_exists, ensure_tables};
pub use store::{MemoryRepository, PgRepository, Repository, StoreError};
