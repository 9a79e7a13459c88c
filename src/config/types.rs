//! Runtime configuration, built once at startup and passed to the components that need it.

/// Defaults used when the corresponding variable is unset.
pub const DEFAULT_SCHEMA: &str = "public";
pub const DEFAULT_BIND: &str = "0.0.0.0:3000";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_PAGE_LIMIT: u32 = 10;
pub const DEFAULT_MAX_PAGE_LIMIT: u32 = 100;

/// Page-size policy for list endpoints.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ListConfig {
    pub default_limit: u32,
    pub max_limit: u32,
}

impl Default for ListConfig {
    fn default() -> Self {
        ListConfig {
            default_limit: DEFAULT_PAGE_LIMIT,
            max_limit: DEFAULT_MAX_PAGE_LIMIT,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    /// PostgreSQL URL. When absent the server runs on the in-memory store.
    pub database_url: Option<String>,
    /// Schema holding the `users` and `cards` tables.
    pub schema: String,
    pub bind_addr: String,
    pub max_connections: u32,
    /// Bearer key required on every `/api` request when set.
    pub api_key: Option<String>,
    pub list: ListConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            database_url: None,
            schema: DEFAULT_SCHEMA.into(),
            bind_addr: DEFAULT_BIND.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            api_key: None,
            list: ListConfig::default(),
        }
    }
}
