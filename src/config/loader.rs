//! Load [`AppConfig`] from environment variables (or any key lookup, for tests).

use crate::config::types::*;
use crate::config::validate;
use crate::error::ConfigError;
use std::str::FromStr;

pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
pub const ENV_SCHEMA: &str = "CARDBOOK_SCHEMA";
pub const ENV_BIND: &str = "CARDBOOK_BIND";
pub const ENV_MAX_CONNECTIONS: &str = "CARDBOOK_MAX_CONNECTIONS";
pub const ENV_API_KEY: &str = "CARDBOOK_API_KEY";
pub const ENV_DEFAULT_LIMIT: &str = "CARDBOOK_DEFAULT_LIMIT";
pub const ENV_MAX_LIMIT: &str = "CARDBOOK_MAX_LIMIT";

impl AppConfig {
    /// Read the process environment. Call `dotenvy::dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = AppConfig::default();

        let schema = get(ENV_SCHEMA).unwrap_or_else(|| {
            tracing::debug!("{} unset, using schema '{}'", ENV_SCHEMA, DEFAULT_SCHEMA);
            defaults.schema.clone()
        });
        let database_url = get(ENV_DATABASE_URL);
        if database_url.is_none() {
            tracing::warn!("{} unset, falling back to the in-memory store", ENV_DATABASE_URL);
        }

        let config = AppConfig {
            database_url,
            schema,
            bind_addr: get(ENV_BIND).unwrap_or(defaults.bind_addr),
            max_connections: parse_or(ENV_MAX_CONNECTIONS, get(ENV_MAX_CONNECTIONS), defaults.max_connections)?,
            api_key: get(ENV_API_KEY),
            list: ListConfig {
                default_limit: parse_or(ENV_DEFAULT_LIMIT, get(ENV_DEFAULT_LIMIT), defaults.list.default_limit)?,
                max_limit: parse_or(ENV_MAX_LIMIT, get(ENV_MAX_LIMIT), defaults.list.max_limit)?,
            },
        };
        validate(&config)?;
        Ok(config)
    }
}

fn parse_or<T: FromStr>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(v) => v.parse().map_err(|_| ConfigError::InvalidValue { key, value: v }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_lookup(|k| vars.get(k).cloned())
    }

    #[test]
    fn defaults_when_nothing_set() {
        assert_eq!(load(&[]).unwrap(), AppConfig::default());
    }

    #[test]
    fn reads_every_key() {
        let config = load(&[
            (ENV_DATABASE_URL, "postgres://localhost/cards"),
            (ENV_SCHEMA, "cardbook"),
            (ENV_BIND, "127.0.0.1:8080"),
            (ENV_MAX_CONNECTIONS, "12"),
            (ENV_API_KEY, "valid-key"),
            (ENV_DEFAULT_LIMIT, "25"),
            (ENV_MAX_LIMIT, "50"),
        ])
        .unwrap();
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/cards"));
        assert_eq!(config.schema, "cardbook");
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.max_connections, 12);
        assert_eq!(config.api_key.as_deref(), Some("valid-key"));
        assert_eq!(config.list, ListConfig { default_limit: 25, max_limit: 50 });
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = load(&[(ENV_API_KEY, "  "), (ENV_SCHEMA, "")]).unwrap();
        assert_eq!(config.api_key, None);
        assert_eq!(config.schema, DEFAULT_SCHEMA);
    }

    #[test]
    fn rejects_non_numeric_limit() {
        let err = load(&[(ENV_DEFAULT_LIMIT, "ten")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: ENV_DEFAULT_LIMIT, .. }));
    }

    #[test]
    fn rejects_bad_schema_name() {
        assert!(load(&[(ENV_SCHEMA, "users; drop table cards")]).is_err());
    }
}
