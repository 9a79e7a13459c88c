//! Config validation: identifiers and list limits.

use crate::config::AppConfig;
use crate::error::ConfigError;
use regex::Regex;
use std::sync::LazyLock;

static IDENTIFIER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]{0,62}$").ok());

/// Whether `name` is a plain PostgreSQL identifier, safe to interpolate into DDL.
pub fn is_identifier(name: &str) -> bool {
    IDENTIFIER.as_ref().is_some_and(|re| re.is_match(name))
}

pub fn validate(config: &AppConfig) -> Result<(), ConfigError> {
    if !is_identifier(&config.schema) {
        return Err(ConfigError::Validation(format!(
            "schema '{}' is not a valid identifier",
            config.schema
        )));
    }
    if config.max_connections == 0 {
        return Err(ConfigError::Validation("max connections must be at least 1".into()));
    }
    let list = &config.list;
    if list.default_limit == 0 || list.max_limit == 0 {
        return Err(ConfigError::Validation("list limits must be at least 1".into()));
    }
    if list.default_limit > list.max_limit {
        return Err(ConfigError::Validation(format!(
            "default limit {} exceeds max limit {}",
            list.default_limit, list.max_limit
        )));
    }
    Ok(())
}
