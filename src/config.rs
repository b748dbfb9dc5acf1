//! Service configuration from the environment.
//!
//! `MONGO_URL` and `DB_NAME` are required; both are read after `.env`
//! loading (see `main.rs`). The connection string is held as a
//! [`SecretString`] since it may embed credentials.

use std::env;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Connection settings for the document store.
#[derive(Debug)]
pub struct ServiceConfig {
    /// MongoDB connection string.
    pub mongo_url: SecretString,
    /// Database holding the registry collections.
    pub db_name: String,
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let mongo_url = required_env("MONGO_URL")?;
        let db_name = required_env("DB_NAME")?;
        Ok(Self {
            mongo_url: SecretString::from(mongo_url),
            db_name,
        })
    }
}

fn required_env(key: &str) -> Result<String, ConfigError> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingVar {
            key: key.to_string(),
        }),
    }
}
