//! Client configuration.
//!
//! Defaults suit tests and demos (in-memory database). `from_env` overrides
//! individual values from `TASKLIST_*` environment variables; a variable that
//! is set but cannot be parsed is an error rather than silently ignored.

use std::str::FromStr;

use tasklist_core::{ClientError, TaskResult};

use crate::events::DEFAULT_CHANGE_BUFFER;

pub const IN_MEMORY_DATABASE_URL: &str = "sqlite::memory:";

/// Titles must stay strictly shorter than this many characters.
pub const DEFAULT_MAX_TITLE_LENGTH: usize = 20;

pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub max_title_length: usize,
    pub change_buffer: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            database_url: IN_MEMORY_DATABASE_URL.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            max_title_length: DEFAULT_MAX_TITLE_LENGTH,
            change_buffer: DEFAULT_CHANGE_BUFFER,
        }
    }
}

impl ClientConfig {
    pub fn with_database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = url.into();
        self
    }

    /// Reads `TASKLIST_DATABASE_URL`, `TASKLIST_MAX_CONNECTIONS`,
    /// `TASKLIST_MAX_TITLE_LENGTH` and `TASKLIST_CHANGE_BUFFER`.
    pub fn from_env() -> TaskResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<L>(lookup: L) -> TaskResult<Self>
    where
        L: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let config = Self {
            database_url: lookup("TASKLIST_DATABASE_URL").unwrap_or(defaults.database_url),
            max_connections: parse_var(&lookup, "TASKLIST_MAX_CONNECTIONS")?
                .unwrap_or(defaults.max_connections),
            max_title_length: parse_var(&lookup, "TASKLIST_MAX_TITLE_LENGTH")?
                .unwrap_or(defaults.max_title_length),
            change_buffer: parse_var(&lookup, "TASKLIST_CHANGE_BUFFER")?
                .unwrap_or(defaults.change_buffer),
        };

        if config.max_connections == 0 {
            return Err(ClientError::InvalidConfig(
                "TASKLIST_MAX_CONNECTIONS must be at least 1".to_string(),
            ));
        }

        Ok(config)
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_url.contains(":memory:") || self.database_url.contains("mode=memory")
    }
}

fn parse_var<L, T>(lookup: &L, key: &str) -> TaskResult<Option<T>>
where
    L: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ClientError::InvalidConfig(format!("{key}={raw:?} is not a valid number"))),
    }
}
