//! Server configuration.

use std::{collections::HashMap, time::Duration};

use thiserror::Error;

use crate::hub::DEFAULT_MAILBOX_CAPACITY;

/// Default size of the display-name cache
pub const DEFAULT_NAME_CACHE_CAPACITY: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("user entry '{0}' must look like <id>=<name>")]
    MalformedUserEntry(String),

    #[error("user id '{0}' is not an unsigned 32-bit integer")]
    MalformedUserId(String),
}

/// Runtime settings of the chat hub server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Per-client mailbox size
    pub mailbox_capacity: usize,
    /// Drop connections that send nothing for this long
    pub idle_timeout: Option<Duration>,
    /// Display names seeded into the in-memory user directory
    pub users: HashMap<u32, String>,
    /// Bounded display-name cache; 0 disables it
    pub name_cache_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            mailbox_capacity: DEFAULT_MAILBOX_CAPACITY,
            idle_timeout: None,
            users: HashMap::new(),
            name_cache_capacity: DEFAULT_NAME_CACHE_CAPACITY,
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Parse a `<id>=<name>` user entry as given on the command line
pub fn parse_user_entry(entry: &str) -> Result<(u32, String), ConfigError> {
    let (id, name) = entry
        .split_once('=')
        .ok_or_else(|| ConfigError::MalformedUserEntry(entry.to_string()))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(ConfigError::MalformedUserEntry(entry.to_string()));
    }
    let id = id
        .trim()
        .parse::<u32>()
        .map_err(|_| ConfigError::MalformedUserId(id.trim().to_string()))?;
    Ok((id, name.to_string()))
}
