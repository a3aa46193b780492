//! Shared server state handed to every connection handler

use duet_signaling::SessionCoordinator;
use std::sync::Arc;

/// Settings that shape how connections are admitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Name shown to the partner when the client did not pick one
    pub default_name: String,
    /// Longer names are cut to this many characters
    pub max_name_len: usize,
    /// Events buffered per connection before further ones are dropped
    pub outbound_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            default_name: "anonymous".to_string(),
            max_name_len: 32,
            outbound_capacity: 64,
        }
    }
}

impl ServerConfig {
    /// Picks the display name for a new connection
    pub fn display_name(&self, requested: Option<&str>) -> String {
        match requested.map(str::trim) {
            Some(name) if !name.is_empty() => name.chars().take(self.max_name_len).collect(),
            _ => self.default_name.clone(),
        }
    }
}

/// The main server state. Clones share the same pairing core.
#[derive(Debug, Clone, Default)]
pub struct ServerState {
    pub coordinator: SessionCoordinator,
    pub config: Arc<ServerConfig>,
}

impl ServerState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            coordinator: SessionCoordinator::new(),
            config: Arc::new(config),
        }
    }
}
