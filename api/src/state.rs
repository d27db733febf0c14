//! Application state module.
//!
//! Defines the shared application state that is passed to route handlers.

use crate::config::Config;
use std::sync::Arc;

/// Application state shared across all request handlers.
///
/// Translation is stateless, so the state only carries the request defaults
/// from the server configuration.
#[derive(Debug, Clone)]
pub struct AppState {
    config: Arc<Config>,
}

impl AppState {
    /// Creates a new application state from the server configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Returns the server configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
