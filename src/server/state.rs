use std::sync::Arc;

use crate::agents::ProductManagerAgent;
use crate::config::Config;

/// Shared application state passed to all route handlers. Read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub agent: Arc<ProductManagerAgent>,
}

impl AppState {
    pub fn new(config: Config, agent: ProductManagerAgent) -> Self {
        Self {
            config: Arc::new(config),
            agent: Arc::new(agent),
        }
    }

    /// Build every client from configuration, choosing live or mock mode once.
    pub fn from_config(config: Config) -> Self {
        let agent = ProductManagerAgent::from_config(&config);
        Self::new(config, agent)
    }
}
