// src/state.rs
use std::sync::Arc;

use crate::config::Config;
use crate::services::relay::{CompletionSettings, RelayService};
use crate::services::upstream::{CompletionClient, OpenAiClient};

pub type SharedState = Arc<AppState>;

#[derive(Debug)]
pub struct AppState {
    pub relay: RelayService,
    pub api_key_format_valid: bool,
}

impl AppState {
    /// Build state from configuration, constructing the upstream client
    /// only when a credential is present.
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let client = match &config.api_key {
            Some(key) => Some(Arc::new(OpenAiClient::new(
                &config.base_url,
                key.clone(),
                config.upstream_timeout,
            )?) as Arc<dyn CompletionClient>),
            None => None,
        };
        Ok(Self::with_client(config, client))
    }

    pub fn with_client(config: &Config, client: Option<Arc<dyn CompletionClient>>) -> Self {
        Self {
            relay: RelayService::new(
                client,
                CompletionSettings::from(config),
                config.max_concurrent_upstream,
            ),
            api_key_format_valid: config.api_key_format_valid(),
        }
    }
}
