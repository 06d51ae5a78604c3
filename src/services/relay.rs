// src/services/relay.rs
use std::{fmt::Debug, sync::Arc, time::Instant};

use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

use super::upstream::{ChatMessage, CompletionClient, CompletionRequest, Role};
use crate::{
    config::Config,
    error::AppError,
    message::{ChatReply, ChatRequest},
};

pub const SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// Fixed parameters of every upstream completion.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionSettings {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl From<&Config> for CompletionSettings {
    fn from(config: &Config) -> Self {
        Self {
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }
}

/// Stateless relay between `/chat` callers and the completion API.
///
/// `client` is `None` when no credential was resolved at startup; every call
/// then fails with [`AppError::Unconfigured`] without touching the network.
#[derive(Clone)]
pub struct RelayService {
    client: Option<Arc<dyn CompletionClient>>,
    settings: CompletionSettings,
    permits: Arc<Semaphore>,
}

impl Debug for RelayService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayService")
            .field("configured", &self.client.is_some())
            .field("settings", &self.settings)
            .field("available_permits", &self.permits.available_permits())
            .finish()
    }
}

impl RelayService {
    pub fn new(
        client: Option<Arc<dyn CompletionClient>>,
        settings: CompletionSettings,
        max_concurrent: usize,
    ) -> Self {
        Self {
            client,
            settings,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    /// Upstream calls that could start right now without waiting.
    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }

    pub fn settings(&self) -> &CompletionSettings {
        &self.settings
    }

    /// Build the two-message completion body for `message`.
    pub fn build_request(&self, message: &str) -> CompletionRequest {
        CompletionRequest {
            model: self.settings.model.clone(),
            messages: vec![
                ChatMessage {
                    role: Role::System,
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: Role::User,
                    content: message.to_string(),
                },
            ],
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
        }
    }

    pub async fn handle_chat(&self, request: ChatRequest) -> Result<ChatReply, AppError> {
        let Some(client) = &self.client else {
            error!("chat request rejected: upstream API key is not configured");
            return Err(AppError::Unconfigured);
        };

        let message = request
            .message
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .ok_or_else(|| {
                debug!("chat request rejected: empty message");
                AppError::InvalidInput
            })?;

        let upstream_request = self.build_request(message);

        // The semaphore is never closed, so acquire cannot fail.
        let _permit = self
            .permits
            .acquire()
            .await
            .expect("relay semaphore closed");

        let started = Instant::now();
        match client.complete(&upstream_request).await {
            Ok(text) => {
                info!(
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    chars = text.len(),
                    "chat completion succeeded"
                );
                Ok(ChatReply {
                    reply: text.trim().to_string(),
                })
            }
            Err(e) => {
                warn!(
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    rate_limited = e.is_rate_limited(),
                    error = %e,
                    "chat completion failed"
                );
                Err(AppError::Upstream(e))
            }
        }
    }
}
