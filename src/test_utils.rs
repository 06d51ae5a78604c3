//! Scripted upstream client for exercising the relay without a network.
use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;

use crate::services::upstream::{CompletionClient, CompletionRequest, UpstreamError};

#[derive(Debug, Clone)]
enum Behaviour {
    Reply(String),
    Echo,
    Fail(UpstreamError),
}

/// Records every request it receives and answers according to its script.
#[derive(Debug, Clone)]
pub struct MockCompletionClient {
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
    behaviour: Behaviour,
    delay: Option<Duration>,
}

impl MockCompletionClient {
    pub fn replying(text: impl Into<String>) -> Self {
        Self::with_behaviour(Behaviour::Reply(text.into()))
    }

    /// Answers with `echo: <user message>`.
    pub fn echoing() -> Self {
        Self::with_behaviour(Behaviour::Echo)
    }

    pub fn failing(error: UpstreamError) -> Self {
        Self::with_behaviour(Behaviour::Fail(error))
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn with_behaviour(behaviour: Behaviour) -> Self {
        Self {
            requests: Arc::new(Mutex::new(Vec::new())),
            behaviour,
            delay: None,
        }
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionClient for MockCompletionClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, UpstreamError> {
        self.requests.lock().unwrap().push(request.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.behaviour {
            Behaviour::Reply(text) => Ok(text.clone()),
            Behaviour::Echo => Ok(format!("echo: {}", request.user_message().unwrap_or_default())),
            Behaviour::Fail(e) => Err(e.clone()),
        }
    }
}
