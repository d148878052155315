// src/provider/mod.rs — Language-model provider layer

pub mod anthropic;
pub mod retry;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::infra::config::AdvisorConfig;
use crate::infra::errors::LeadLoopError;

/// A chat-completion backend.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    fn id(&self) -> &str;
    fn name(&self) -> &str;

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, LeadLoopError>;
}

#[derive(Debug, Clone, Default)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub system: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub content: String,
    pub usage: TokenUsage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl TokenUsage {
    pub fn total(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }
}

/// Build the advisor's provider from config: Anthropic behind the retry
/// wrapper. Returns `NoProvider` when no API key can be found.
pub fn from_config(cfg: &AdvisorConfig) -> Result<Arc<dyn ModelProvider>, LeadLoopError> {
    let api_key = cfg.resolve_api_key().ok_or(LeadLoopError::NoProvider)?;
    let inner: Arc<dyn ModelProvider> = Arc::new(
        anthropic::AnthropicProvider::new(api_key)
            .with_timeout(Duration::from_secs(cfg.timeout_seconds)),
    );
    Ok(Arc::new(retry::RetryProvider::with_config(
        inner,
        retry::RetryConfig::with_max_retries(cfg.max_retries),
    )))
}
