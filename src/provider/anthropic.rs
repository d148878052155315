// src/provider/anthropic.rs — Anthropic Messages API provider (non-streaming)

use std::time::Duration;

use async_trait::async_trait;

use super::{ChatRequest, ChatResponse, ModelProvider, Role, TokenUsage};
use crate::infra::errors::LeadLoopError;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";

pub struct AnthropicProvider {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
    /// Per-request deadline; none means reqwest's default (wait forever).
    timeout: Option<Duration>,
}

impl AnthropicProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Point at a different host (proxies, local test servers).
    pub fn with_base_url(api_key: String, base_url: impl Into<String>) -> Self {
        Self {
            api_key,
            base_url: base_url.into(),
            client: reqwest::Client::new(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn api_url(&self) -> String {
        format!("{}/v1/messages", self.base_url.trim_end_matches('/'))
    }

    fn build_request_body(&self, request: &ChatRequest) -> serde_json::Value {
        let messages: Vec<serde_json::Value> = request
            .messages
            .iter()
            .map(|m| {
                serde_json::json!({
                    "role": match m.role {
                        Role::User => "user",
                        Role::Assistant => "assistant",
                    },
                    "content": m.content,
                })
            })
            .collect();

        let mut body = serde_json::json!({
            "model": request.model,
            "messages": messages,
            "max_tokens": request.max_tokens.unwrap_or(2000),
        });

        if let Some(system) = &request.system {
            body["system"] = serde_json::json!(system);
        }

        if let Some(temp) = request.temperature {
            body["temperature"] = serde_json::json!(temp);
        }

        body
    }

    fn provider_error(message: String, retriable: bool) -> LeadLoopError {
        LeadLoopError::Provider {
            provider: "anthropic".into(),
            message,
            retriable,
        }
    }
}

#[async_trait]
impl ModelProvider for AnthropicProvider {
    fn id(&self) -> &str {
        "anthropic"
    }

    fn name(&self) -> &str {
        "Anthropic"
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, LeadLoopError> {
        let body = self.build_request_body(&request);

        let mut builder = self
            .client
            .post(self.api_url())
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(&body);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Self::provider_error(e.to_string(), e.is_timeout() || e.is_connect()))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
                .unwrap_or(5);
            return Err(LeadLoopError::RateLimited {
                provider: "anthropic".into(),
                retry_after_ms: retry_after_secs * 1000,
            });
        }

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(Self::provider_error(
                format!(
                    "HTTP {}: {}",
                    status,
                    crate::util::truncate_str(error_body.trim(), 300)
                ),
                status.is_server_error(),
            ));
        }

        let resp: serde_json::Value = response
            .json()
            .await
            .map_err(|e| Self::provider_error(format!("Failed to parse response: {}", e), false))?;

        let content = resp["content"]
            .as_array()
            .map(|blocks| {
                blocks
                    .iter()
                    .filter(|c| c["type"] == "text")
                    .filter_map(|c| c["text"].as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        let usage = TokenUsage {
            input_tokens: resp["usage"]["input_tokens"].as_u64().unwrap_or(0) as u32,
            output_tokens: resp["usage"]["output_tokens"].as_u64().unwrap_or(0) as u32,
        };

        tracing::debug!(
            model = %request.model,
            input_tokens = usage.input_tokens,
            output_tokens = usage.output_tokens,
            "Anthropic reply received"
        );

        Ok(ChatResponse { content, usage })
    }
}
