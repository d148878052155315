// src/advisor/llm.rs — Language-model backed filter advisor

use async_trait::async_trait;
use std::sync::Arc;

use super::parser::{parse_filter_set, parse_recommendation};
use super::prompt::{render_advice_prompt, render_draft_prompt};
use super::{AdvisoryContext, FilterAdvisor};
use crate::core::filters::FilterSet;
use crate::core::types::Recommendation;
use crate::infra::config::AdvisorConfig;
use crate::infra::errors::LeadLoopError;
use crate::provider::{ChatRequest, Message, ModelProvider};

const DRAFT_MAX_TOKENS: u32 = 1500;

pub struct LlmAdvisor {
    provider: Arc<dyn ModelProvider>,
    model: String,
    max_tokens: u32,
}

impl LlmAdvisor {
    pub fn new(provider: Arc<dyn ModelProvider>, model: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            provider,
            model: model.into(),
            max_tokens,
        }
    }

    pub fn from_config(cfg: &AdvisorConfig) -> Result<Self, LeadLoopError> {
        let provider = crate::provider::from_config(cfg)?;
        Ok(Self::new(provider, cfg.model.clone(), cfg.max_tokens))
    }

    async fn ask(&self, prompt: String, max_tokens: u32) -> Result<String, LeadLoopError> {
        let response = self
            .provider
            .chat(ChatRequest {
                model: self.model.clone(),
                messages: vec![Message::user(prompt)],
                max_tokens: Some(max_tokens),
                ..Default::default()
            })
            .await?;
        tracing::debug!(
            provider = self.provider.id(),
            tokens = response.usage.total(),
            "Advisor replied"
        );
        Ok(response.content)
    }

    /// Draft an initial filter set from a plain-language audience description.
    pub async fn draft_filters(&self, description: &str) -> Result<FilterSet, LeadLoopError> {
        if description.trim().is_empty() {
            return Err(LeadLoopError::InvalidFilters(
                "audience description is empty".into(),
            ));
        }
        let prompt = render_draft_prompt(description)?;
        let reply = self.ask(prompt, DRAFT_MAX_TOKENS).await?;
        parse_filter_set(&reply)
    }
}

#[async_trait]
impl FilterAdvisor for LlmAdvisor {
    async fn recommend(&self, ctx: &AdvisoryContext<'_>) -> Result<Recommendation, LeadLoopError> {
        let prompt = render_advice_prompt(ctx)?;
        let reply = self.ask(prompt, self.max_tokens).await?;
        parse_recommendation(&reply)
    }
}
