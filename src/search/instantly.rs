// src/search/instantly.rs — Instantly SuperSearch client (preview, enrich, status)

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use super::{EnrichmentJob, EnrichmentRequest, EnrichmentStatus, LeadCounter};
use crate::core::filters::FilterSet;
use crate::infra::config::SearchConfig;
use crate::infra::errors::LeadLoopError;

const PREVIEW_PATH: &[&str] = &["supersearch-enrichment", "preview-leads-from-supersearch"];
const ENRICH_PATH: &[&str] = &["supersearch-enrichment", "enrich-leads-from-supersearch"];

pub struct InstantlyClient {
    base_url: Url,
    api_key: String,
    client: reqwest::Client,
}

#[derive(Debug, Clone, Copy)]
enum Call {
    Preview,
    Enrich,
}

impl Call {
    fn error(self, status: Option<u16>, message: String) -> LeadLoopError {
        match self {
            Call::Preview => LeadLoopError::Evaluation { status, message },
            Call::Enrich => LeadLoopError::Enrichment { status, message },
        }
    }

    fn transport(self, err: reqwest::Error) -> LeadLoopError {
        match self {
            Call::Preview => LeadLoopError::evaluation(err),
            Call::Enrich => LeadLoopError::enrichment(err),
        }
    }
}

#[derive(Deserialize)]
struct PreviewResponse {
    #[serde(default)]
    count: Option<u64>,
}

impl InstantlyClient {
    pub fn new(api_key: String, base_url: &str, timeout: Duration) -> Result<Self, LeadLoopError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| LeadLoopError::Config(format!("invalid base URL '{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(LeadLoopError::Config(format!(
                "base URL '{}' cannot carry a path",
                base_url
            )));
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LeadLoopError::Config(format!("HTTP client: {}", e)))?;

        Ok(Self {
            base_url,
            api_key,
            client,
        })
    }

    pub fn from_config(cfg: &SearchConfig) -> Result<Self, LeadLoopError> {
        let api_key = cfg.resolve_api_key().ok_or_else(|| {
            LeadLoopError::Config(format!(
                "No lead provider API key. Set {} or search.api_key in config.toml.",
                cfg.api_key_env
            ))
        })?;
        Self::new(
            api_key,
            &cfg.base_url,
            Duration::from_secs(cfg.timeout_seconds),
        )
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Free count of leads matching `filters`.
    pub async fn preview(&self, filters: &FilterSet) -> Result<u64, LeadLoopError> {
        let body = serde_json::json!({ "search_filters": filters });
        let request = self.client.post(self.endpoint(PREVIEW_PATH)).json(&body);
        let resp: PreviewResponse = self.send(request, Call::Preview).await?;
        let count = resp.count.unwrap_or(0);
        tracing::debug!(count, "Preview returned");
        Ok(count)
    }

    /// Start an enrichment job. Spends credits.
    pub async fn enrich(&self, request: &EnrichmentRequest) -> Result<EnrichmentJob, LeadLoopError> {
        tracing::info!(limit = request.limit, "Starting enrichment");
        let builder = self.client.post(self.endpoint(ENRICH_PATH)).json(request);
        self.send(builder, Call::Enrich).await
    }

    pub async fn enrichment_status(
        &self,
        resource_id: &str,
    ) -> Result<EnrichmentStatus, LeadLoopError> {
        let builder = self
            .client
            .get(self.endpoint(&["supersearch-enrichment", resource_id]));
        self.send(builder, Call::Enrich).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
        call: Call,
    ) -> Result<T, LeadLoopError> {
        let response = builder
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| call.transport(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(call.error(
                Some(status.as_u16()),
                crate::util::truncate_str(body.trim(), 300).to_string(),
            ));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| call.error(None, format!("Failed to parse response: {}", e)))
    }
}

#[async_trait]
impl LeadCounter for InstantlyClient {
    async fn evaluate(&self, filters: &FilterSet) -> Result<u64, LeadLoopError> {
        self.preview(filters).await
    }
}
