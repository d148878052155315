// src/search/mod.rs — Lead provider abstraction

pub mod instantly;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::filters::FilterSet;
use crate::infra::config::{AiEnrichment, EnrichConfig};
use crate::infra::errors::LeadLoopError;

pub use instantly::InstantlyClient;

/// Counts the leads matching a filter set. Must be free of charge; the loop
/// may call it once per iteration.
#[async_trait]
pub trait LeadCounter: Send + Sync {
    async fn evaluate(&self, filters: &FilterSet) -> Result<u64, LeadLoopError>;
}

/// Which enrichment steps to run on the matched leads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentPayload {
    pub work_email_enrichment: bool,
    pub email_verification: bool,
    pub fully_enriched_profile: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub technologies: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub news: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub funding: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_flow: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_enrichment: Option<AiEnrichment>,
}

impl From<&EnrichConfig> for EnrichmentPayload {
    fn from(cfg: &EnrichConfig) -> Self {
        Self {
            work_email_enrichment: cfg.work_email_enrichment,
            email_verification: cfg.email_verification,
            fully_enriched_profile: cfg.fully_enriched_profile,
            technologies: cfg.technologies,
            news: cfg.news,
            funding: cfg.funding,
            custom_flow: cfg.custom_flow.clone(),
            ai_enrichment: cfg.ai_enrichment.clone(),
        }
    }
}

/// Body of an enrichment request. Spends credits.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichmentRequest {
    pub search_filters: FilterSet,
    pub limit: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_name: Option<String>,
    /// Existing list or campaign to add the leads to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrichment_payload: Option<EnrichmentPayload>,
}

/// Handle for a started enrichment job.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EnrichmentJob {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub resource_id: Option<String>,
    #[serde(default)]
    pub organization_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EnrichmentStatus {
    #[serde(default)]
    pub in_progress: bool,
    #[serde(default)]
    pub has_no_leads: bool,
    #[serde(default)]
    pub resource_type: Option<serde_json::Value>,
}
