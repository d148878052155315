// src/infra/config.rs — Configuration loading (TOML)

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::infra::errors::LeadLoopError;
use crate::infra::paths;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub advisor: AdvisorConfig,

    #[serde(default)]
    pub refine: RefineSettings,

    #[serde(default)]
    pub enrich: EnrichConfig,
}

/// Lead provider connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub base_url: String,
    pub api_key_env: String,
    /// Inline key; takes precedence over `api_key_env`.
    pub api_key: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.instantly.ai/api/v2".into(),
            api_key_env: "INSTANTLY_API_KEY".into(),
            api_key: None,
            timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisorConfig {
    pub enabled: bool,
    pub model: String,
    pub api_key_env: String,
    pub api_key: Option<String>,
    pub max_tokens: u32,
    pub timeout_seconds: u64,
    pub max_retries: u32,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: "claude-sonnet-4-20250514".into(),
            api_key_env: "ANTHROPIC_API_KEY".into(),
            api_key: None,
            max_tokens: 2000,
            timeout_seconds: 60,
            max_retries: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RefineSettings {
    pub max_iterations: u32,
    pub lower_bound: u64,
    pub upper_bound: u64,
}

impl Default for RefineSettings {
    fn default() -> Self {
        Self {
            max_iterations: 5,
            lower_bound: 500,
            upper_bound: 2000,
        }
    }
}

/// Enrichment pricing and payload toggles.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichConfig {
    pub max_limit: u64,
    pub credits_per_lead: f64,
    pub usd_per_credit: f64,
    pub work_email_enrichment: bool,
    pub email_verification: bool,
    pub fully_enriched_profile: bool,
    pub technologies: bool,
    pub news: bool,
    pub funding: bool,
    pub custom_flow: Vec<String>,
    /// Model-written column added to every enriched lead.
    pub ai_enrichment: Option<AiEnrichment>,
}

/// `[enrich.ai_enrichment]`: prompt template over lead columns, written to
/// `output_column`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiEnrichment {
    pub model_version: String,
    pub prompt: String,
    pub output_column: String,
    #[serde(default)]
    pub input_columns: Vec<String>,
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            max_limit: 1000,
            credits_per_lead: 1.5,
            // $9 per 2000 credits
            usd_per_credit: 0.0045,
            work_email_enrichment: true,
            email_verification: true,
            fully_enriched_profile: true,
            technologies: false,
            news: false,
            funding: false,
            custom_flow: vec!["instantly".into()],
            ai_enrichment: None,
        }
    }
}

/// Inline key first, then the named environment variable. Blank values count
/// as unset.
fn resolve_key(inline: &Option<String>, env_name: &str) -> Option<String> {
    inline
        .clone()
        .or_else(|| std::env::var(env_name).ok())
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
}

impl SearchConfig {
    pub fn resolve_api_key(&self) -> Option<String> {
        resolve_key(&self.api_key, &self.api_key_env)
    }
}

impl AdvisorConfig {
    pub fn resolve_api_key(&self) -> Option<String> {
        resolve_key(&self.api_key, &self.api_key_env)
    }
}

impl Config {
    /// Load config from `explicit`, else the default location, falling back
    /// to defaults when the default file does not exist.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }
        let path = paths::config_file_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        tracing::debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), LeadLoopError> {
        if self.refine.max_iterations == 0 {
            return Err(LeadLoopError::Config(
                "refine.max_iterations must be at least 1".into(),
            ));
        }
        if self.refine.lower_bound > self.refine.upper_bound {
            return Err(LeadLoopError::Config(format!(
                "refine.lower_bound ({}) exceeds refine.upper_bound ({})",
                self.refine.lower_bound, self.refine.upper_bound
            )));
        }
        url::Url::parse(&self.search.base_url).map_err(|e| {
            LeadLoopError::Config(format!(
                "search.base_url '{}' is not a valid URL: {}",
                self.search.base_url, e
            ))
        })?;
        Ok(())
    }
}
