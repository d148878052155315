// src/infra/errors.rs — Error types for leadloop

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LeadLoopError {
    // Lead provider errors
    #[error("Lead preview failed{}: {message}", status_suffix(.status))]
    Evaluation {
        status: Option<u16>,
        message: String,
    },

    #[error("Enrichment request failed{}: {message}", status_suffix(.status))]
    Enrichment {
        status: Option<u16>,
        message: String,
    },

    // Advisor errors (degrade to the manual rule)
    #[error("Could not parse advisor reply: {message}")]
    AdvisoryParse { message: String },

    #[error("Provider '{provider}' error: {message}")]
    Provider {
        provider: String,
        message: String,
        retriable: bool,
    },

    #[error("Rate limited by '{provider}', retry after {retry_after_ms}ms")]
    RateLimited {
        provider: String,
        retry_after_ms: u64,
    },

    // User errors
    #[error("No advisor provider configured. Set ANTHROPIC_API_KEY or pass --no-advisor.")]
    NoProvider,

    #[error("Invalid filters: {0}")]
    InvalidFilters(String),

    // Infra
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

impl LeadLoopError {
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            LeadLoopError::Provider {
                retriable: true,
                ..
            } | LeadLoopError::RateLimited { .. }
        )
    }

    /// Build an evaluation error from a transport failure.
    pub fn evaluation(err: reqwest::Error) -> Self {
        LeadLoopError::Evaluation {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }

    /// Build an enrichment error from a transport failure.
    pub fn enrichment(err: reqwest::Error) -> Self {
        LeadLoopError::Enrichment {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}
