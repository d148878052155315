// src/core/cost.rs — Enrichment credit and dollar estimates

use crate::infra::config::EnrichConfig;

/// What enriching a lead count would cost.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnrichmentEstimate {
    pub count: u64,
    pub credits: u64,
    pub usd: f64,
    /// Leads that would actually be enriched (capped at `max_limit`).
    pub limit: u64,
}

impl EnrichmentEstimate {
    pub fn for_count(count: u64, cfg: &EnrichConfig) -> Self {
        let credits = (count as f64 * cfg.credits_per_lead).floor() as u64;
        Self {
            count,
            credits,
            usd: credits as f64 * cfg.usd_per_credit,
            limit: count.min(cfg.max_limit),
        }
    }

    /// Whether the enrichment cap cuts off part of the result set.
    pub fn is_capped(&self) -> bool {
        self.limit < self.count
    }

    pub fn summary(&self) -> String {
        format!(
            "~{} credits (${:.2}) for {} leads, enrichment limit {}",
            self.credits, self.usd, self.count, self.limit
        )
    }
}
