// src/advisor/mod.rs — Filter advisor abstraction

pub mod llm;
pub mod parser;
pub mod prompt;

use async_trait::async_trait;

use crate::core::filters::FilterSet;
use crate::core::types::{IterationRecord, Recommendation, TargetBand};
use crate::infra::errors::LeadLoopError;

pub use llm::LlmAdvisor;

/// Everything an advisor sees for one iteration.
#[derive(Debug, Clone)]
pub struct AdvisoryContext<'a> {
    pub goal: &'a str,
    pub filters: &'a FilterSet,
    pub count: u64,
    /// 1-based.
    pub iteration: u32,
    pub max_iterations: u32,
    /// Includes the record for the current iteration.
    pub history: &'a [IterationRecord],
    pub band: TargetBand,
}

/// Suggests the next step for a filter set given its lead count.
#[async_trait]
pub trait FilterAdvisor: Send + Sync {
    async fn recommend(&self, ctx: &AdvisoryContext<'_>) -> Result<Recommendation, LeadLoopError>;
}
