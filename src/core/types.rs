// src/core/types.rs — Core domain types

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::filters::{Edit, EditWarning, FilterSet};

/// What the advisor thinks should happen next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Proceed,
    Refine,
    Pivot,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Proceed => write!(f, "proceed"),
            Verdict::Refine => write!(f, "refine"),
            Verdict::Pivot => write!(f, "pivot"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    #[default]
    Medium,
    Low,
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Confidence::High => write!(f, "high"),
            Confidence::Medium => write!(f, "medium"),
            Confidence::Low => write!(f, "low"),
        }
    }
}

/// Where a count sits relative to the target band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountStatus {
    Optimal,
    TooMany,
    TooFew,
}

impl std::fmt::Display for CountStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CountStatus::Optimal => write!(f, "optimal"),
            CountStatus::TooMany => write!(f, "too_many"),
            CountStatus::TooFew => write!(f, "too_few"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationSource {
    Advisor,
    ManualFallback,
}

/// Advice for one iteration. Produced fresh each time and never retained.
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub verdict: Verdict,
    pub edits: Vec<Edit>,
    pub confidence: Confidence,
    pub reasoning: String,
    pub status: Option<CountStatus>,
    pub estimated_impact: Option<String>,
    pub source: RecommendationSource,
    /// Parse-time problems (e.g. suggested changes that could not be read).
    pub warnings: Vec<String>,
}

impl Recommendation {
    pub fn manual(verdict: Verdict, status: Option<CountStatus>, reasoning: impl Into<String>) -> Self {
        Self {
            verdict,
            edits: Vec::new(),
            confidence: Confidence::Medium,
            reasoning: reasoning.into(),
            status,
            estimated_impact: None,
            source: RecommendationSource::ManualFallback,
            warnings: Vec::new(),
        }
    }
}

/// Inclusive target range for the lead count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetBand {
    pub lower: u64,
    pub upper: u64,
}

impl Default for TargetBand {
    fn default() -> Self {
        Self {
            lower: 500,
            upper: 2000,
        }
    }
}

impl TargetBand {
    pub fn new(lower: u64, upper: u64) -> Self {
        Self { lower, upper }
    }

    pub fn classify(&self, count: u64) -> CountStatus {
        if count > self.upper {
            CountStatus::TooMany
        } else if count < self.lower {
            CountStatus::TooFew
        } else {
            CountStatus::Optimal
        }
    }
}

impl std::fmt::Display for TargetBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.lower, self.upper)
    }
}

/// One loop iteration. Appended once, never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IterationRecord {
    /// 1-based.
    pub index: u32,
    pub count: u64,
    /// False when the preview failed; `count` then carries the last known value.
    pub evaluated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalReason {
    TargetReached,
    UserDeclined,
    AdvisorPivotDeclined,
    Exhausted,
}

impl std::fmt::Display for TerminalReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TerminalReason::TargetReached => write!(f, "target_reached"),
            TerminalReason::UserDeclined => write!(f, "user_declined"),
            TerminalReason::AdvisorPivotDeclined => write!(f, "advisor_pivot_declined"),
            TerminalReason::Exhausted => write!(f, "exhausted"),
        }
    }
}

/// Result of a refinement run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinalOutcome {
    pub filters: FilterSet,
    /// The filter set that produced `last_count`.
    pub evaluated_filters: FilterSet,
    pub last_count: u64,
    pub history: Vec<IterationRecord>,
    pub terminal_reason: TerminalReason,
    pub warnings: Vec<String>,
}

impl FinalOutcome {
    pub fn iterations(&self) -> usize {
        self.history.len()
    }

    pub fn counts(&self) -> Vec<u64> {
        self.history.iter().map(|r| r.count).collect()
    }

    /// Edits were applied after the last successful preview.
    pub fn needs_reevaluation(&self) -> bool {
        self.filters != self.evaluated_filters
    }
}

/// Configuration for the refinement loop.
#[derive(Debug, Clone)]
pub struct RefineConfig {
    pub max_iterations: u32,
    pub band: TargetBand,
    pub evaluate_timeout: Duration,
    pub advise_timeout: Duration,
}

impl Default for RefineConfig {
    fn default() -> Self {
        Self {
            max_iterations: 5,
            band: TargetBand::default(),
            evaluate_timeout: Duration::from_secs(30),
            advise_timeout: Duration::from_secs(60),
        }
    }
}

impl From<&crate::infra::config::Config> for RefineConfig {
    fn from(cfg: &crate::infra::config::Config) -> Self {
        Self {
            max_iterations: cfg.refine.max_iterations,
            band: TargetBand::new(cfg.refine.lower_bound, cfg.refine.upper_bound),
            evaluate_timeout: Duration::from_secs(cfg.search.timeout_seconds),
            advise_timeout: Duration::from_secs(cfg.advisor.timeout_seconds),
        }
    }
}

/// Progress events emitted by the controller at each lifecycle transition.
#[derive(Debug, Clone)]
pub enum RefineEvent {
    IterationStart {
        iteration: u32,
        max_iterations: u32,
    },
    Evaluated {
        iteration: u32,
        count: u64,
        status: CountStatus,
    },
    EvaluationFailed {
        iteration: u32,
        error: String,
    },
    Advice {
        iteration: u32,
        verdict: Verdict,
        confidence: Confidence,
        source: RecommendationSource,
        /// Advisor's own reading of the count; not repeated for the manual rule.
        status: Option<CountStatus>,
        edits: Vec<Edit>,
        reasoning: String,
        estimated_impact: Option<String>,
    },
    AdvisorUnavailable {
        iteration: u32,
        reason: String,
    },
    EditsApplied {
        iteration: u32,
        applied: usize,
        skipped: usize,
    },
    EditRejected {
        iteration: u32,
        warning: EditWarning,
    },
    NoProgress {
        iteration: u32,
        message: String,
    },
    Complete {
        iterations: usize,
        last_count: u64,
        reason: TerminalReason,
    },
}
