// src/core/controller.rs — Evaluate, advise, apply refinement loop

use std::sync::Arc;
use std::time::Duration;

use tracing::Instrument;

use super::fallback::{evaluation_unavailable, manual_recommendation};
use super::filters::FilterSet;
use super::types::*;
use crate::advisor::{AdvisoryContext, FilterAdvisor};
use crate::infra::errors::LeadLoopError;
use crate::search::LeadCounter;

/// Yes/no gate in front of every state change the loop makes.
pub trait Confirmer: Send + Sync {
    fn ask(&self, prompt: &str) -> bool;

    /// Called when suggested edits are declined. `Some` replaces the current
    /// filters and the loop continues; `None` stops it.
    fn manual_filters(&self, current: &FilterSet) -> Option<FilterSet>;
}

/// Drives the refinement loop. Never enriches; only previews.
pub struct RefinementController {
    counter: Arc<dyn LeadCounter>,
    advisor: Option<Arc<dyn FilterAdvisor>>,
    confirmer: Arc<dyn Confirmer>,
    config: RefineConfig,
    on_progress: Option<Box<dyn Fn(RefineEvent) + Send + Sync>>,
}

/// Mutable loop state, owned by a single `run` call.
struct RunState {
    filters: FilterSet,
    evaluated_filters: FilterSet,
    last_count: Option<u64>,
    history: Vec<IterationRecord>,
    warnings: Vec<String>,
}

impl RunState {
    fn finish(self, reason: TerminalReason) -> FinalOutcome {
        FinalOutcome {
            filters: self.filters,
            evaluated_filters: self.evaluated_filters,
            last_count: self.last_count.unwrap_or(0),
            history: self.history,
            terminal_reason: reason,
            warnings: self.warnings,
        }
    }
}

impl RefinementController {
    pub fn new(
        counter: Arc<dyn LeadCounter>,
        advisor: Option<Arc<dyn FilterAdvisor>>,
        confirmer: Arc<dyn Confirmer>,
        config: RefineConfig,
    ) -> Self {
        Self {
            counter,
            advisor,
            confirmer,
            config,
            on_progress: None,
        }
    }

    /// Set a callback for progress events.
    pub fn with_progress(mut self, cb: impl Fn(RefineEvent) + Send + Sync + 'static) -> Self {
        self.on_progress = Some(Box::new(cb));
        self
    }

    fn emit(&self, event: RefineEvent) {
        if let Some(ref cb) = self.on_progress {
            cb(event);
        }
    }

    fn validate(&self) -> Result<(), LeadLoopError> {
        if self.config.max_iterations == 0 {
            return Err(LeadLoopError::Config(
                "max_iterations must be at least 1".into(),
            ));
        }
        if self.config.band.lower > self.config.band.upper {
            return Err(LeadLoopError::Config(format!(
                "lower bound {} exceeds upper bound {}",
                self.config.band.lower, self.config.band.upper
            )));
        }
        Ok(())
    }

    /// Run the loop from `initial` toward `goal`.
    ///
    /// Only invalid configuration is an error. Collaborator failures degrade
    /// to the manual rule, and running out of iterations is a terminal state.
    pub async fn run(&self, initial: FilterSet, goal: &str) -> Result<FinalOutcome, LeadLoopError> {
        self.validate()?;

        let span = tracing::info_span!(
            "refine",
            run_id = %uuid::Uuid::new_v4(),
            max_iterations = self.config.max_iterations,
        );

        let outcome = self.run_loop(initial, goal).instrument(span).await;

        self.emit(RefineEvent::Complete {
            iterations: outcome.iterations(),
            last_count: outcome.last_count,
            reason: outcome.terminal_reason,
        });
        Ok(outcome)
    }

    async fn run_loop(&self, initial: FilterSet, goal: &str) -> FinalOutcome {
        let max = self.config.max_iterations;
        let band = self.config.band;
        let mut state = RunState {
            evaluated_filters: initial.clone(),
            filters: initial,
            last_count: None,
            history: Vec::new(),
            warnings: Vec::new(),
        };

        for i in 1..=max {
            self.emit(RefineEvent::IterationStart {
                iteration: i,
                max_iterations: max,
            });

            // 1. Evaluate
            let rec = match self.evaluate(&state.filters).await {
                Ok(count) => {
                    state.last_count = Some(count);
                    state.evaluated_filters = state.filters.clone();
                    state.history.push(IterationRecord {
                        index: i,
                        count,
                        evaluated: true,
                    });
                    tracing::info!(iteration = i, count, "Preview complete");
                    self.emit(RefineEvent::Evaluated {
                        iteration: i,
                        count,
                        status: band.classify(count),
                    });

                    // 2. Advise
                    let ctx = AdvisoryContext {
                        goal,
                        filters: &state.filters,
                        count,
                        iteration: i,
                        max_iterations: max,
                        history: &state.history,
                        band,
                    };
                    let (rec, failure) = self.advise(&ctx).await;
                    if let Some(reason) = failure {
                        state
                            .warnings
                            .push(format!("iteration {}: advisor unavailable: {}", i, reason));
                    }
                    rec
                }
                Err(e) => {
                    tracing::warn!(iteration = i, "Preview failed: {}", e);
                    state.history.push(IterationRecord {
                        index: i,
                        count: state.last_count.unwrap_or(0),
                        evaluated: false,
                    });
                    state.warnings.push(format!("iteration {}: {}", i, e));
                    self.emit(RefineEvent::EvaluationFailed {
                        iteration: i,
                        error: e.to_string(),
                    });
                    match state.last_count {
                        Some(count) => manual_recommendation(count, &band),
                        None => evaluation_unavailable(),
                    }
                }
            };

            state.warnings.extend(
                rec.warnings
                    .iter()
                    .map(|w| format!("iteration {}: advisor reply: {}", i, w)),
            );
            tracing::info!(
                iteration = i,
                verdict = %rec.verdict,
                confidence = %rec.confidence,
                edits = rec.edits.len(),
                "Recommendation"
            );
            self.emit(RefineEvent::Advice {
                iteration: i,
                verdict: rec.verdict,
                confidence: rec.confidence,
                source: rec.source,
                status: rec.status,
                edits: rec.edits.clone(),
                reasoning: rec.reasoning.clone(),
                estimated_impact: rec.estimated_impact.clone(),
            });

            // 3-4. Terminal verdicts
            match rec.verdict {
                Verdict::Proceed => return state.finish(TerminalReason::TargetReached),
                Verdict::Pivot => {
                    let prompt = if rec.reasoning.is_empty() {
                        "The advisor suggests a different approach. Continue refining anyway?"
                            .to_string()
                    } else {
                        format!(
                            "The advisor suggests a different approach ({}). Continue refining anyway?",
                            rec.reasoning
                        )
                    };
                    if !self.confirmer.ask(&prompt) {
                        return state.finish(TerminalReason::AdvisorPivotDeclined);
                    }
                }
                Verdict::Refine => {}
            }

            // 5. Apply
            if rec.edits.is_empty() {
                let message = format!(
                    "{} advice has no concrete edits; filters unchanged",
                    rec.verdict
                );
                tracing::warn!(iteration = i, "{}", message);
                state.warnings.push(format!("iteration {}: {}", i, message));
                self.emit(RefineEvent::NoProgress {
                    iteration: i,
                    message,
                });
                continue;
            }

            let listed = rec
                .edits
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            let prompt = format!("Apply {} suggested edit(s): {}?", rec.edits.len(), listed);
            if self.confirmer.ask(&prompt) {
                let edit_warnings = state.filters.apply_edits(&rec.edits);
                let skipped = edit_warnings.iter().filter(|w| w.issue.is_rejection()).count();
                for warning in edit_warnings {
                    state.warnings.push(format!("iteration {}: {}", i, warning));
                    if warning.issue.is_rejection() {
                        self.emit(RefineEvent::EditRejected {
                            iteration: i,
                            warning,
                        });
                    }
                }
                self.emit(RefineEvent::EditsApplied {
                    iteration: i,
                    applied: rec.edits.len() - skipped,
                    skipped,
                });
            } else {
                match self.confirmer.manual_filters(&state.filters) {
                    Some(replacement) => {
                        tracing::info!(iteration = i, "Filters replaced manually");
                        state.filters = replacement;
                    }
                    None => return state.finish(TerminalReason::UserDeclined),
                }
            }
        }

        tracing::info!(max_iterations = max, "Iteration budget exhausted");
        state.finish(TerminalReason::Exhausted)
    }

    /// Preview under the configured timeout. A timeout is an evaluation failure.
    async fn evaluate(&self, filters: &FilterSet) -> Result<u64, LeadLoopError> {
        let limit = self.config.evaluate_timeout;
        match tokio::time::timeout(limit, self.counter.evaluate(filters)).await {
            Ok(result) => result,
            Err(_) => Err(LeadLoopError::Evaluation {
                status: None,
                message: format!("timed out after {}", fmt_duration(limit)),
            }),
        }
    }

    /// Ask the advisor, falling back to the manual rule. The second element
    /// carries the failure reason when the advisor could not be used.
    async fn advise(&self, ctx: &AdvisoryContext<'_>) -> (Recommendation, Option<String>) {
        let Some(ref advisor) = self.advisor else {
            return (manual_recommendation(ctx.count, &ctx.band), None);
        };

        let limit = self.config.advise_timeout;
        let failure = match tokio::time::timeout(limit, advisor.recommend(ctx)).await {
            Ok(Ok(rec)) => return (rec, None),
            Ok(Err(e)) => e.to_string(),
            Err(_) => format!("timed out after {}", fmt_duration(limit)),
        };

        tracing::warn!(iteration = ctx.iteration, "Advisor failed, using manual rule: {}", failure);
        self.emit(RefineEvent::AdvisorUnavailable {
            iteration: ctx.iteration,
            reason: failure.clone(),
        });
        (manual_recommendation(ctx.count, &ctx.band), Some(failure))
    }
}

fn fmt_duration(d: Duration) -> String {
    if d.subsec_millis() == 0 {
        format!("{}s", d.as_secs())
    } else {
        format!("{}ms", d.as_millis())
    }
}
