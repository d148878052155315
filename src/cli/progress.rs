// src/cli/progress.rs — Terminal renderer for refinement progress

use crate::core::types::{RecommendationSource, RefineEvent};
use crate::util::format_count;

/// Progress output for an event; advice spans one line per suggested edit.
pub fn render(event: &RefineEvent) -> String {
    match event {
        RefineEvent::IterationStart {
            iteration,
            max_iterations,
        } => format!("[iter {}/{}] previewing...", iteration, max_iterations),
        RefineEvent::Evaluated {
            iteration,
            count,
            status,
        } => format!(
            "[iter {}] {} leads ({})",
            iteration,
            format_count(*count),
            status
        ),
        RefineEvent::EvaluationFailed { iteration, error } => {
            format!("[iter {}] preview failed: {}", iteration, error)
        }
        RefineEvent::Advice {
            iteration,
            verdict,
            confidence,
            source,
            status,
            edits,
            reasoning,
            estimated_impact,
        } => {
            let from = match source {
                RecommendationSource::Advisor => "advisor",
                RecommendationSource::ManualFallback => "manual rule",
            };
            let mut line = format!(
                "[iter {}] {}: {} ({} confidence, {} edit(s))",
                iteration,
                from,
                verdict,
                confidence,
                edits.len()
            );
            if !reasoning.is_empty() {
                line.push_str(" - ");
                line.push_str(reasoning);
            }
            if let (RecommendationSource::Advisor, Some(status)) = (source, status) {
                line.push_str(&format!(
                    "\n[iter {}]   advisor reads count as {}",
                    iteration, status
                ));
            }
            for (n, edit) in edits.iter().enumerate() {
                line.push_str(&format!("\n[iter {}]   {}. {}", iteration, n + 1, edit));
                if let Some(why) = &edit.rationale {
                    line.push_str(" - ");
                    line.push_str(why);
                }
            }
            if let Some(impact) = estimated_impact {
                line.push_str(&format!("\n[iter {}]   expected impact: {}", iteration, impact));
            }
            line
        }
        RefineEvent::AdvisorUnavailable { iteration, reason } => {
            format!("[iter {}] advisor unavailable: {}", iteration, reason)
        }
        RefineEvent::EditsApplied {
            iteration,
            applied,
            skipped,
        } => {
            if *skipped == 0 {
                format!("[iter {}] applied {} edit(s)", iteration, applied)
            } else {
                format!(
                    "[iter {}] applied {} edit(s), skipped {}",
                    iteration, applied, skipped
                )
            }
        }
        RefineEvent::EditRejected { iteration, warning } => {
            format!("[iter {}]   {}", iteration, warning)
        }
        RefineEvent::NoProgress { iteration, message } => {
            format!("[iter {}] warning: {}", iteration, message)
        }
        RefineEvent::Complete {
            iterations,
            last_count,
            reason,
        } => format!(
            "[done] {} after {} iteration(s), {} leads",
            reason,
            iterations,
            format_count(*last_count)
        ),
    }
}

/// Progress callback writing to stderr, so stdout stays clean for results.
pub fn terminal_progress() -> impl Fn(RefineEvent) + Send + Sync + 'static {
    |event| eprintln!("{}", render(&event))
}
