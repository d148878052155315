// src/cli/refine.rs — The `refine` command: loop, summary, enrichment offer

use std::sync::Arc;

use super::confirm::TerminalConfirmer;
use super::enrich::{offer_enrichment, EnrichOptions};
use super::progress::terminal_progress;
use super::RefineArgs;
use crate::advisor::{FilterAdvisor, LlmAdvisor};
use crate::core::controller::{Confirmer, RefinementController};
use crate::core::types::{FinalOutcome, RefineConfig, TerminalReason};
use crate::infra::config::Config;
use crate::infra::errors::LeadLoopError;
use crate::search::InstantlyClient;
use crate::util::format_count;

/// Fold command-line overrides into the loaded config.
pub fn apply_overrides(config: &Config, args: &RefineArgs) -> Config {
    let mut config = config.clone();
    if let Some(n) = args.max_iterations {
        config.refine.max_iterations = n;
    }
    if let Some(lower) = args.lower {
        config.refine.lower_bound = lower;
    }
    if let Some(upper) = args.upper {
        config.refine.upper_bound = upper;
    }
    if args.no_advisor {
        config.advisor.enabled = false;
    }
    config
}

pub async fn run_refine(args: RefineArgs, config: &Config) -> anyhow::Result<()> {
    let config = apply_overrides(config, &args);
    config.validate()?;

    let client = Arc::new(InstantlyClient::from_config(&config.search)?);

    let llm = if config.advisor.enabled {
        match LlmAdvisor::from_config(&config.advisor) {
            Ok(advisor) => Some(Arc::new(advisor)),
            Err(LeadLoopError::NoProvider) => {
                eprintln!(
                    "[advisor] no {} set; using the manual count rule",
                    config.advisor.api_key_env
                );
                None
            }
            Err(e) => return Err(e.into()),
        }
    } else {
        None
    };

    let initial = match (&args.filters, &args.describe) {
        (Some(path), _) => super::load_filters(path)?,
        (None, Some(description)) => {
            let advisor = llm.as_ref().ok_or_else(|| {
                anyhow::anyhow!("--describe needs the advisor; pass --filters instead")
            })?;
            let drafted = advisor.draft_filters(description).await?;
            eprintln!("Drafted filters:\n{}", drafted.to_pretty_json());
            drafted
        }
        (None, None) => anyhow::bail!("pass --filters or --describe"),
    };

    let goal = args
        .goal
        .clone()
        .or_else(|| args.describe.clone())
        .ok_or_else(|| anyhow::anyhow!("--goal is required with --filters"))?;

    let confirmer = Arc::new(TerminalConfirmer);
    let advisor = llm.map(|a| a as Arc<dyn FilterAdvisor>);
    let mut controller = RefinementController::new(
        client.clone(),
        advisor,
        confirmer.clone(),
        RefineConfig::from(&config),
    );
    if !args.quiet {
        controller = controller.with_progress(terminal_progress());
    }

    let outcome = controller.run(initial, &goal).await?;
    println!("{}", format_summary(&outcome));

    if let Some(ref path) = args.save {
        std::fs::write(path, outcome.filters.to_pretty_json())?;
        eprintln!("Saved final filters to {}", path.display());
    }

    if !matches!(
        outcome.terminal_reason,
        TerminalReason::TargetReached | TerminalReason::Exhausted
    ) {
        return Ok(());
    }

    // Edits applied on the last iteration have never been previewed
    let count = if outcome.needs_reevaluation() {
        match client.preview(&outcome.filters).await {
            Ok(count) => {
                println!("Final filters preview: {} leads", format_count(count));
                count
            }
            Err(e) => {
                eprintln!("Could not preview the final filters ({}); skipping enrichment.", e);
                return Ok(());
            }
        }
    } else {
        outcome.last_count
    };

    offer_enrichment(
        &client,
        &outcome.filters,
        count,
        EnrichOptions {
            limit: None,
            list_name: args.list_name.clone(),
            resource_id: None,
            yes: false,
        },
        &config.enrich,
        confirmer.as_ref() as &dyn Confirmer,
    )
    .await
}

/// Human-readable run summary.
pub fn format_summary(outcome: &FinalOutcome) -> String {
    let history = outcome
        .history
        .iter()
        .map(|r| {
            if r.evaluated {
                format_count(r.count)
            } else {
                format!("{}?", format_count(r.count))
            }
        })
        .collect::<Vec<_>>()
        .join(" -> ");

    let mut out = format!(
        "Refinement finished: {}\nIterations: {}\nFinal count: {}\nCount history: {}\nFinal filters:\n{}",
        outcome.terminal_reason,
        outcome.iterations(),
        format_count(outcome.last_count),
        history,
        outcome.filters.to_pretty_json()
    );
    if !outcome.warnings.is_empty() {
        out.push_str("\nWarnings:");
        for w in &outcome.warnings {
            out.push_str("\n  - ");
            out.push_str(w);
        }
    }
    out
}
