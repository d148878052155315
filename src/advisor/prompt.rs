// src/advisor/prompt.rs — Prompt templates for the advisor

use minijinja::{context, Environment};
use serde::Serialize;

use super::AdvisoryContext;
use crate::core::filters::KNOWN_CATEGORIES;
use crate::infra::errors::LeadLoopError;
use crate::util::format_count;

const ADVISE_TEMPLATE: &str = r#"You are helping refine a B2B lead search.

GOAL: {{ goal }}

TARGET RANGE: {{ lower }}-{{ upper }} leads (a manageable enrichment batch)

CURRENT STATUS:
- Iteration: {{ iteration }} of {{ max_iterations }}
- Current count: {{ count }} leads
- Count history:
{% for r in history %}  Iteration {{ r.index }}: {{ r.count }} leads{% if not r.evaluated %} (preview failed, last known count){% endif %}
{% endfor %}
CURRENT FILTERS:
{{ filters }}

AVAILABLE ADJUSTMENTS:
- company_size and revenue_range: {"min": N, "max": N}
- industries, technologies, keywords, departments, management_levels, funding_type, funding_stage: lists
- job_titles and locations: {"include": [...], "exclude": [...]}
Known filter names: {{ categories }}

ANALYSIS NEEDED:
1. Is {{ count }} leads inside the target range?
2. If not, which single adjustment has the most impact?
3. Are we converging on the goal, or should the search pivot?

Respond ONLY with valid JSON:
{
  "status": "optimal|too_many|too_few",
  "recommendation": "proceed|refine|pivot",
  "reasoning": "one sentence",
  "suggested_changes": [
    {"filter": "company_size", "action": "set|add|remove", "value": {"min": 20, "max": 150}, "rationale": "why this helps"}
  ],
  "estimated_impact": "expected effect on the count",
  "confidence": "high|medium|low"
}"#;

const DRAFT_TEMPLATE: &str = r#"Convert this description of a target audience into lead search filters:

"{{ description }}"

Filter formats:
- locations: {"include": [{"country": "US", "state": "CO"}], "exclude": []}
- job_titles: {"include": ["CEO", "Chief Executive Officer"], "exclude": []}
- departments: ["executive", "sales", "marketing", "engineering", "operations"]
- management_levels: ["c_level", "vp", "director", "manager"]
- industries: ["Technology", "SaaS", "Healthcare"]
- company_size: {"min": 10, "max": 500}
- revenue_range: {"min": 1000000, "max": 50000000}
- technologies: ["Salesforce", "HubSpot"]
- keywords: ["hiring", "recently funded"]

Respond ONLY with a JSON object of filters. Include only filters that are clearly relevant."#;

#[derive(Serialize)]
struct HistoryLine {
    index: u32,
    count: String,
    evaluated: bool,
}

fn environment() -> Result<Environment<'static>, LeadLoopError> {
    let mut env = Environment::new();
    env.add_template("advise", ADVISE_TEMPLATE)
        .map_err(|e| LeadLoopError::Other(e.into()))?;
    env.add_template("draft", DRAFT_TEMPLATE)
        .map_err(|e| LeadLoopError::Other(e.into()))?;
    Ok(env)
}

pub fn render_advice_prompt(ctx: &AdvisoryContext<'_>) -> Result<String, LeadLoopError> {
    let history: Vec<HistoryLine> = ctx
        .history
        .iter()
        .map(|r| HistoryLine {
            index: r.index,
            count: format_count(r.count),
            evaluated: r.evaluated,
        })
        .collect();

    let env = environment()?;
    let tmpl = env
        .get_template("advise")
        .map_err(|e| LeadLoopError::Other(e.into()))?;
    tmpl.render(context! {
        goal => ctx.goal,
        lower => format_count(ctx.band.lower),
        upper => format_count(ctx.band.upper),
        iteration => ctx.iteration,
        max_iterations => ctx.max_iterations,
        count => format_count(ctx.count),
        history => history,
        filters => ctx.filters.to_pretty_json(),
        categories => KNOWN_CATEGORIES.join(", "),
    })
    .map_err(|e| LeadLoopError::Other(e.into()))
}

pub fn render_draft_prompt(description: &str) -> Result<String, LeadLoopError> {
    let env = environment()?;
    let tmpl = env
        .get_template("draft")
        .map_err(|e| LeadLoopError::Other(e.into()))?;
    tmpl.render(context! { description => description.trim() })
        .map_err(|e| LeadLoopError::Other(e.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::filters::FilterSet;
    use crate::core::types::{IterationRecord, TargetBand};

    #[test]
    fn test_advice_prompt_sections() {
        let filters = FilterSet::from_json_str(r#"{"industries": ["SaaS"]}"#).unwrap();
        let history = [
            IterationRecord {
                index: 1,
                count: 12_400,
                evaluated: true,
            },
            IterationRecord {
                index: 2,
                count: 12_400,
                evaluated: false,
            },
        ];
        let ctx = AdvisoryContext {
            goal: "Colorado SaaS founders",
            filters: &filters,
            count: 12_400,
            iteration: 2,
            max_iterations: 5,
            history: &history,
            band: TargetBand::default(),
        };
        let prompt = render_advice_prompt(&ctx).unwrap();

        assert!(prompt.contains("GOAL: Colorado SaaS founders"));
        assert!(prompt.contains("TARGET RANGE: 500-2,000 leads"));
        assert!(prompt.contains("Iteration: 2 of 5"));
        assert!(prompt.contains("Current count: 12,400 leads"));
        assert!(prompt.contains("Iteration 1: 12,400 leads\n"));
        assert!(prompt.contains("Iteration 2: 12,400 leads (preview failed"));
        assert!(prompt.contains("\"industries\""));
        assert!(prompt.contains("Respond ONLY with valid JSON"));
        assert!(prompt.contains("funding_stage"));
    }

    #[test]
    fn test_draft_prompt_quotes_description() {
        let prompt = render_draft_prompt("  CTOs at fintech startups in Berlin ").unwrap();
        assert!(prompt.contains("\"CTOs at fintech startups in Berlin\""));
        assert!(prompt.contains("company_size"));
    }
}
