// src/cli/suggest.rs — Draft filters from a description

use crate::advisor::LlmAdvisor;
use crate::core::filters::category_hint;
use crate::infra::config::Config;

pub async fn run_suggest(description: &str, config: &Config) -> anyhow::Result<()> {
    let advisor = LlmAdvisor::from_config(&config.advisor)?;
    let filters = advisor.draft_filters(description).await?;

    if filters.is_empty() {
        eprintln!("The advisor did not suggest any usable filters.");
    }
    for category in filters.categories() {
        if let Some(hint) = category_hint(category) {
            eprintln!("note: {}: {}", category, hint);
        }
    }
    println!("{}", filters.to_pretty_json());
    Ok(())
}
