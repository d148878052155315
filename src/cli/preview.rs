// src/cli/preview.rs — One-shot lead count

use std::path::Path;

use crate::core::cost::EnrichmentEstimate;
use crate::core::types::TargetBand;
use crate::infra::config::Config;
use crate::search::InstantlyClient;
use crate::util::format_count;

pub async fn run_preview(filters_path: &Path, config: &Config) -> anyhow::Result<()> {
    let filters = super::load_filters(filters_path)?;
    let client = InstantlyClient::from_config(&config.search)?;
    let count = client.preview(&filters).await?;

    let band = TargetBand::new(config.refine.lower_bound, config.refine.upper_bound);
    println!(
        "{} leads ({} for target {})",
        format_count(count),
        band.classify(count),
        band
    );
    println!(
        "{}",
        EnrichmentEstimate::for_count(count, &config.enrich).summary()
    );
    Ok(())
}
