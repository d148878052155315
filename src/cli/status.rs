// src/cli/status.rs — Enrichment job status

use crate::infra::config::Config;
use crate::search::{EnrichmentStatus, InstantlyClient};

pub async fn run_status(resource_id: &str, config: &Config) -> anyhow::Result<()> {
    let client = InstantlyClient::from_config(&config.search)?;
    let status = client.enrichment_status(resource_id).await?;
    println!("{}", format_status(resource_id, &status));
    Ok(())
}

pub fn format_status(resource_id: &str, status: &EnrichmentStatus) -> String {
    let state = if status.in_progress {
        "in progress"
    } else {
        "finished"
    };
    let leads = if status.has_no_leads {
        "no leads"
    } else {
        "has leads"
    };
    let mut line = format!("Enrichment {}: {}, {}", resource_id, state, leads);
    if let Some(ref kind) = status.resource_type {
        match kind.as_str() {
            Some(s) => line.push_str(&format!(" (resource type {})", s)),
            None => line.push_str(&format!(" (resource type {})", kind)),
        }
    }
    line
}
