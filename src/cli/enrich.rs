// src/cli/enrich.rs — Confirmation-gated enrichment

use std::path::Path;

use crate::core::controller::Confirmer;
use crate::core::cost::EnrichmentEstimate;
use crate::core::filters::FilterSet;
use crate::infra::config::{Config, EnrichConfig};
use crate::search::{EnrichmentJob, EnrichmentPayload, EnrichmentRequest, InstantlyClient};

pub struct EnrichOptions {
    pub limit: Option<u64>,
    pub list_name: Option<String>,
    pub resource_id: Option<String>,
    pub yes: bool,
}

pub async fn run_enrich(
    filters_path: &Path,
    opts: EnrichOptions,
    config: &Config,
    confirmer: &dyn Confirmer,
) -> anyhow::Result<()> {
    let filters = super::load_filters(filters_path)?;
    let client = InstantlyClient::from_config(&config.search)?;
    let count = client.preview(&filters).await?;
    offer_enrichment(&client, &filters, count, opts, &config.enrich, confirmer).await
}

/// Default list name: "Refined search - 1,234 leads (2026-10-16)".
pub fn default_list_name(count: u64) -> String {
    format!(
        "Refined search - {} leads ({})",
        crate::util::format_count(count),
        chrono::Local::now().format("%Y-%m-%d")
    )
}

/// Enrichment limit: the requested limit, never more than the estimate allows.
pub fn effective_limit(requested: Option<u64>, estimate: &EnrichmentEstimate) -> u64 {
    requested.map_or(estimate.limit, |r| r.min(estimate.limit))
}

/// Note shown when `enrich.max_limit` leaves part of the result set out.
pub fn cap_notice(estimate: &EnrichmentEstimate) -> Option<String> {
    estimate.is_capped().then(|| {
        format!(
            "Capped at {} of {} leads (enrich.max_limit)",
            crate::util::format_count(estimate.limit),
            crate::util::format_count(estimate.count)
        )
    })
}

pub fn build_request(
    filters: &FilterSet,
    limit: u64,
    list_name: Option<String>,
    resource_id: Option<String>,
    cfg: &EnrichConfig,
) -> EnrichmentRequest {
    EnrichmentRequest {
        search_filters: filters.clone(),
        limit,
        // An existing resource takes the leads; a list name only applies to new lists
        list_name: if resource_id.is_some() { None } else { list_name },
        resource_id,
        enrichment_payload: Some(EnrichmentPayload::from(cfg)),
    }
}

/// Show the estimate, confirm, start enrichment, and read its status once.
pub async fn offer_enrichment(
    client: &InstantlyClient,
    filters: &FilterSet,
    count: u64,
    opts: EnrichOptions,
    cfg: &EnrichConfig,
    confirmer: &dyn Confirmer,
) -> anyhow::Result<()> {
    if count == 0 {
        println!("No leads match these filters; nothing to enrich.");
        return Ok(());
    }

    let estimate = EnrichmentEstimate::for_count(count, cfg);
    println!("{}", estimate.summary());
    if let Some(notice) = cap_notice(&estimate) {
        println!("{}", notice);
    }
    let limit = effective_limit(opts.limit, &estimate);
    if limit == 0 {
        println!("Enrichment limit is 0; nothing to enrich.");
        return Ok(());
    }
    let limited = EnrichmentEstimate::for_count(limit, cfg);

    let prompt = format!(
        "Enrich {} leads for ~{} credits (${:.2})?",
        limit, limited.credits, limited.usd
    );
    if !opts.yes && !confirmer.ask(&prompt) {
        println!("Enrichment skipped.");
        return Ok(());
    }

    let list_name = opts.list_name.or_else(|| Some(default_list_name(count)));
    let request = build_request(filters, limit, list_name, opts.resource_id, cfg);
    let job = client.enrich(&request).await?;
    println!("{}", format_job(&job));

    if let Some(id) = job.resource_id.as_deref().or(job.id.as_deref()) {
        match client.enrichment_status(id).await {
            Ok(status) => println!("{}", super::status::format_status(id, &status)),
            Err(e) => eprintln!("Could not read enrichment status: {}", e),
        }
    }
    Ok(())
}

pub fn format_job(job: &EnrichmentJob) -> String {
    let mut line = String::from("Enrichment started");
    if let Some(ref id) = job.id {
        line.push_str(&format!(", job {}", id));
    }
    if let Some(ref rid) = job.resource_id {
        line.push_str(&format!(", resource {}", rid));
    }
    line
}
