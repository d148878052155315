// src/cli/mod.rs — CLI definition (clap derive)

pub mod confirm;
pub mod enrich;
pub mod preview;
pub mod progress;
pub mod refine;
pub mod status;
pub mod suggest;

use clap::{ArgGroup, Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::core::filters::FilterSet;

#[derive(Parser)]
#[command(
    name = "leadloop",
    about = "Preview, refine, and enrich lead searches",
    version
)]
pub struct Cli {
    /// Config file path (default: ~/.leadloop/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// More log output (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Iteratively refine a filter set toward a target lead count
    Refine(RefineArgs),
    /// Show the lead count and enrichment estimate for a filter set
    Preview {
        /// JSON file with search filters
        #[arg(long)]
        filters: PathBuf,
    },
    /// Enrich the leads matching a filter set (spends credits)
    Enrich {
        /// JSON file with search filters
        #[arg(long)]
        filters: PathBuf,
        /// Maximum leads to enrich (capped by config and by the count)
        #[arg(long)]
        limit: Option<u64>,
        /// Name for the new lead list
        #[arg(long)]
        list_name: Option<String>,
        /// Add leads to an existing list or campaign instead
        #[arg(long)]
        resource_id: Option<String>,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Show the state of an enrichment job
    Status {
        /// Resource id returned by `enrich`
        resource_id: String,
    },
    /// Draft filters from a plain-language audience description
    Suggest {
        description: String,
    },
}

#[derive(Args, Clone)]
#[command(group(ArgGroup::new("source").required(true).args(["filters", "describe"])))]
pub struct RefineArgs {
    /// JSON file with the starting filters
    #[arg(long)]
    pub filters: Option<PathBuf>,

    /// Draft the starting filters from a description instead
    #[arg(long)]
    pub describe: Option<String>,

    /// What the search is for (defaults to --describe)
    #[arg(long)]
    pub goal: Option<String>,

    #[arg(long)]
    pub max_iterations: Option<u32>,

    /// Lower bound of the target lead count
    #[arg(long)]
    pub lower: Option<u64>,

    /// Upper bound of the target lead count
    #[arg(long)]
    pub upper: Option<u64>,

    /// Use only the manual count rule
    #[arg(long)]
    pub no_advisor: bool,

    /// Name for the enriched lead list
    #[arg(long)]
    pub list_name: Option<String>,

    /// Write the final filters to this file
    #[arg(long)]
    pub save: Option<PathBuf>,

    /// Suppress progress output
    #[arg(long)]
    pub quiet: bool,
}

/// Read a filter set from a JSON file.
pub fn load_filters(path: &Path) -> anyhow::Result<FilterSet> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Cannot read {}: {}", path.display(), e))?;
    let filters = FilterSet::from_json_str(&content)?;
    tracing::debug!(path = %path.display(), categories = filters.len(), "Loaded filters");
    Ok(filters)
}
